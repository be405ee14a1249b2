// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_element_tree --heading-base-level=0

//! Understory Element Tree: the element hierarchy of a retained-mode scene.
//!
//! Elements live in a generational arena owned by [`ElementTree`]. Each element has an id,
//! a class id, a parent, ordered full children, ordered sub-elements, layout properties, and
//! an optional resolved [`Style`](understory_style::Style).
//!
//! - Full children are the ordinary content of an element.
//! - Sub-elements are structural parts (a slider's thumb, a text box's scrollbar). They are
//!   attached once, are never registered by id, and are visited before full children.
//!
//! ## Layout by anchoring
//!
//! There is no layout engine. An element's screen rectangle is derived from its parent's
//! padded rectangle, a positioning anchor, a relative position, a sizing anchor, and a size in
//! reference units. An undefined size fills the parent. Reference units map to pixels through
//! a single scale chosen from the window size and a reference resolution.
//!
//! All rectangles are memoized per frame. Geometry setters and structural changes invalidate
//! the caches of the affected subtree; [`ElementTree::advance_frame`] makes every cache stale.
//!
//! ## Minimal usage
//!
//! ```
//! use kurbo::{Point, Rect, Size};
//! use understory_element_tree::{Anchor, ElementProperties, ElementTree};
//! use understory_style::Id;
//!
//! let mut tree = ElementTree::new();
//! let root = tree.root();
//!
//! let panel = tree.insert(
//!     Id::new("panel"),
//!     Id::new("Panel"),
//!     ElementProperties::default().with_size(Size::new(400.0, 300.0)),
//!     true,
//! );
//! tree.attach_to(panel, root, false);
//!
//! let button = tree.insert(
//!     Id::new("ok"),
//!     Id::new("Button"),
//!     ElementProperties::default()
//!         .with_size(Size::new(100.0, 50.0))
//!         .with_anchors(Anchor::CENTER, Anchor::CENTER),
//!     true,
//! );
//! tree.attach_to(button, panel, false);
//!
//! assert_eq!(tree.screen_rect_ref(button), Rect::new(150.0, 125.0, 250.0, 175.0));
//! assert_eq!(tree.find_by_id(&Id::new("OK")), Some(button));
//! assert_eq!(tree.element_under_pixel(Point::new(200.0, 150.0)), Some(button));
//! ```

mod tree;
mod types;

pub use tree::ElementTree;
pub use types::{Anchor, ElementFlags, ElementId, ElementProperties, HorizontalAnchor, VerticalAnchor};
