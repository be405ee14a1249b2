// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: element handles, flags, anchors, and properties.

use kurbo::{Size, Vec2};
use understory_style::{Id, Style};

/// Handle of an element in an [`ElementTree`](crate::ElementTree).
///
/// A slot index plus a generation counter. When an element is removed its slot is freed;
/// reusing the slot bumps the generation, so a stale handle never aliases a newer element.
/// Use [`ElementTree::is_alive`](crate::ElementTree::is_alive) to check a handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Element state bits.
    ///
    /// `VISIBLE`, `ENABLED`, and `FOCUSABLE` are the element's own settings; visibility and
    /// enabling are additionally inherited from ancestors when queried through the tree.
    /// `FOCUSED` and `SUB_ELEMENT` are maintained by the tree and the scene.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Drawn and hit-tested (if ancestors are visible too).
        const VISIBLE     = 0b0000_0001;
        /// Receives updates and input (if ancestors are enabled too).
        const ENABLED     = 0b0000_0010;
        /// May take focus.
        const FOCUSABLE   = 0b0000_0100;
        /// Currently holds focus.
        const FOCUSED     = 0b0000_1000;
        /// Attached to its parent as a structural part rather than a full child.
        const SUB_ELEMENT = 0b0001_0000;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ENABLED
    }
}

/// Horizontal anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalAnchor {
    /// Left edge.
    #[default]
    Left,
    /// Horizontal center.
    Center,
    /// Right edge.
    Right,
}

impl HorizontalAnchor {
    /// Look up an anchor by its data name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match Id::new(name).as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Vertical anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAnchor {
    /// Top edge.
    #[default]
    Top,
    /// Vertical middle.
    Middle,
    /// Bottom edge.
    Bottom,
}

impl VerticalAnchor {
    /// Look up an anchor by its data name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match Id::new(name).as_str() {
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// A horizontal and vertical anchor pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Anchor {
    /// Horizontal component.
    pub horizontal: HorizontalAnchor,
    /// Vertical component.
    pub vertical: VerticalAnchor,
}

impl Anchor {
    /// Create an anchor pair.
    pub const fn new(horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Top-left.
    pub const TOP_LEFT: Self = Self::new(HorizontalAnchor::Left, VerticalAnchor::Top);
    /// Center-middle.
    pub const CENTER: Self = Self::new(HorizontalAnchor::Center, VerticalAnchor::Middle);
}

/// Per-element layout and state properties.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementProperties {
    /// Which point of the parent's padded rectangle the element is positioned from.
    pub positioning_anchor: Anchor,
    /// Which point of the element itself sits at the computed position.
    pub sizing_anchor: Anchor,
    /// Offset from the positioning anchor, in reference units.
    pub relative_position: Vec2,
    /// Size in reference units, or [`ElementProperties::UNDEFINED_SIZE`] to fill the parent.
    pub relative_size: Size,
    /// Style to render with.
    pub style_id: Id,
    /// Own state bits.
    pub flags: ElementFlags,
}

impl Default for ElementProperties {
    fn default() -> Self {
        Self {
            positioning_anchor: Anchor::default(),
            sizing_anchor: Anchor::default(),
            relative_position: Vec2::ZERO,
            relative_size: Self::UNDEFINED_SIZE,
            style_id: Id::new(Style::NULL_STYLE_ID),
            flags: ElementFlags::default(),
        }
    }
}

impl ElementProperties {
    /// Sentinel size meaning "fill the parent's padded rectangle".
    pub const UNDEFINED_SIZE: Size = Size::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

    /// Returns true if [`relative_size`](Self::relative_size) is the undefined sentinel.
    pub fn has_undefined_size(&self) -> bool {
        self.relative_size == Self::UNDEFINED_SIZE
    }

    /// Set the size (builder style).
    pub fn with_size(mut self, size: Size) -> Self {
        self.relative_size = size;
        self
    }

    /// Set the position (builder style).
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.relative_position = position;
        self
    }

    /// Set both anchors (builder style).
    pub fn with_anchors(mut self, positioning: Anchor, sizing: Anchor) -> Self {
        self.positioning_anchor = positioning;
        self.sizing_anchor = sizing;
        self
    }

    /// Set the style id (builder style).
    pub fn with_style(mut self, style_id: impl Into<Id>) -> Self {
        self.style_id = style_id.into();
        self
    }

    /// Mark focusable (builder style).
    pub fn focusable(mut self) -> Self {
        self.flags.insert(ElementFlags::FOCUSABLE);
        self
    }
}
