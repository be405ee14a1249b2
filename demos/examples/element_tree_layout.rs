// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Anchored layout and hit testing on a bare element tree.
//!
//! Elements are positioned from an anchor on their parent's padded rectangle, in reference
//! units. Pixel rectangles follow from the window size.
//!
//! Run:
//! - `cargo run -p understory_demos --example element_tree_layout`

use kurbo::{Point, Size, Vec2};
use understory_element_tree::{
    Anchor, ElementProperties, ElementTree, HorizontalAnchor, VerticalAnchor,
};
use understory_style::Id;

fn main() {
    let mut tree = ElementTree::new();
    let scale = tree.set_window_size(960, 540, Size::new(1920.0, 1080.0));
    println!("reference to pixel scale: {scale}");

    let dialog = tree.insert(
        Id::new("dialog"),
        Id::new("panel"),
        ElementProperties::default()
            .with_anchors(Anchor::CENTER, Anchor::CENTER)
            .with_size(Size::new(800.0, 400.0)),
        true,
    );
    tree.attach_to(dialog, tree.root(), false);

    let ok = tree.insert(
        Id::new("ok"),
        Id::new("button"),
        ElementProperties::default()
            .with_position(Vec2::new(-20.0, -20.0))
            .with_size(Size::new(160.0, 60.0))
            .focusable(),
        true,
    );
    tree.attach_to(ok, dialog, false);
    let bottom_right = Anchor::new(HorizontalAnchor::Right, VerticalAnchor::Bottom);
    tree.set_positioning_anchor(ok, bottom_right);
    tree.set_sizing_anchor(ok, bottom_right);

    for element in tree.depth_ordered(tree.root()).iter().copied() {
        println!(
            "{:>8}: ref {:?} px {:?}",
            tree.id(element).map_or("?", Id::as_str),
            tree.screen_rect_ref(element),
            tree.screen_rect_px(element),
        );
    }

    // At half scale the button covers (590, 330) to (670, 360) in pixels.
    let hit = tree.focusable_element_under_pixel(Point::new(630.0, 345.0));
    println!("focusable under (630, 345): {:?}", hit.and_then(|e| tree.id(e)));
    assert_eq!(hit, Some(ok));
}
