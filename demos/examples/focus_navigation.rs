// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directional focus search and pointer transitions without a scene.
//!
//! Run:
//! - `cargo run -p understory_demos --example focus_navigation`

use kurbo::Rect;
use understory_focus::navigate::find_in_direction;
use understory_focus::pointer::PointerTracker;
use understory_focus::types::Direction;

fn main() {
    // A 3x3 grid of 100x100 cells with 20 units between them.
    let cells: Vec<(usize, Rect)> = (0..9)
        .map(|i| {
            let (col, row) = ((i % 3) as f64, (i / 3) as f64);
            let (x, y) = (col * 120.0, row * 120.0);
            (i, Rect::new(x, y, x + 100.0, y + 100.0))
        })
        .collect();

    let mut focused = 4;
    for direction in [Direction::Up, Direction::Left, Direction::Down, Direction::Down] {
        let rect = cells[focused].1;
        let others = cells.iter().copied().filter(|(i, _)| *i != focused);
        match find_in_direction(direction, rect, others) {
            Some(next) => {
                println!("{direction:?}: {focused} -> {next}");
                focused = next;
            }
            None => println!("{direction:?}: {focused} stays (nothing that way)"),
        }
    }

    let mut pointer = PointerTracker::new();
    let mut hovered = None;
    for (under, pressed) in [(Some(1), false), (Some(1), true), (Some(2), false), (None, false)] {
        let step = pointer.update(under, Some(focused), hovered, pressed);
        println!("under {under:?}: {:?}", step.events);
        if let Some(target) = step.focus_request {
            println!("  focus moves to {target}");
            focused = target;
        }
        hovered = step.hovered;
    }
}
