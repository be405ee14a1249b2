// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_focus --heading-base-level=0

//! Understory Focus: input, focus navigation, and hover transitions for a retained-mode UI.
//!
//! ## Overview
//!
//! This crate holds the parts of input routing that do not depend on a particular element
//! tree. A scene owns the tree and decides who is focused; this crate answers the questions
//! it asks every frame.
//!
//! - [`input::InputState`]: per-frame snapshot of mouse, navigation keys, gamepad buttons,
//!   and the left stick, with edge-triggered "pressed" sets.
//! - [`navigate`]: 4-directional spatial focus search. Candidates are filtered to a 45° cone
//!   on the query side, then scored by squared distance to the focused edge center.
//! - [`pointer::PointerTracker`]: derives `MouseIn`/`MouseOver`/`MouseOut` and the focused
//!   variants from "what was under the pointer last frame" versus "now".
//! - [`state_event::StateEvent`]: a value that notifies listeners on change, used for widget
//!   states such as a button's visual state or a check box's checked flag.
//!
//! ## Routing order
//!
//! Mouse input is routed first, then keyboard, then gamepad, so when several devices act in
//! the same frame the gamepad decides last. Handlers return [`types::Outcome`].
//!
//! ## Example
//!
//! ```
//! use kurbo::Rect;
//! use understory_focus::input::{InputState, NavKeys};
//! use understory_focus::navigate::find_in_direction;
//! use understory_focus::types::Direction;
//!
//! let mut input = InputState::new();
//! input.set_keys_down(NavKeys::DOWN);
//!
//! let focused = Rect::new(0.0, 0.0, 100.0, 100.0);
//! let others = [
//!     ("r2", Rect::new(150.0, 0.0, 250.0, 100.0)),
//!     ("r3", Rect::new(0.0, 150.0, 100.0, 250.0)),
//! ];
//! let next = Direction::ALL
//!     .into_iter()
//!     .find(|d| input.direction_pressed(*d))
//!     .and_then(|d| find_in_direction(d, focused, others));
//! assert_eq!(next, Some("r3"));
//! ```

pub mod input;
pub mod navigate;
pub mod pointer;
pub mod state_event;
pub mod types;
