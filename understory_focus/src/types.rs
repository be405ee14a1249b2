// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: input event kinds, handler outcomes, and navigation directions.

use crate::input::InputState;

/// Kinds of input events delivered to a single element.
///
/// The pointer kinds are produced by [`PointerTracker`](crate::pointer::PointerTracker);
/// focus kinds by the scene when focus moves; `InputStateChange` once per frame to the
/// focused element (offered to its ancestors first).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InputEventKind {
    /// The pointer entered an unfocused element, which becomes the hover element.
    MouseIn,
    /// The pointer stays over the hover element.
    MouseOver,
    /// The pointer left the hover element, which stops hovering.
    MouseOut,
    /// The element became focused.
    GainFocus,
    /// The element lost focus.
    LoseFocus,
    /// The pointer entered the focused element.
    MouseInFocus,
    /// The pointer stays over the focused element.
    MouseOverFocus,
    /// The pointer left the focused element. Focus is kept.
    MouseOutFocus,
    /// Per-frame input snapshot for the focused element.
    InputStateChange,
}

/// An input event: its kind plus the frame's input snapshot.
#[derive(Copy, Clone, Debug)]
pub struct InputEvent<'a> {
    /// What happened.
    pub kind: InputEventKind,
    /// Input for this frame.
    pub state: &'a InputState,
}

impl<'a> InputEvent<'a> {
    /// Create an event.
    pub fn new(kind: InputEventKind, state: &'a InputState) -> Self {
        Self { kind, state }
    }
}

/// Handler outcome controlling further dispatch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Outcome {
    /// The handler consumed the input; stop offering it to others.
    Handled,
    /// Keep going.
    #[default]
    NotHandled,
}

impl Outcome {
    /// Returns true for [`Outcome::Handled`].
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }

    /// `Handled` when `handled` is true.
    pub fn from_handled(handled: bool) -> Self {
        if handled {
            Self::Handled
        } else {
            Self::NotHandled
        }
    }
}

/// One of the four navigation directions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Toward smaller x.
    Left,
    /// Toward larger x.
    Right,
    /// Toward smaller y.
    Up,
    /// Toward larger y.
    Down,
}

impl Direction {
    /// All directions, in keyboard priority order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Returns true for `Left` and `Right`.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_helpers() {
        assert!(Outcome::Handled.is_handled());
        assert!(!Outcome::default().is_handled());
        assert_eq!(Outcome::from_handled(true), Outcome::Handled);
    }

    #[test]
    fn direction_axes() {
        assert!(Direction::Left.is_horizontal());
        assert!(!Direction::Down.is_horizontal());
    }
}
