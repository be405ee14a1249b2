// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame input snapshot: mouse, navigation keys, gamepad buttons, and the left stick.
//!
//! ## Usage
//!
//! The host feeds raw "down" sets every frame; the state derives edge-triggered "pressed"
//! sets from the previous frame.
//!
//! ```
//! use kurbo::Point;
//! use understory_focus::input::{ButtonState, InputState, NavKeys};
//! use understory_focus::types::Direction;
//!
//! let mut input = InputState::new();
//! input.set_keys_down(NavKeys::RIGHT);
//! input.set_left_button_down(true);
//! assert!(input.direction_pressed(Direction::Right));
//! assert_eq!(input.left_button(), ButtonState::Pressed);
//!
//! input.begin_frame();
//! input.set_keys_down(NavKeys::RIGHT);
//! input.set_left_button_down(true);
//! assert!(!input.direction_pressed(Direction::Right), "held, not pressed again");
//! assert_eq!(input.left_button(), ButtonState::Held);
//! ```

use kurbo::{Point, Vec2};

use crate::types::Direction;

/// Edge-tracked state of a mouse button.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ButtonState {
    /// Not down.
    #[default]
    Up,
    /// Down this frame and last frame.
    Held,
    /// Went up this frame.
    Released,
    /// Went down this frame.
    Pressed,
}

impl ButtonState {
    /// Derive this frame's state from last frame's and whether the button is down now.
    pub fn next(self, down: bool) -> Self {
        let was_down = matches!(self, Self::Held | Self::Pressed);
        match (was_down, down) {
            (false, true) => Self::Pressed,
            (true, true) => Self::Held,
            (true, false) => Self::Released,
            (false, false) => Self::Up,
        }
    }

    /// Down this frame (pressed or held).
    pub fn is_down(self) -> bool {
        matches!(self, Self::Held | Self::Pressed)
    }
}

bitflags::bitflags! {
    /// Keyboard keys used for navigation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NavKeys: u8 {
        /// Left arrow.
        const LEFT   = 0b0000_0001;
        /// Right arrow.
        const RIGHT  = 0b0000_0010;
        /// Up arrow.
        const UP     = 0b0000_0100;
        /// Down arrow.
        const DOWN   = 0b0000_1000;
        /// Enter or space.
        const ACCEPT = 0b0001_0000;
        /// Escape.
        const CANCEL = 0b0010_0000;
    }
}

bitflags::bitflags! {
    /// Gamepad buttons used for navigation (any connected pad).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GamepadButtons: u8 {
        /// D-pad left.
        const DPAD_LEFT  = 0b0000_0001;
        /// D-pad right.
        const DPAD_RIGHT = 0b0000_0010;
        /// D-pad up.
        const DPAD_UP    = 0b0000_0100;
        /// D-pad down.
        const DPAD_DOWN  = 0b0000_1000;
        /// A (accept).
        const A          = 0b0001_0000;
        /// B (cancel).
        const B          = 0b0010_0000;
    }
}

bitflags::bitflags! {
    /// Left thumbstick deflection past the dead zone.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct StickDirections: u8 {
        /// Stick left.
        const LEFT  = 0b0001;
        /// Stick right.
        const RIGHT = 0b0010;
        /// Stick up.
        const UP    = 0b0100;
        /// Stick down.
        const DOWN  = 0b1000;
    }
}

fn key_for(direction: Direction) -> NavKeys {
    match direction {
        Direction::Left => NavKeys::LEFT,
        Direction::Right => NavKeys::RIGHT,
        Direction::Up => NavKeys::UP,
        Direction::Down => NavKeys::DOWN,
    }
}

fn button_for(direction: Direction) -> GamepadButtons {
    match direction {
        Direction::Left => GamepadButtons::DPAD_LEFT,
        Direction::Right => GamepadButtons::DPAD_RIGHT,
        Direction::Up => GamepadButtons::DPAD_UP,
        Direction::Down => GamepadButtons::DPAD_DOWN,
    }
}

/// Input for one frame. See the [module docs](self).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    mouse: Point,
    prev_mouse: Point,
    scroll: i32,
    prev_scroll: i32,
    left_button: ButtonState,
    keys_held: NavKeys,
    keys_pressed: NavKeys,
    buttons_held: GamepadButtons,
    buttons_pressed: GamepadButtons,
    left_stick: StickDirections,
}

impl InputState {
    /// Empty input: pointer at the origin, nothing down.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: the current pointer and wheel become the previous ones, and
    /// pressed sets are cleared until new "down" sets are fed.
    pub fn begin_frame(&mut self) {
        self.prev_mouse = self.mouse;
        self.prev_scroll = self.scroll;
        self.keys_pressed = NavKeys::empty();
        self.buttons_pressed = GamepadButtons::empty();
    }

    /// Clear everything, including history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // --- feeding ---

    /// Set the pointer position in pixels.
    pub fn set_mouse_position(&mut self, position: Point) {
        self.mouse = position;
    }

    /// Set the accumulated scroll wheel value.
    pub fn set_scroll_wheel(&mut self, value: i32) {
        self.scroll = value;
    }

    /// Feed whether the left button is down now.
    pub fn set_left_button_down(&mut self, down: bool) {
        self.left_button = self.left_button.next(down);
    }

    /// Feed the navigation keys that are down now.
    pub fn set_keys_down(&mut self, down: NavKeys) {
        self.keys_pressed = down - self.keys_held;
        self.keys_held = down;
    }

    /// Feed the gamepad buttons that are down now.
    pub fn set_buttons_down(&mut self, down: GamepadButtons) {
        self.buttons_pressed = down - self.buttons_held;
        self.buttons_held = down;
    }

    /// Feed the left stick deflection.
    pub fn set_left_stick(&mut self, directions: StickDirections) {
        self.left_stick = directions;
    }

    // --- queries ---

    /// Pointer position in pixels.
    pub fn mouse_position(&self) -> Point {
        self.mouse
    }

    /// Pointer position last frame.
    pub fn previous_mouse_position(&self) -> Point {
        self.prev_mouse
    }

    /// Pointer movement since last frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse - self.prev_mouse
    }

    /// Accumulated scroll wheel value.
    pub fn scroll_wheel(&self) -> i32 {
        self.scroll
    }

    /// Scroll wheel change since last frame.
    pub fn scroll_delta(&self) -> i32 {
        self.scroll - self.prev_scroll
    }

    /// Left mouse button.
    pub fn left_button(&self) -> ButtonState {
        self.left_button
    }

    /// Keys that went down this frame.
    pub fn keys_pressed(&self) -> NavKeys {
        self.keys_pressed
    }

    /// Keys that are down.
    pub fn keys_held(&self) -> NavKeys {
        self.keys_held
    }

    /// Gamepad buttons that went down this frame.
    pub fn buttons_pressed(&self) -> GamepadButtons {
        self.buttons_pressed
    }

    /// Gamepad buttons that are down.
    pub fn buttons_held(&self) -> GamepadButtons {
        self.buttons_held
    }

    /// Left stick deflection.
    pub fn left_stick(&self) -> StickDirections {
        self.left_stick
    }

    /// Arrow key for `direction` went down this frame.
    pub fn keyboard_direction_pressed(&self, direction: Direction) -> bool {
        self.keys_pressed.contains(key_for(direction))
    }

    /// D-pad button for `direction` went down this frame.
    pub fn gamepad_direction_pressed(&self, direction: Direction) -> bool {
        self.buttons_pressed.contains(button_for(direction))
    }

    /// Keyboard or gamepad pressed `direction` this frame.
    pub fn direction_pressed(&self, direction: Direction) -> bool {
        self.keyboard_direction_pressed(direction) || self.gamepad_direction_pressed(direction)
    }

    /// Accept (enter, A, or a left click) went down this frame.
    pub fn accept_pressed(&self) -> bool {
        self.keys_pressed.contains(NavKeys::ACCEPT)
            || self.buttons_pressed.contains(GamepadButtons::A)
            || self.left_button == ButtonState::Pressed
    }

    /// Accept is down.
    pub fn accept_held(&self) -> bool {
        self.keys_held.contains(NavKeys::ACCEPT)
            || self.buttons_held.contains(GamepadButtons::A)
            || self.left_button.is_down()
    }

    /// Cancel (escape or B) went down this frame.
    pub fn cancel_pressed(&self) -> bool {
        self.keys_pressed.contains(NavKeys::CANCEL)
            || self.buttons_pressed.contains(GamepadButtons::B)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_edges() {
        let mut s = ButtonState::Up;
        s = s.next(true);
        assert_eq!(s, ButtonState::Pressed);
        s = s.next(true);
        assert_eq!(s, ButtonState::Held);
        s = s.next(false);
        assert_eq!(s, ButtonState::Released);
        s = s.next(false);
        assert_eq!(s, ButtonState::Up);
    }

    #[test]
    fn pressed_is_edge_triggered() {
        let mut input = InputState::new();
        input.set_buttons_down(GamepadButtons::DPAD_DOWN | GamepadButtons::A);
        assert!(input.gamepad_direction_pressed(Direction::Down));
        assert!(input.accept_pressed());
        input.begin_frame();
        input.set_buttons_down(GamepadButtons::DPAD_DOWN);
        assert!(!input.direction_pressed(Direction::Down));
        assert!(!input.accept_held());
        input.begin_frame();
        input.set_buttons_down(GamepadButtons::DPAD_DOWN | GamepadButtons::DPAD_LEFT);
        assert!(input.direction_pressed(Direction::Left));
    }

    #[test]
    fn deltas_roll_with_frames() {
        let mut input = InputState::new();
        input.set_mouse_position(Point::new(10.0, 5.0));
        input.set_scroll_wheel(120);
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, 5.0));
        input.begin_frame();
        input.set_mouse_position(Point::new(12.0, 5.0));
        assert_eq!(input.mouse_delta(), Vec2::new(2.0, 0.0));
        assert_eq!(input.scroll_delta(), 0);
        assert_eq!(input.previous_mouse_position(), Point::new(10.0, 5.0));
    }

    #[test]
    fn cancel_from_either_device() {
        let mut input = InputState::new();
        input.set_keys_down(NavKeys::CANCEL);
        assert!(input.cancel_pressed());
        input.reset();
        assert!(!input.cancel_pressed());
    }
}
