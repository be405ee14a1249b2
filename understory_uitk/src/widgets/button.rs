// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_focus::input::{ButtonState as MouseButton, GamepadButtons, InputState, NavKeys};
use understory_focus::state_event::StateEvent;
use understory_focus::types::{InputEvent, InputEventKind, Outcome};
use understory_style::{HorizontalTextWrapping, Id, VerticalTextTruncation};

use super::{RenderCx, WidgetBehavior, WidgetCx, render_background};
use crate::data::DataObject;
use crate::error::Result;

/// Interaction state of a [`Button`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Idle.
    #[default]
    Normal,
    /// The pointer is over the button.
    Hovered,
    /// The button has focus.
    Focused,
    /// Accept went down this frame.
    Pressed,
    /// Accept has stayed down since the press.
    Held,
    /// The button ignores input.
    Disabled,
}

/// A focusable button.
///
/// The state is a [`StateEvent`]; a change to `Pressed` is the click. Each state can name its
/// own style. The style the button was loaded with is used for states without one.
#[derive(Debug, Default)]
pub struct Button {
    state: StateEvent<ButtonState>,
    base_style: Id,
    hovered_style: Id,
    focused_style: Id,
    pressed_style: Id,
    disabled_style: Id,
    text: Option<String>,
    is_legend: bool,
}

impl Button {
    /// A button with no per-state styles and no label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a label (builder style).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the style used in `state` (builder style). An empty id falls back to the base style.
    pub fn with_state_style(mut self, state: ButtonState, style: impl Into<Id>) -> Self {
        let style = style.into();
        match state {
            ButtonState::Hovered => self.hovered_style = style,
            ButtonState::Focused => self.focused_style = style,
            ButtonState::Pressed | ButtonState::Held => self.pressed_style = style,
            ButtonState::Disabled => self.disabled_style = style,
            ButtonState::Normal => self.base_style = style,
        }
        self
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        let id = |key: &str| -> Result<Id> { Ok(data.str(key)?.map(Id::new).unwrap_or_default()) };
        Ok(Self {
            hovered_style: id("hoveredStyleId")?,
            focused_style: id("focusedStyleId")?,
            pressed_style: id("pressedStyleId")?,
            disabled_style: id("disabledStyleId")?,
            text: data.str("text")?.map(str::to_owned),
            is_legend: data.bool("isLegend")?.unwrap_or(false),
            ..Self::default()
        })
    }

    /// Current state.
    pub fn state(&self) -> ButtonState {
        *self.state.get()
    }

    /// The state as an event source.
    pub fn state_event(&self) -> &StateEvent<ButtonState> {
        &self.state
    }

    /// Returns true if the state changed to `Pressed` during the last change.
    pub fn was_pressed(&self) -> bool {
        self.state() == ButtonState::Pressed && *self.state.previous() != ButtonState::Pressed
    }

    /// Enable or disable input.
    pub fn set_disabled(&mut self, disabled: bool) {
        match (disabled, self.state()) {
            (true, ButtonState::Disabled) | (false, ButtonState::Normal) => {}
            (true, _) => {
                self.state.set(ButtonState::Disabled);
            }
            (false, _) => {
                self.state.set(ButtonState::Normal);
            }
        }
    }

    /// The label.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Replace the label.
    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    /// The style id used in the current state.
    pub fn current_style_id(&self) -> &Id {
        let style = match self.state() {
            ButtonState::Hovered => &self.hovered_style,
            ButtonState::Focused => &self.focused_style,
            ButtonState::Pressed | ButtonState::Held => &self.pressed_style,
            ButtonState::Disabled => &self.disabled_style,
            ButtonState::Normal => &self.base_style,
        };
        if style.is_set() { style } else { &self.base_style }
    }

    fn accept(&mut self, input: &InputState, cx: &WidgetCx<'_>) -> Outcome {
        let pointer_over = cx.tree.hit_test_px(cx.element, input.mouse_position());
        let pressed = input.keys_pressed().contains(NavKeys::ACCEPT)
            || input.buttons_pressed().contains(GamepadButtons::A)
            || (input.left_button() == MouseButton::Pressed && pointer_over);
        match self.state() {
            ButtonState::Pressed | ButtonState::Held => {
                let next = if input.accept_held() {
                    ButtonState::Held
                } else {
                    ButtonState::Focused
                };
                self.state.set(next);
                Outcome::Handled
            }
            _ if pressed => {
                self.state.set(ButtonState::Pressed);
                Outcome::Handled
            }
            _ => Outcome::NotHandled,
        }
    }
}

impl WidgetBehavior for Button {
    fn handle_input_event(&mut self, event: &InputEvent<'_>, cx: &mut WidgetCx<'_>) -> Outcome {
        if self.state() == ButtonState::Disabled {
            return Outcome::NotHandled;
        }
        match event.kind {
            InputEventKind::MouseIn => {
                if self.state() == ButtonState::Normal {
                    self.state.set(ButtonState::Hovered);
                }
                Outcome::Handled
            }
            InputEventKind::MouseOut => {
                if self.state() == ButtonState::Hovered {
                    self.state.set(ButtonState::Normal);
                }
                Outcome::Handled
            }
            InputEventKind::GainFocus => {
                self.state.set(ButtonState::Focused);
                Outcome::Handled
            }
            InputEventKind::LoseFocus => {
                self.state.set(ButtonState::Normal);
                Outcome::Handled
            }
            InputEventKind::InputStateChange => self.accept(event.state, cx),
            _ => Outcome::NotHandled,
        }
    }

    fn update(&mut self, _dt: f32, cx: &mut WidgetCx<'_>) {
        if self.base_style.is_empty() {
            return;
        }
        let style = self.current_style_id().clone();
        cx.apply_style(cx.element, &style);
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        render_background(cx);
        let (Some(text), Some(style)) = (self.text.as_deref(), cx.style()) else {
            return Ok(());
        };
        let rect = cx.screen_rect_px();
        let frame = cx.frame();
        if self.is_legend {
            style.render_legend_text(cx.renderer, rect, text, frame)
        } else {
            style.render_text(
                cx.renderer,
                rect,
                text,
                HorizontalTextWrapping::Overflow,
                VerticalTextTruncation::Overflow,
                frame,
            )
        }
    }

    fn handle_style_id_changed(&mut self, style_id: &Id, _cx: &mut WidgetCx<'_>) {
        self.base_style = style_id.clone();
    }

    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        if let Some(style) = cx.tree.style_id(cx.element) {
            self.base_style = style.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_state_styles_fall_back_to_base() {
        let mut button = Button::new()
            .with_state_style(ButtonState::Normal, "idle")
            .with_state_style(ButtonState::Pressed, "down");
        assert_eq!(button.current_style_id().as_str(), "idle");
        button.state.set(ButtonState::Held);
        assert_eq!(button.current_style_id().as_str(), "down");
        button.state.set(ButtonState::Focused);
        assert_eq!(button.current_style_id().as_str(), "idle");
    }

    #[test]
    fn disabling_is_idempotent() {
        let mut button = Button::new();
        button.set_disabled(true);
        assert_eq!(button.state(), ButtonState::Disabled);
        button.set_disabled(true);
        assert_eq!(*button.state_event().previous(), ButtonState::Normal);
        button.set_disabled(false);
        assert_eq!(button.state(), ButtonState::Normal);
    }

    #[test]
    fn press_is_reported_once() {
        let mut button = Button::new();
        button.state.set(ButtonState::Pressed);
        assert!(button.was_pressed());
        button.state.set(ButtonState::Held);
        assert!(!button.was_pressed());
    }
}
