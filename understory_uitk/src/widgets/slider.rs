// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Size, Vec2};
use understory_element_tree::{ElementId, ElementTree};
use understory_focus::input::{ButtonState as MouseButton, InputState, StickDirections};
use understory_focus::state_event::StateEvent;
use understory_focus::types::{Direction, InputEvent, InputEventKind, Outcome};
use understory_style::Id;

use super::{Button, ButtonState, WidgetBehavior, WidgetCx};
use crate::data::DataObject;
use crate::error::Result;

/// Axis along which the thumb travels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SliderOrientation {
    /// Minimum at the left.
    #[default]
    LeftToRight,
    /// Minimum at the top.
    TopToBottom,
}

impl SliderOrientation {
    /// Look up an orientation by its data name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("leftToRight") {
            Some(Self::LeftToRight)
        } else if name.eq_ignore_ascii_case("topToBottom") {
            Some(Self::TopToBottom)
        } else {
            None
        }
    }
}

/// Whether values snap to discrete steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SliderType {
    /// Any value in the range.
    #[default]
    Continuous,
    /// Values snap to `numDiscreteSteps` intervals.
    Discrete,
}

impl SliderType {
    /// Look up a type by its data name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("continuous") {
            Some(Self::Continuous)
        } else if name.eq_ignore_ascii_case("discrete") {
            Some(Self::Discrete)
        } else {
            None
        }
    }
}

/// A thumb button dragged along a background.
///
/// The value is a [`StateEvent`], so other widgets can listen for changes: scrolling stack
/// panels, text and consoles all page through their content this way.
///
/// The thumb moves with the mouse while it is pressed, with the left stick, and through
/// [`set_slider_value`](Self::set_slider_value). Arrow keys and the d-pad along the slider's
/// axis step the value by one.
#[derive(Debug)]
pub struct Slider {
    orientation: SliderOrientation,
    slider_type: SliderType,
    min: f32,
    max: f32,
    initial: f32,
    steps: u32,
    thumb_id: Id,
    background_id: Id,
    value: StateEvent<f32>,
    captured: bool,
    element: Option<ElementId>,
    thumb: Option<ElementId>,
    background: Option<ElementId>,
}

impl Default for Slider {
    fn default() -> Self {
        Self {
            orientation: SliderOrientation::LeftToRight,
            slider_type: SliderType::Continuous,
            min: 0.0,
            max: 1.0,
            initial: Self::DEFAULT_INITIAL_VALUE,
            steps: 0,
            thumb_id: Id::default(),
            background_id: Id::default(),
            value: StateEvent::new(Self::DEFAULT_INITIAL_VALUE),
            captured: false,
            element: None,
            thumb: None,
            background: None,
        }
    }
}

impl Slider {
    /// Initial value when the data does not give one.
    pub const DEFAULT_INITIAL_VALUE: f32 = 0.5;
    /// Pixels the thumb moves per frame while the left stick is held.
    pub const STICK_SPEED_PX: f64 = 5.0;

    /// A continuous slider with its thumb and background sub-elements.
    pub fn new(thumb: impl Into<Id>, background: impl Into<Id>) -> Self {
        Self {
            thumb_id: thumb.into(),
            background_id: background.into(),
            ..Self::default()
        }
    }

    /// Set the orientation (builder style).
    pub fn with_orientation(mut self, orientation: SliderOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set range, type and steps (builder style).
    pub fn with_range(mut self, min: f32, max: f32, slider_type: SliderType, steps: u32) -> Self {
        self.min = min;
        self.max = max;
        self.slider_type = slider_type;
        self.steps = steps;
        self
    }

    /// Set the initial value (builder style).
    pub fn with_initial_value(mut self, value: f32) -> Self {
        self.initial = value;
        self.value.clear_to(value);
        self
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        let mut slider = Self::new(
            data.str("thumbButtonSubElementId")?.unwrap_or_default(),
            data.str("backgroundSubElementId")?.unwrap_or_default(),
        );
        if let Some(orientation) = data.named("sliderOrientation", SliderOrientation::from_name)? {
            slider.orientation = orientation;
        }
        if let Some(range) = data.vec2("valueRange")? {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Slider values are stored in single precision."
            )]
            let (min, max) = (range.x as f32, range.y as f32);
            slider.min = min;
            slider.max = max;
        }
        if let Some(slider_type) = data.named("sliderType", SliderType::from_name)? {
            slider.slider_type = slider_type;
        }
        slider.steps = data.u32("numDiscreteSteps")?.unwrap_or(0);
        let initial = data.f32("initialValue")?.unwrap_or(Self::DEFAULT_INITIAL_VALUE);
        Ok(slider.with_initial_value(initial))
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        *self.value.get()
    }

    /// The value as an event source.
    pub fn value_event(&self) -> &StateEvent<f32> {
        &self.value
    }

    /// `(min, max)`.
    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Number of discrete steps.
    pub fn discrete_steps(&self) -> u32 {
        self.steps
    }

    /// Orientation.
    pub fn orientation(&self) -> SliderOrientation {
        self.orientation
    }

    /// Continuous or discrete.
    pub fn slider_type(&self) -> SliderType {
        self.slider_type
    }

    /// Returns true while the thumb follows the mouse.
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// The value at interpolant `t` in `0..=1`, snapped to steps for discrete sliders.
    #[allow(
        clippy::cast_precision_loss,
        reason = "Step counts are small."
    )]
    pub fn calculate_value(&self, t: f32) -> f32 {
        let t = if self.slider_type == SliderType::Discrete && self.steps > 0 {
            let steps = self.steps as f32;
            (t * steps + 0.5).floor() / steps
        } else {
            t
        };
        self.min + t * (self.max - self.min)
    }

    /// Where `value` sits in the range, clamped to `0..=1`.
    pub fn calculate_interpolant(&self, value: f32) -> f32 {
        if self.max == self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    fn clamp_value(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    /// Change the range and step count, pulling the value back inside the new range.
    pub fn modify_slider_range(&mut self, tree: &mut ElementTree, min: f32, max: f32, steps: u32) {
        self.min = min;
        self.max = max;
        self.steps = steps;
        let value = self.value();
        if value < min {
            self.set_slider_value(tree, min);
        } else if value > max {
            self.set_slider_value(tree, max);
        } else {
            self.move_thumb_to_value(tree, value);
        }
    }

    /// Set the value (clamped to the range, notifying listeners) and move the thumb.
    pub fn set_slider_value(&mut self, tree: &mut ElementTree, value: f32) {
        let clamped = self.clamp_value(value);
        self.value.set(clamped);
        self.move_thumb_to_value(tree, value);
    }

    fn is_horizontal(&self) -> bool {
        self.orientation == SliderOrientation::LeftToRight
    }

    /// Reference units the thumb can travel.
    fn thumb_span(&self, tree: &ElementTree) -> Option<f64> {
        let (element, thumb) = (self.element?, self.thumb?);
        let track = tree.padded_rect_ref(element);
        let thumb = tree.margined_rect_ref(thumb);
        let span = if self.is_horizontal() {
            track.width() - thumb.width()
        } else {
            track.height() - thumb.height()
        };
        Some(span.max(0.0))
    }

    /// Place the thumb at the position of `value`.
    pub fn move_thumb_to_value(&self, tree: &mut ElementTree, value: f32) {
        let (Some(thumb), Some(span)) = (self.thumb, self.thumb_span(tree)) else {
            return;
        };
        let offset = f64::from(self.calculate_interpolant(value)) * span;
        self.place_thumb(tree, thumb, offset);
    }

    fn place_thumb(&self, tree: &mut ElementTree, thumb: ElementId, offset: f64) {
        let Some(props) = tree.properties(thumb) else {
            return;
        };
        let current = props.relative_position;
        let position = if self.is_horizontal() {
            Vec2::new(offset, current.y)
        } else {
            Vec2::new(current.x, offset)
        };
        if position != current {
            tree.set_relative_position(thumb, position);
        }
    }

    fn thumb_offset(&self, tree: &ElementTree, thumb: ElementId) -> f64 {
        tree.properties(thumb).map_or(0.0, |p| {
            if self.is_horizontal() {
                p.relative_position.x
            } else {
                p.relative_position.y
            }
        })
    }

    fn stick_delta_px(&self, input: &InputState) -> f64 {
        let stick = input.left_stick();
        let (back, forward) = if self.is_horizontal() {
            (StickDirections::LEFT, StickDirections::RIGHT)
        } else {
            (StickDirections::UP, StickDirections::DOWN)
        };
        let mut delta = 0.0;
        if stick.contains(back) {
            delta -= Self::STICK_SPEED_PX;
        }
        if stick.contains(forward) {
            delta += Self::STICK_SPEED_PX;
        }
        delta
    }

    fn drag(&mut self, input: &InputState, cx: &mut WidgetCx<'_>) -> Outcome {
        let Some(thumb) = self.thumb else {
            return Outcome::NotHandled;
        };
        if self.captured && input.left_button() != MouseButton::Held {
            self.captured = false;
        }
        let mut delta_px = self.stick_delta_px(input);
        let thumb_down = cx
            .widget::<Button>(thumb)
            .is_some_and(|b| matches!(b.state(), ButtonState::Pressed | ButtonState::Held));
        if thumb_down || self.captured {
            self.captured = true;
            let mouse = input.mouse_delta();
            delta_px = if self.is_horizontal() { mouse.x } else { mouse.y };
        }
        if delta_px == 0.0 {
            return Outcome::NotHandled;
        }
        let Some(span) = self.thumb_span(cx.tree) else {
            return Outcome::NotHandled;
        };
        let delta_ref = delta_px * cx.tree.pixel_to_ref_scale();
        let offset = (self.thumb_offset(cx.tree, thumb) + delta_ref).clamp(0.0, span);
        self.place_thumb(cx.tree, thumb, offset);
        if span > 0.0 {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Slider values are stored in single precision."
            )]
            let t = (offset / span) as f32;
            let value = self.clamp_value(self.calculate_value(t));
            self.value.set(value);
        }
        Outcome::Handled
    }
}

impl WidgetBehavior for Slider {
    fn handle_input_event(&mut self, event: &InputEvent<'_>, cx: &mut WidgetCx<'_>) -> Outcome {
        if event.kind != InputEventKind::InputStateChange {
            return Outcome::NotHandled;
        }
        self.drag(event.state, cx)
    }

    fn handle_global_input_state(
        &mut self,
        input: &InputState,
        cx: &mut WidgetCx<'_>,
    ) -> Outcome {
        let (back, forward) = if self.is_horizontal() {
            (Direction::Left, Direction::Right)
        } else {
            (Direction::Up, Direction::Down)
        };
        let value = self.value().round();
        if input.direction_pressed(back) {
            self.set_slider_value(cx.tree, value - 1.0);
            Outcome::Handled
        } else if input.direction_pressed(forward) {
            self.set_slider_value(cx.tree, value + 1.0);
            Outcome::Handled
        } else {
            Outcome::NotHandled
        }
    }

    fn handle_size_changed(&mut self, size: Size, cx: &mut WidgetCx<'_>) {
        if let Some(background) = self.background {
            if self.is_horizontal() {
                cx.tree.set_width(background, size.width);
            } else {
                cx.tree.set_height(background, size.height);
            }
        }
        self.move_thumb_to_value(cx.tree, self.value());
    }

    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        self.element = Some(cx.element);
        self.thumb = cx.sub_element(&self.thumb_id);
        self.background = cx.sub_element(&self.background_id);
        self.value.clear_to(self.initial);
        self.move_thumb_to_value(cx.tree, self.initial);
    }
}
