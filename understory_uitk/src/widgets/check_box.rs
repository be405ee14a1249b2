// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_element_tree::ElementFlags;
use understory_focus::state_event::StateEvent;
use understory_focus::types::{InputEvent, Outcome};
use understory_style::Id;

use super::{Button, ButtonState, RenderCx, WidgetBehavior, WidgetCx};
use crate::data::DataObject;
use crate::error::Result;

/// A button that toggles a checked state on every press.
///
/// The check mark lives in the sub-elements, which are shown only while checked.
#[derive(Debug, Default)]
pub struct CheckBox {
    button: Button,
    checked: StateEvent<bool>,
}

impl CheckBox {
    /// An unchecked box.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        Ok(Self {
            button: Button::from_data(data)?,
            checked: StateEvent::new(data.bool("checked")?.unwrap_or(false)),
        })
    }

    /// The underlying button.
    pub fn button(&self) -> &Button {
        &self.button
    }

    /// Mutable access to the underlying button.
    pub fn button_mut(&mut self) -> &mut Button {
        &mut self.button
    }

    /// Returns true if checked.
    pub fn is_checked(&self) -> bool {
        *self.checked.get()
    }

    /// The checked state as an event source.
    pub fn checked_event(&self) -> &StateEvent<bool> {
        &self.checked
    }

    /// Set the checked state, notifying listeners on change.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked.set(checked);
    }

    fn sync_sub_elements(&self, cx: &mut WidgetCx<'_>) {
        let checked = self.is_checked();
        let subs = cx.tree.sub_elements(cx.element).to_vec();
        for sub in subs {
            if cx.tree.flags(sub).contains(ElementFlags::VISIBLE) != checked {
                cx.tree.set_visible(sub, checked);
            }
        }
    }
}

impl WidgetBehavior for CheckBox {
    fn handle_input_event(&mut self, event: &InputEvent<'_>, cx: &mut WidgetCx<'_>) -> Outcome {
        let before = self.button.state();
        let outcome = self.button.handle_input_event(event, cx);
        if before != ButtonState::Pressed && self.button.state() == ButtonState::Pressed {
            let checked = !self.is_checked();
            self.checked.set(checked);
        }
        outcome
    }

    fn update(&mut self, dt: f32, cx: &mut WidgetCx<'_>) {
        self.button.update(dt, cx);
        self.sync_sub_elements(cx);
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        self.button.render(cx)
    }

    fn handle_style_id_changed(&mut self, style_id: &Id, cx: &mut WidgetCx<'_>) {
        self.button.handle_style_id_changed(style_id, cx);
    }

    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        self.button.post_load(cx);
        self.sync_sub_elements(cx);
    }
}
