// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_element_tree::ElementId;
use understory_focus::input::InputState;
use understory_focus::state_event::StateEvent;
use understory_focus::types::{Direction, Outcome};
use understory_style::Id;

use super::{Button, ButtonState, StaticText, WidgetBehavior, WidgetCx};
use crate::data::DataObject;
use crate::error::Result;

/// Current and previous selection of a [`TwistMenu`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectedItem {
    /// Index of the selected item.
    pub current: usize,
    /// Index selected before the last change.
    pub previous: usize,
}

/// Picks one item from a list with left and right buttons or directions.
///
/// The selection is a [`StateEvent`]. Its previous value is reset to the current one at the
/// start of every scene update, so [`changed_selected_item`](Self::changed_selected_item)
/// reports changes made during the current frame only.
#[derive(Debug)]
pub struct TwistMenu {
    items: Vec<String>,
    cycle: bool,
    selected: StateEvent<SelectedItem>,
    left_id: Id,
    right_id: Id,
    display_id: Id,
    left: Option<ElementId>,
    right: Option<ElementId>,
    display: Option<ElementId>,
    left_down: bool,
    right_down: bool,
}

impl Default for TwistMenu {
    fn default() -> Self {
        Self {
            items: vec![Self::DEFAULT_ITEM.to_owned()],
            cycle: false,
            selected: StateEvent::default(),
            left_id: Id::default(),
            right_id: Id::default(),
            display_id: Id::default(),
            left: None,
            right: None,
            display: None,
            left_down: false,
            right_down: false,
        }
    }
}

impl TwistMenu {
    /// Placeholder item shown while the list is empty.
    pub const DEFAULT_ITEM: &'static str = "<empty>";

    /// A menu over `items`. An empty list gets the placeholder item.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut menu = Self::default();
        menu.set_items(items.into_iter().map(Into::into).collect());
        menu
    }

    /// Wrap around at either end (builder style).
    pub fn with_cycling(mut self, cycle: bool) -> Self {
        self.cycle = cycle;
        self
    }

    /// Set the button and display text sub-element ids (builder style).
    pub fn with_sub_elements(
        mut self,
        left: impl Into<Id>,
        display: impl Into<Id>,
        right: impl Into<Id>,
    ) -> Self {
        self.left_id = left.into();
        self.display_id = display.into();
        self.right_id = right.into();
        self
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        let mut menu = Self::default().with_sub_elements(
            data.str("leftButtonSubElementId")?.unwrap_or_default(),
            data.str("displayTextSubElementId")?.unwrap_or_default(),
            data.str("rightButtonSubElementId")?.unwrap_or_default(),
        );
        if let Some(items) = data.string_array("items")? {
            menu.set_items(items);
        }
        menu.cycle = data.bool("infinitelyCycleItems")?.unwrap_or(false);
        Ok(menu)
    }

    fn set_items(&mut self, items: Vec<String>) {
        if items.is_empty() {
            self.make_default_list();
        } else {
            self.items = items;
        }
    }

    fn make_default_list(&mut self) {
        self.items.clear();
        self.items.push(Self::DEFAULT_ITEM.to_owned());
    }

    /// Returns true if only the placeholder item is present.
    pub fn is_default_list(&self) -> bool {
        self.items.len() == 1 && self.items[0] == Self::DEFAULT_ITEM
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// The item at `index`.
    pub fn item(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Index of the selected item.
    pub fn current_index(&self) -> usize {
        self.selected.get().current
    }

    /// The selected item.
    pub fn current_item(&self) -> &str {
        self.item(self.current_index()).unwrap_or(Self::DEFAULT_ITEM)
    }

    /// The selection as an event source.
    pub fn selected_item(&self) -> &StateEvent<SelectedItem> {
        &self.selected
    }

    /// Returns true if the selection changed since the start of this frame's update.
    pub fn changed_selected_item(&self) -> bool {
        let selected = self.selected.get();
        selected.current != selected.previous
    }

    /// Append an item, replacing the placeholder. Returns the new item's index.
    pub fn add_item(&mut self, item: impl Into<String>) -> usize {
        if self.is_default_list() {
            self.items.clear();
        }
        self.items.push(item.into());
        self.items.len() - 1
    }

    /// Remove every item, leaving the placeholder selected.
    pub fn clear_items(&mut self) {
        self.make_default_list();
        self.set_selected_item(0);
    }

    /// Select `index`, notifying listeners on change.
    pub fn set_selected_item(&mut self, index: usize) {
        let current = self.current_index();
        self.selected.set(SelectedItem {
            current: index,
            previous: current,
        });
    }

    /// Select the next item, wrapping only when cycling.
    pub fn increment_selected_item(&mut self) {
        let count = self.item_count();
        let current = self.current_index();
        if self.cycle || current + 1 < count {
            self.set_selected_item((current + 1) % count);
        }
    }

    /// Select the previous item, wrapping only when cycling.
    pub fn decrement_selected_item(&mut self) {
        let count = self.item_count();
        let current = self.current_index();
        if self.cycle || current > 0 {
            self.set_selected_item((current + count - 1) % count);
        }
    }

    /// Returns true on the first frame `button` is seen pressed.
    fn pressed_edge(button: Option<ElementId>, was_down: &mut bool, cx: &WidgetCx<'_>) -> bool {
        let down = button
            .and_then(|b| cx.widget::<Button>(b))
            .is_some_and(|b| b.state() == ButtonState::Pressed);
        let edge = down && !*was_down;
        *was_down = down;
        edge
    }
}

impl WidgetBehavior for TwistMenu {
    fn handle_global_input_state(
        &mut self,
        input: &InputState,
        _cx: &mut WidgetCx<'_>,
    ) -> Outcome {
        if input.direction_pressed(Direction::Left) {
            self.decrement_selected_item();
            Outcome::Handled
        } else if input.direction_pressed(Direction::Right) {
            self.increment_selected_item();
            Outcome::Handled
        } else {
            Outcome::NotHandled
        }
    }

    fn update(&mut self, _dt: f32, cx: &mut WidgetCx<'_>) {
        if Self::pressed_edge(self.left, &mut self.left_down, cx) {
            self.decrement_selected_item();
        }
        if Self::pressed_edge(self.right, &mut self.right_down, cx) {
            self.increment_selected_item();
        }
        if let Some(display) = self.display
            && let Some(text) = cx.widget_mut::<StaticText>(display)
        {
            text.set_text(self.current_item());
        }
    }

    fn reset_event_state(&mut self) {
        let current = self.current_index();
        self.selected.clear_to(SelectedItem {
            current,
            previous: current,
        });
    }

    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        self.left = cx.sub_element(&self.left_id);
        self.right = cx.sub_element(&self.right_id);
        self.display = cx.sub_element(&self.display_id);
    }
}
