// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene: element tree, widgets, styles, focus and the per-frame passes.
//!
//! ## Update
//!
//! [`UiManager::update`] runs once per frame:
//!
//! 1) advance the frame clock;
//! 2) `reset_event_state` on every enabled element in depth order;
//! 3) offer the whole input state to the focused element and its ancestors, then to the hover
//!    element and its ancestors. The first widget that handles it ends input routing for the
//!    frame;
//! 4) otherwise route the pointer, then keyboard directions, then gamepad directions;
//! 5) fall back to the root if the focus scope was detached;
//! 6) refocus the first focusable element of the scope if the focused element is gone, can no
//!    longer take focus, or is outside the scope;
//! 7) clear hover if it is the focused element;
//! 8) send `InputStateChange` down the focused element's ancestor chain, root first, stopping
//!    at the first widget that handles it;
//! 9) `update` every enabled element in depth order.
//!
//! ## Render
//!
//! [`UiManager::render`] walks the depth order once. Each visible element renders between its
//! style's tint push and pop, and gets exactly one `post_render` after all of its visible
//! descendants have rendered, so a clipping panel can pop its scissor there.

use std::rc::Rc;

use kurbo::{Point, Size};
use understory_element_tree::{ElementId, ElementProperties, ElementTree};
use understory_focus::input::{ButtonState as MouseButton, InputState};
use understory_focus::navigate::{find_in_direction, next_focusable};
use understory_focus::pointer::PointerTracker;
use understory_focus::types::{Direction, InputEvent, InputEventKind, Outcome};
use understory_style::{Id, StyleRenderer, StyleSheet};

use crate::config::UiConfig;
use crate::data::{DataDefinitions, DataObject, DataSource, FsDataSource};
use crate::error::Result;
use crate::widgets::{RenderCx, Widget, WidgetBehavior, WidgetCx, WidgetKind, WidgetMap};

/// A retained-mode UI scene.
///
/// ```
/// use kurbo::{Size, Vec2};
/// use understory_element_tree::ElementProperties;
/// use understory_uitk::widgets::Button;
/// use understory_uitk::{UiConfig, UiManager};
///
/// let mut ui = UiManager::new(UiConfig::default());
/// let props = ElementProperties::default()
///     .with_size(Size::new(100.0, 40.0))
///     .focusable();
/// let ok = ui.insert_element("ok", props, Button::new());
/// ui.add_child(ok, ui.root());
///
/// // The first focusable element in the scope is focused on the first update.
/// ui.update(0.016, &Default::default());
/// assert_eq!(ui.focused(), Some(ok));
/// ```
pub struct UiManager {
    pub(crate) config: UiConfig,
    pub(crate) tree: ElementTree,
    pub(crate) widgets: WidgetMap,
    pub(crate) styles: StyleSheet,
    pub(crate) definitions: DataDefinitions,
    pub(crate) source: Box<dyn DataSource>,
    renderer: Option<Box<dyn StyleRenderer>>,
    input: InputState,
    focused: Option<ElementId>,
    hovered: Option<ElementId>,
    focus_scope: Option<ElementId>,
    pointer: PointerTracker<ElementId>,
}

impl core::fmt::Debug for UiManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UiManager")
            .field("tree", &self.tree)
            .field("widgets", &self.widgets.len())
            .field("styles", &self.styles.len())
            .field("has_renderer", &self.renderer.is_some())
            .field("focused", &self.focused)
            .field("hovered", &self.hovered)
            .field("focus_scope", &self.focus_scope)
            .finish_non_exhaustive()
    }
}

impl UiManager {
    /// An empty scene reading data files from `config.data_root`.
    pub fn new(config: UiConfig) -> Self {
        let source = FsDataSource::new(config.data_root.clone());
        let mut tree = ElementTree::new();
        tree.set_scale_epsilon(config.scale_epsilon);
        tree.set_window_size(
            config.reference_width,
            config.reference_height,
            config.reference_size(),
        );
        Self {
            config,
            tree,
            widgets: WidgetMap::new(),
            styles: StyleSheet::new(),
            definitions: DataDefinitions::new(),
            source: Box::new(source),
            renderer: None,
            input: InputState::new(),
            focused: None,
            hovered: None,
            focus_scope: None,
            pointer: PointerTracker::new(),
        }
    }

    /// Use `renderer` for [`render`](Self::render) (builder style).
    pub fn with_renderer(mut self, renderer: Box<dyn StyleRenderer>) -> Self {
        self.set_renderer(renderer);
        self
    }

    /// Read data files from `source` instead of the file system (builder style).
    pub fn with_data_source(mut self, source: impl DataSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Replace the renderer. It is told the current window size.
    pub fn set_renderer(&mut self, mut renderer: Box<dyn StyleRenderer>) {
        let window = self.tree.window_size();
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "The window size was set from integer pixels."
        )]
        renderer.set_window_size(window.width as u32, window.height as u32);
        self.renderer = Some(renderer);
    }

    /// The renderer, if one is set.
    pub fn renderer_mut(&mut self) -> Option<&mut (dyn StyleRenderer + 'static)> {
        self.renderer.as_deref_mut()
    }

    /// The configuration the scene was created with.
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    /// Loaded styles.
    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Mutable access to the loaded styles. Elements keep the styles they already resolved.
    pub fn styles_mut(&mut self) -> &mut StyleSheet {
        &mut self.styles
    }

    /// Loaded `#name` definitions.
    pub fn definitions(&self) -> &DataDefinitions {
        &self.definitions
    }

    /// The element tree.
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Mutable access to the element tree.
    ///
    /// Structural changes made here bypass widget bookkeeping; prefer the scene's own methods
    /// for removal and focus.
    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    /// The root element.
    pub fn root(&self) -> ElementId {
        self.tree.root()
    }

    // --- window ---

    /// Resize the window in pixels. Returns the new reference-to-pixel scale.
    pub fn set_window_size(&mut self, width: u32, height: u32) -> f64 {
        let scale = self
            .tree
            .set_window_size(width, height, self.config.reference_size());
        if let Some(renderer) = self.renderer.as_deref_mut() {
            renderer.set_window_size(width, height);
        }
        scale
    }

    /// Override the reference-to-pixel scale. Text is scaled by the same factor.
    pub fn set_render_scale(&mut self, scale: f64) {
        self.tree.set_scale(scale);
    }

    /// The reference-to-pixel scale.
    pub fn render_scale(&self) -> f64 {
        self.tree.ref_to_pixel_scale()
    }

    // --- elements ---

    /// Create a detached, registered element with the default widget for `class`.
    pub fn create_element(
        &mut self,
        class: &str,
        id: &str,
        props: ElementProperties,
    ) -> Result<ElementId> {
        let empty = serde_json::Value::Object(serde_json::Map::new());
        let widget = Widget::from_data(class, &DataObject::new(&empty, id)?)?;
        Ok(self.insert_element(id, props, widget))
    }

    /// Create a detached, registered element driven by `widget`.
    pub fn insert_element(
        &mut self,
        id: impl Into<Id>,
        props: ElementProperties,
        widget: impl Into<Widget>,
    ) -> ElementId {
        self.insert_widget(id.into(), props, widget.into(), true)
    }

    pub(crate) fn insert_widget(
        &mut self,
        id: Id,
        props: ElementProperties,
        widget: Widget,
        register: bool,
    ) -> ElementId {
        let style_id = props.style_id.clone();
        let element = self
            .tree
            .insert(id, Id::new(widget.class_name()), props, register);
        self.bind_style(element, &style_id);
        self.widgets.insert(element, widget);
        element
    }

    /// Attach `widget` to an existing element, replacing any widget it had.
    pub fn register_widget(&mut self, element: ElementId, widget: impl Into<Widget>) {
        if self.tree.is_alive(element) {
            self.widgets.insert(element, widget.into());
        } else {
            tracing::warn!("widget registered for a stale element");
        }
    }

    pub(crate) fn bind_style(&mut self, element: ElementId, style_id: &Id) {
        let style = self.styles.get(style_id);
        if style.is_none() {
            tracing::warn!(style = %style_id, "unknown style id");
        }
        self.tree.set_style(element, style);
    }

    /// Attach `child` as a full child of `parent`.
    pub fn add_child(&mut self, child: ElementId, parent: ElementId) -> bool {
        self.attach_to(child, parent, false)
    }

    /// Attach `child` as a sub-element of `parent`.
    pub fn add_sub_element(&mut self, child: ElementId, parent: ElementId) -> bool {
        self.attach_to(child, parent, true)
    }

    /// Attach `child` under `parent`. See [`ElementTree::attach_to`].
    pub fn attach_to(&mut self, child: ElementId, parent: ElementId, as_sub_element: bool) -> bool {
        self.tree.attach_to(child, parent, as_sub_element)
    }

    /// Detach `child` from its parent.
    pub fn detach(&mut self, child: ElementId) {
        self.tree.detach(child);
    }

    /// Remove `element`, its subtree, and their widgets.
    pub fn remove_element(&mut self, element: ElementId) {
        let removed = self.tree.remove(element);
        self.forget(removed);
    }

    /// Detach `element` and remove its full children.
    pub fn clear(&mut self, element: ElementId) {
        let removed = self.tree.clear(element);
        self.forget(removed);
    }

    /// Remove the full children of `parent`.
    pub fn clear_children(&mut self, parent: ElementId) {
        let removed = self.tree.clear_children(parent);
        self.forget(removed);
    }

    /// Remove everything below the root.
    pub fn clear_all_elements(&mut self) {
        let removed = self.tree.clear_all_elements();
        self.forget(removed);
        self.focus_scope = None;
    }

    fn forget(&mut self, removed: Vec<ElementId>) {
        for element in removed {
            self.widgets.remove(&element);
            self.pointer.forget(element);
            if self.focused == Some(element) {
                self.focused = None;
            }
            if self.hovered == Some(element) {
                self.hovered = None;
            }
        }
    }

    /// The registered element with id `id`. Logs a warning when there is none.
    pub fn find_by_id(&self, id: &str) -> Option<ElementId> {
        self.tree.find_by_id(&Id::new(id))
    }

    /// Point `element` at another style and tell its widget.
    pub fn set_style_id(&mut self, element: ElementId, style_id: impl Into<Id>) {
        let style_id = style_id.into();
        self.tree.set_style_id(element, style_id.clone());
        self.bind_style(element, &style_id);
        self.call(element, |widget, cx| {
            widget.handle_style_id_changed(&style_id, cx);
        });
    }

    /// Resize `element` (reference units) and tell its widget.
    pub fn set_size(&mut self, element: ElementId, size: Size) {
        self.tree.set_relative_size(element, size);
        self.call(element, |widget, cx| widget.handle_size_changed(size, cx));
    }

    /// Change the width of `element`, keeping its height.
    pub fn set_width(&mut self, element: ElementId, width: f64) {
        let height = self.tree.size_ref(element).height;
        self.set_size(element, Size::new(width, height));
    }

    /// Change the height of `element`, keeping its width.
    pub fn set_height(&mut self, element: ElementId, height: f64) {
        let width = self.tree.size_ref(element).width;
        self.set_size(element, Size::new(width, height));
    }

    /// Enable or disable `element`. Buttons switch to or from their disabled state.
    pub fn set_enabled(&mut self, element: ElementId, enabled: bool) {
        self.tree.set_enabled(element, enabled);
        match self.widgets.get_mut(&element) {
            Some(Widget::Button(button)) => button.set_disabled(!enabled),
            Some(Widget::CheckBox(check)) => check.button_mut().set_disabled(!enabled),
            _ => {}
        }
    }

    /// Returns true if the button or check box of `element` was pressed during this frame's
    /// update.
    pub fn was_pressed(&self, element: ElementId) -> bool {
        match self.widgets.get(&element) {
            Some(Widget::Button(button)) => button.was_pressed(),
            Some(Widget::CheckBox(check)) => check.button().was_pressed(),
            _ => false,
        }
    }

    /// Run every widget's `post_load` over the subtree of `element`, parents first.
    ///
    /// Layout and prefab loading do this themselves. Call it after assembling a subtree by
    /// hand so widgets can find their sub-elements.
    pub fn post_load(&mut self, element: ElementId) {
        let order = self.tree.depth_ordered(element);
        for &e in order.iter() {
            self.call(e, |widget, cx| widget.post_load(cx));
        }
    }

    // --- widgets ---

    /// Typed access to the widget of `element`.
    pub fn widget<W: WidgetKind>(&self, element: ElementId) -> Option<&W> {
        self.widgets.get(&element).and_then(W::from_widget)
    }

    /// Typed mutable access to the widget of `element`.
    pub fn widget_mut<W: WidgetKind>(&mut self, element: ElementId) -> Option<&mut W> {
        self.widgets.get_mut(&element).and_then(W::from_widget_mut)
    }

    /// The untyped widget of `element`.
    pub fn widget_any(&self, element: ElementId) -> Option<&Widget> {
        self.widgets.get(&element)
    }

    /// Call `f` with the typed widget of `element` and a context for changing the scene.
    ///
    /// ```
    /// use understory_element_tree::ElementProperties;
    /// use understory_uitk::widgets::ConsoleWindow;
    /// use understory_uitk::{UiConfig, UiManager};
    ///
    /// let mut ui = UiManager::new(UiConfig::default());
    /// let log = ui.insert_element("log", ElementProperties::default(), ConsoleWindow::new(10));
    /// ui.with_widget(log, |console: &mut ConsoleWindow, cx| {
    ///     console.append_line_of_text(cx, "ready");
    /// });
    /// assert_eq!(ui.widget::<ConsoleWindow>(log).unwrap().lines(), ["ready"]);
    /// ```
    pub fn with_widget<W, R>(
        &mut self,
        element: ElementId,
        f: impl FnOnce(&mut W, &mut WidgetCx<'_>) -> R,
    ) -> Option<R>
    where
        W: WidgetKind,
    {
        let mut widget = self.widgets.remove(&element)?;
        let (result, request) = match W::from_widget_mut(&mut widget) {
            Some(typed) => {
                let mut cx =
                    WidgetCx::new(element, &mut self.tree, &mut self.widgets, &self.styles);
                let result = f(typed, &mut cx);
                (Some(result), cx.take_focus_request())
            }
            None => (None, None),
        };
        self.widgets.insert(element, widget);
        if let Some(target) = request {
            self.set_focus(target);
        }
        result
    }

    /// Take the widget out of the map, run `f`, put it back, and honor any focus request.
    fn call<R>(
        &mut self,
        element: ElementId,
        f: impl FnOnce(&mut dyn WidgetBehavior, &mut WidgetCx<'_>) -> R,
    ) -> Option<R> {
        let mut widget = self.widgets.remove(&element)?;
        let mut cx = WidgetCx::new(element, &mut self.tree, &mut self.widgets, &self.styles);
        let result = f(widget.behavior(), &mut cx);
        let request = cx.take_focus_request();
        self.widgets.insert(element, widget);
        if let Some(target) = request {
            self.set_focus(target);
        }
        Some(result)
    }

    fn dispatch_event(
        &mut self,
        element: ElementId,
        kind: InputEventKind,
        input: &InputState,
    ) -> Outcome {
        self.call(element, |widget, cx| {
            widget.handle_input_event(&InputEvent::new(kind, input), cx)
        })
        .unwrap_or(Outcome::NotHandled)
    }

    // --- hit testing ---

    /// Topmost element under a pixel.
    pub fn element_under_pixel(&self, point: Point) -> Option<ElementId> {
        self.tree.element_under_pixel(point)
    }

    /// Topmost visible element under a pixel.
    pub fn visible_element_under_pixel(&self, point: Point) -> Option<ElementId> {
        self.tree.visible_element_under_pixel(point)
    }

    /// Topmost element under a pixel that can take focus.
    pub fn focusable_element_under_pixel(&self, point: Point) -> Option<ElementId> {
        self.tree.focusable_element_under_pixel(point)
    }

    /// Every element under a pixel, topmost last.
    pub fn elements_under_pixel(&self, point: Point) -> Vec<ElementId> {
        self.tree.elements_under_pixel(point)
    }

    // --- focus ---

    /// The focused element.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// The element the pointer is hovering, if it is not the focused one.
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Root of the subtree focus is confined to.
    pub fn focus_scope(&self) -> ElementId {
        self.focus_scope.unwrap_or_else(|| self.tree.root())
    }

    /// Confine focus to the subtree of `scope`, or to the whole scene with `None`.
    ///
    /// The focused element is moved into the scope on the next update.
    pub fn set_focus_scope(&mut self, scope: Option<ElementId>) {
        self.focus_scope = scope;
    }

    fn in_focus_scope(&self, element: ElementId) -> bool {
        let scope = self.focus_scope();
        element == scope || self.tree.is_ancestor_of_me(element, scope)
    }

    /// Focus `element` if it can take focus, is inside the focus scope, and is not already
    /// focused. Returns true if focus moved.
    pub fn set_focus(&mut self, element: ElementId) -> bool {
        if self.focused == Some(element)
            || !self.tree.can_be_focused(element)
            || !self.in_focus_scope(element)
        {
            return false;
        }
        self.make_focus_element(Some(element));
        true
    }

    /// Remove focus from whatever has it.
    pub fn clear_focus(&mut self) {
        self.make_focus_element(None);
    }

    /// Move focus unconditionally: the old element gets `LoseFocus`, the new one `GainFocus`.
    pub fn make_focus_element(&mut self, element: Option<ElementId>) {
        let input = self.input.clone();
        if let Some(old) = self.focused.take() {
            self.tree.set_focused(old, false);
            self.dispatch_event(old, InputEventKind::LoseFocus, &input);
        }
        if let Some(new) = element {
            tracing::debug!(element = %self.tree.id(new).map_or("<stale>", Id::as_str), "focus");
            self.focused = Some(new);
            self.tree.set_focused(new, true);
            self.dispatch_event(new, InputEventKind::GainFocus, &input);
        }
    }

    /// Elements other than the focused one that could take focus, in scope depth order.
    fn focus_candidates(&self) -> Vec<ElementId> {
        self.tree
            .depth_ordered(self.focus_scope())
            .iter()
            .copied()
            .filter(|&e| Some(e) != self.focused && self.tree.can_be_focused(e))
            .collect()
    }

    /// Directional search over reference-unit rectangles, so the chosen neighbor does not
    /// depend on the window scale.
    fn focusable_in_direction(&self, direction: Direction) -> Option<ElementId> {
        let focused = self.tree.screen_rect_ref(self.focused?);
        let candidates = self
            .focus_candidates()
            .into_iter()
            .map(|e| (e, self.tree.screen_rect_ref(e)));
        find_in_direction(direction, focused, candidates)
    }

    /// Nearest focusable element left of the focused one.
    pub fn get_left_focusable_element(&self) -> Option<ElementId> {
        self.focusable_in_direction(Direction::Left)
    }

    /// Nearest focusable element right of the focused one.
    pub fn get_right_focusable_element(&self) -> Option<ElementId> {
        self.focusable_in_direction(Direction::Right)
    }

    /// Nearest focusable element above the focused one.
    pub fn get_up_focusable_element(&self) -> Option<ElementId> {
        self.focusable_in_direction(Direction::Up)
    }

    /// Nearest focusable element below the focused one.
    pub fn get_down_focusable_element(&self) -> Option<ElementId> {
        self.focusable_in_direction(Direction::Down)
    }

    /// The candidate in scope passing `filter` with the lowest `score`; the first in depth
    /// order wins ties. The focused element is never a candidate.
    pub fn get_next_focusable_element(
        &self,
        mut filter: impl FnMut(ElementId) -> bool,
        mut score: impl FnMut(ElementId) -> f64,
    ) -> Option<ElementId> {
        next_focusable(self.focus_candidates(), |e| filter(*e), |e| score(*e))
    }

    // --- update ---

    /// Advance the scene one frame.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        self.input = input.clone();
        self.tree.advance_frame();

        let order = self.tree.depth_ordered(self.tree.root());
        for &element in order.iter() {
            if self.tree.is_enabled(element)
                && let Some(widget) = self.widgets.get_mut(&element)
            {
                widget.behavior().reset_event_state();
            }
        }

        if !self.dispatch_global_input(input) {
            self.handle_mouse_input(input);
            self.handle_directional_input(input, InputState::keyboard_direction_pressed);
            self.handle_directional_input(input, InputState::gamepad_direction_pressed);
        }

        self.refresh_focus_scope();
        if self
            .focused
            .is_none_or(|f| !self.tree.can_be_focused(f) || !self.in_focus_scope(f))
        {
            let first = self
                .tree
                .depth_ordered(self.focus_scope())
                .iter()
                .copied()
                .find(|&e| self.tree.can_be_focused(e));
            if first != self.focused {
                self.make_focus_element(first);
            }
        }
        if self.hovered.is_some() && self.hovered == self.focused {
            self.hovered = None;
        }

        if let Some(focused) = self.focused {
            self.dispatch_input_state_change(focused, input);
        }

        let order = self.tree.depth_ordered(self.tree.root());
        for &element in order.iter() {
            if self.tree.is_alive(element) && self.tree.is_enabled(element) {
                self.call(element, |widget, cx| widget.update(dt, cx));
            }
        }
    }

    /// Offer `input` to the focused chain, then the hover chain. Returns true if handled.
    ///
    /// The hover chain is tried even when nothing is focused. Disabled elements are skipped
    /// but their ancestors still get a turn.
    fn dispatch_global_input(&mut self, input: &InputState) -> bool {
        for start in [self.focused, self.hovered] {
            let mut current = start;
            while let Some(element) = current {
                current = self.tree.parent(element);
                if !self.tree.is_enabled(element) {
                    continue;
                }
                let outcome = self
                    .call(element, |widget, cx| widget.handle_global_input_state(input, cx))
                    .unwrap_or(Outcome::NotHandled);
                if outcome.is_handled() {
                    tracing::trace!(
                        element = %self.tree.id(element).map_or("<stale>", Id::as_str),
                        "global input handled"
                    );
                    return true;
                }
            }
        }
        false
    }

    fn handle_mouse_input(&mut self, input: &InputState) {
        let under = self
            .tree
            .focusable_element_under_pixel(input.mouse_position())
            .filter(|&e| self.in_focus_scope(e));
        let pressed = input.left_button() == MouseButton::Pressed;
        let step = self
            .pointer
            .update(under, self.focused, self.hovered, pressed);
        self.hovered = step.hovered;
        for (element, kind) in step.events {
            self.dispatch_event(element, kind, input);
        }
        if let Some(target) = step.focus_request {
            self.make_focus_element(Some(target));
        }
    }

    fn handle_directional_input(
        &mut self,
        input: &InputState,
        pressed: fn(&InputState, Direction) -> bool,
    ) {
        let Some(direction) = Direction::ALL.into_iter().find(|&d| pressed(input, d)) else {
            return;
        };
        if let Some(target) = self.focusable_in_direction(direction) {
            self.make_focus_element(Some(target));
        }
    }

    fn refresh_focus_scope(&mut self) {
        if let Some(scope) = self.focus_scope
            && scope != self.tree.root()
            && !self.tree.is_attached(scope)
        {
            tracing::debug!("focus scope detached, falling back to the root");
            self.focus_scope = None;
        }
    }

    /// Root-first delivery of `InputStateChange` along the focused element's ancestor chain.
    fn dispatch_input_state_change(&mut self, focused: ElementId, input: &InputState) {
        let mut chain = vec![focused];
        let mut current = self.tree.parent(focused);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.tree.parent(parent);
        }
        for element in chain.into_iter().rev() {
            if self
                .dispatch_event(element, InputEventKind::InputStateChange, input)
                .is_handled()
            {
                break;
            }
        }
    }

    // --- render ---

    /// Render the scene with the scene's renderer. Does nothing without one.
    ///
    /// Every element is rendered even if one fails; the first error is returned.
    pub fn render(&mut self) -> understory_style::Result<()> {
        let Some(mut renderer) = self.renderer.take() else {
            return Ok(());
        };
        let result = self.render_to(renderer.as_mut());
        self.renderer = Some(renderer);
        result
    }

    /// Render the scene with `renderer`.
    pub fn render_to(&mut self, renderer: &mut dyn StyleRenderer) -> understory_style::Result<()> {
        renderer.setup_render();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Font scales are stored as f32."
        )]
        let font_scale = renderer.push_font_scale(self.tree.ref_to_pixel_scale() as f32);

        let order: Rc<[ElementId]> = self.tree.depth_ordered(self.tree.root());
        let mut first_error = None;
        // Elements whose descendants are still rendering, with their pushed tint index.
        let mut ancestors: Vec<(ElementId, Option<usize>)> = Vec::new();
        // The last rendered element, until we know whether it has visible descendants.
        let mut pending: Option<(ElementId, Option<usize>)> = None;

        for &element in order.iter() {
            if !self.tree.is_visible(element) {
                continue;
            }
            let parent = self.tree.parent(element);
            if let Some(last) = pending.take() {
                if Some(last.0) == parent {
                    ancestors.push(last);
                } else {
                    self.post_render_element(last, renderer);
                }
            }
            while let Some(&top) = ancestors.last() {
                if Some(top.0) == parent {
                    break;
                }
                ancestors.pop();
                self.post_render_element(top, renderer);
            }
            let (pushed, result) = self.render_element(element, renderer);
            if let Err(e) = result {
                tracing::warn!(
                    element = %self.tree.id(element).map_or("<stale>", Id::as_str),
                    error = %e,
                    "render failed"
                );
                first_error.get_or_insert(e);
            }
            pending = Some((element, pushed));
        }
        if let Some(last) = pending {
            self.post_render_element(last, renderer);
        }
        while let Some(top) = ancestors.pop() {
            self.post_render_element(top, renderer);
        }

        renderer.pop_font_scale(font_scale);
        renderer.finalize_render();
        first_error.map_or(Ok(()), Err)
    }

    fn render_element(
        &mut self,
        element: ElementId,
        renderer: &mut dyn StyleRenderer,
    ) -> (Option<usize>, understory_style::Result<()>) {
        let style = self.tree.style(element).cloned();
        let pushed = style.as_ref().and_then(|s| s.before_render(renderer));
        let result = match self.widgets.get_mut(&element) {
            Some(widget) => widget.behavior().render(&mut RenderCx {
                element,
                tree: &self.tree,
                renderer: &mut *renderer,
            }),
            None => Ok(()),
        };
        let pushed = match &style {
            Some(style) => style.after_render(renderer, pushed),
            None => pushed,
        };
        (pushed, result)
    }

    fn post_render_element(
        &mut self,
        (element, pushed): (ElementId, Option<usize>),
        renderer: &mut dyn StyleRenderer,
    ) {
        if let Some(widget) = self.widgets.get_mut(&element) {
            widget.behavior().post_render(&mut RenderCx {
                element,
                tree: &self.tree,
                renderer: &mut *renderer,
            });
        }
        if let Some(style) = self.tree.style(element) {
            style.post_render(renderer, pushed);
        }
    }
}
