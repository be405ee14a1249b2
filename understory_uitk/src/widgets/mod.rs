// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget behaviors.
//!
//! ## Overview
//!
//! Every element in a scene carries one [`Widget`]: a closed enum with one variant per widget
//! kind. The element tree owns structure, geometry, flags and the resolved style; the widget
//! owns kind-specific state (a button's press state, a slider's value) and reacts to the
//! scene's per-frame passes through [`WidgetBehavior`].
//!
//! Behaviors never hold references into the scene. Each call receives a context with the
//! element handle and mutable access to the tree and to the other widgets, so a stack panel
//! can reposition its children and drive its scroll slider in the same update.
//!
//! Typed access goes through [`WidgetKind`]:
//!
//! ```
//! use understory_uitk::widgets::{Slider, Widget, WidgetKind};
//!
//! let widget = Widget::from(Slider::default());
//! assert!(Slider::from_widget(&widget).is_some());
//! assert_eq!(widget.class_name(), "Slider");
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{Rect, Size};
use understory_element_tree::{ElementId, ElementTree};
use understory_focus::input::InputState;
use understory_focus::types::{InputEvent, Outcome};
use understory_style::{FrameNumber, Id, Style, StyleRenderer, StyleSheet};

use crate::data::DataObject;
use crate::error::{Result, UiError};

mod button;
mod check_box;
mod console;
mod image;
mod panel;
mod progress_bar;
mod slider;
mod stack_panel;
mod text;
mod twist_menu;

pub use button::{Button, ButtonState};
pub use check_box::CheckBox;
pub use console::ConsoleWindow;
pub use image::Image;
pub use panel::Panel;
pub use progress_bar::ProgressBar;
pub use slider::{Slider, SliderOrientation, SliderType};
pub use stack_panel::{StackOrientation, StackPanel};
pub use text::StaticText;
pub use twist_menu::{SelectedItem, TwistMenu};

/// Widgets keyed by the element they belong to.
pub type WidgetMap = HashMap<ElementId, Widget>;

/// Context for behavior calls that may change the scene.
pub struct WidgetCx<'a> {
    /// The element being called.
    pub element: ElementId,
    /// The element tree.
    pub tree: &'a mut ElementTree,
    /// Every other widget. The called widget is not in the map during the call.
    pub widgets: &'a mut WidgetMap,
    /// Loaded styles.
    pub styles: &'a StyleSheet,
    focus_request: Option<ElementId>,
}

impl core::fmt::Debug for WidgetCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WidgetCx")
            .field("element", &self.element)
            .field("widgets", &self.widgets.len())
            .field("focus_request", &self.focus_request)
            .finish_non_exhaustive()
    }
}

impl<'a> WidgetCx<'a> {
    pub(crate) fn new(
        element: ElementId,
        tree: &'a mut ElementTree,
        widgets: &'a mut WidgetMap,
        styles: &'a StyleSheet,
    ) -> Self {
        Self {
            element,
            tree,
            widgets,
            styles,
            focus_request: None,
        }
    }

    /// Ask the scene to focus `element` once this call returns.
    pub fn request_focus(&mut self, element: ElementId) {
        self.focus_request = Some(element);
    }

    pub(crate) fn take_focus_request(&mut self) -> Option<ElementId> {
        self.focus_request.take()
    }

    /// A sub-element of the called element by id, searched recursively.
    pub fn sub_element(&self, id: &Id) -> Option<ElementId> {
        if id.is_empty() {
            return None;
        }
        let found = self.tree.sub_element_by_id(self.element, id, true);
        if found.is_none() {
            tracing::warn!(
                element = %self.tree.id(self.element).map_or("<stale>", Id::as_str),
                sub_element = %id,
                "sub-element not found"
            );
        }
        found
    }

    /// Typed access to another element's widget.
    pub fn widget<W: WidgetKind>(&self, element: ElementId) -> Option<&W> {
        self.widgets.get(&element).and_then(W::from_widget)
    }

    /// Typed mutable access to another element's widget.
    pub fn widget_mut<W: WidgetKind>(&mut self, element: ElementId) -> Option<&mut W> {
        self.widgets.get_mut(&element).and_then(W::from_widget_mut)
    }

    /// Typed mutable access to another widget together with the tree.
    pub fn widget_and_tree<W: WidgetKind>(
        &mut self,
        element: ElementId,
    ) -> Option<(&mut W, &mut ElementTree)> {
        let widget = self.widgets.get_mut(&element).and_then(W::from_widget_mut)?;
        Some((widget, &mut *self.tree))
    }

    /// Point `element` at the style `style_id` without notifying its widget.
    pub fn apply_style(&mut self, element: ElementId, style_id: &Id) {
        if self.tree.style_id(element) == Some(style_id) {
            return;
        }
        let style = self.styles.get(style_id);
        if style.is_none() {
            tracing::warn!(style = %style_id, "unknown style id");
        }
        self.tree.set_style_id(element, style_id.clone());
        self.tree.set_style(element, style);
    }
}

/// Context for the render pass.
pub struct RenderCx<'a> {
    /// The element being rendered.
    pub element: ElementId,
    /// The element tree.
    pub tree: &'a ElementTree,
    /// The active renderer.
    pub renderer: &'a mut dyn StyleRenderer,
}

impl core::fmt::Debug for RenderCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderCx")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

impl RenderCx<'_> {
    /// The element's resolved style.
    pub fn style(&self) -> Option<Rc<Style>> {
        self.tree.style(self.element).cloned()
    }

    /// Current frame.
    pub fn frame(&self) -> FrameNumber {
        self.tree.frame()
    }

    /// The element's rectangle in pixels.
    pub fn screen_rect_px(&self) -> Rect {
        self.tree.screen_rect_px(self.element)
    }

    /// Reference units to pixels.
    pub fn scale(&self) -> f64 {
        self.tree.ref_to_pixel_scale()
    }
}

/// The per-frame hooks a widget kind can override. Every hook defaults to doing nothing.
pub trait WidgetBehavior {
    /// An input event targeted at this element. Returns whether it was consumed.
    fn handle_input_event(&mut self, event: &InputEvent<'_>, cx: &mut WidgetCx<'_>) -> Outcome {
        let _ = (event, cx);
        Outcome::NotHandled
    }

    /// The whole input state, offered before focus navigation. Handling it suppresses
    /// navigation this frame.
    fn handle_global_input_state(
        &mut self,
        input: &InputState,
        cx: &mut WidgetCx<'_>,
    ) -> Outcome {
        let _ = (input, cx);
        Outcome::NotHandled
    }

    /// Per-frame update, parents before children.
    fn update(&mut self, dt: f32, cx: &mut WidgetCx<'_>) {
        let _ = (dt, cx);
    }

    /// Draw the element. Descendants draw after this returns.
    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        let _ = cx;
        Ok(())
    }

    /// Called once after every descendant has rendered.
    fn post_render(&mut self, cx: &mut RenderCx<'_>) {
        let _ = cx;
    }

    /// Clear one-frame flags. Called at the start of every update.
    fn reset_event_state(&mut self) {}

    /// The element's style id was changed through the scene.
    fn handle_style_id_changed(&mut self, style_id: &Id, cx: &mut WidgetCx<'_>) {
        let _ = (style_id, cx);
    }

    /// The element's size was changed through the scene.
    fn handle_size_changed(&mut self, size: Size, cx: &mut WidgetCx<'_>) {
        let _ = (size, cx);
    }

    /// Called once after the element and its whole loaded subtree exist.
    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        let _ = cx;
    }
}

/// Typed access to one [`Widget`] variant.
pub trait WidgetKind: Into<Widget> {
    /// Borrow the variant if `widget` is this kind.
    fn from_widget(widget: &Widget) -> Option<&Self>;
    /// Mutably borrow the variant if `widget` is this kind.
    fn from_widget_mut(widget: &mut Widget) -> Option<&mut Self>;
}

macro_rules! widgets {
    ($( $(#[$meta:meta])* $variant:ident => $class:literal ),+ $(,)?) => {
        /// The behavior attached to an element.
        #[derive(Debug)]
        pub enum Widget {
            $( $(#[$meta])* $variant($variant), )+
        }

        impl Widget {
            /// The class id this widget kind is created from.
            pub fn class_name(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $class, )+
                }
            }

            pub(crate) fn behavior(&mut self) -> &mut dyn WidgetBehavior {
                match self {
                    $( Self::$variant(w) => w, )+
                }
            }
        }

        $(
            impl From<$variant> for Widget {
                fn from(widget: $variant) -> Self {
                    Self::$variant(widget)
                }
            }

            impl WidgetKind for $variant {
                fn from_widget(widget: &Widget) -> Option<&Self> {
                    match widget {
                        Widget::$variant(w) => Some(w),
                        _ => None,
                    }
                }

                fn from_widget_mut(widget: &mut Widget) -> Option<&mut Self> {
                    match widget {
                        Widget::$variant(w) => Some(w),
                        _ => None,
                    }
                }
            }
        )+
    };
}

widgets! {
    /// Sprite background, optionally clipping its descendants.
    Panel => "Panel",
    /// Text with wrapping and truncation.
    StaticText => "StaticText",
    /// A sprite with an optional texture override.
    Image => "Image",
    /// A focusable button with per-state styles.
    Button => "Button",
    /// A button with a checked state.
    CheckBox => "CheckBox",
    /// A fill bar.
    ProgressBar => "ProgressBar",
    /// A thumb dragged along a background.
    Slider => "Slider",
    /// Children laid out in a line, optionally paged.
    StackPanel => "StackPanel",
    /// A scrolling log of text lines.
    ConsoleWindow => "ConsoleWindow",
    /// A left/right item picker.
    TwistMenu => "TwistMenu",
}

impl Widget {
    /// Create a widget from element data for the class `class` (case-insensitive).
    pub fn from_data(class: &str, data: &DataObject<'_>) -> Result<Self> {
        let widget = match Id::new(class).as_str() {
            "panel" => Panel::from_data(data)?.into(),
            "statictext" => StaticText::from_data(data)?.into(),
            "image" => Image::from_data(data)?.into(),
            "button" => Button::from_data(data)?.into(),
            "checkbox" => CheckBox::from_data(data)?.into(),
            "progressbar" => ProgressBar::from_data(data)?.into(),
            "slider" => Slider::from_data(data)?.into(),
            "stackpanel" | "horizontalstackpanel" => {
                StackPanel::from_data(data, StackOrientation::Right)?.into()
            }
            "verticalstackpanel" => StackPanel::from_data(data, StackOrientation::Down)?.into(),
            "consolewindow" => ConsoleWindow::from_data(data)?.into(),
            "twistmenu" => TwistMenu::from_data(data)?.into(),
            _ => {
                return Err(UiError::UnknownClass {
                    context: data.context().to_owned(),
                    class: class.to_owned(),
                });
            }
        };
        Ok(widget)
    }

    /// Returns true if a widget kind is registered for `class`.
    pub fn is_known_class(class: &str) -> bool {
        matches!(
            Id::new(class).as_str(),
            "panel"
                | "statictext"
                | "image"
                | "button"
                | "checkbox"
                | "progressbar"
                | "slider"
                | "stackpanel"
                | "horizontalstackpanel"
                | "verticalstackpanel"
                | "consolewindow"
                | "twistmenu"
        )
    }
}

/// Draw the element's sprite over its pixel rectangle, if its style is a sprite style.
pub(crate) fn render_background(cx: &mut RenderCx<'_>) {
    if let Some(style) = cx.style() {
        let rect = cx.screen_rect_px();
        let scale = cx.scale();
        style.render_sprite(cx.renderer, rect, scale, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_lookup_is_case_insensitive() {
        let value = json!({ "id": "x" });
        let data = DataObject::new(&value, "x").unwrap();
        assert_eq!(
            Widget::from_data("STATICTEXT", &data).unwrap().class_name(),
            "StaticText"
        );
        assert!(matches!(
            Widget::from_data("VerticalStackPanel", &data).unwrap(),
            Widget::StackPanel(p) if p.orientation() == StackOrientation::Down
        ));
        assert!(matches!(
            Widget::from_data("Marquee", &data),
            Err(UiError::UnknownClass { class, .. }) if class == "Marquee"
        ));
        assert!(Widget::is_known_class("twistMenu"));
        assert!(!Widget::is_known_class("marquee"));
    }

    #[test]
    fn typed_access() {
        let mut widget = Widget::from(Button::default());
        assert!(Button::from_widget(&widget).is_some());
        assert!(Panel::from_widget(&widget).is_none());
        assert!(Button::from_widget_mut(&mut widget).is_some());
    }
}
