// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kurbo::Vec2;
use understory_element_tree::{
    Anchor, ElementFlags, ElementId, ElementTree, HorizontalAnchor, VerticalAnchor,
};
use understory_focus::input::InputState;
use understory_focus::types::{Direction, Outcome};
use understory_style::Id;

use super::{Slider, WidgetBehavior, WidgetCx};
use crate::data::DataObject;
use crate::error::Result;

/// Direction in which a [`StackPanel`] lays out its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackOrientation {
    /// Top to bottom.
    #[default]
    Down,
    /// Bottom to top.
    Up,
    /// Right to left.
    Left,
    /// Left to right.
    Right,
}

impl StackOrientation {
    /// Look up an orientation by its data name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match Id::new(name).as_str() {
            "down" => Some(Self::Down),
            "up" => Some(Self::Up),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Returns true for [`Down`](Self::Down) and [`Up`](Self::Up).
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Down | Self::Up)
    }

    fn sign(self) -> Vec2 {
        match self {
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// Lays its full children out in a line.
///
/// Every update, each visible child is anchored at the panel's leading edge and offset by
/// the sizes of the children before it plus `stackElementPadding` between neighbors.
/// Children that are themselves stack panels keep their own anchors.
///
/// With `maxVisibleItems > 0` only a window of that many children is shown. The window
/// shifts when focus sits on its first or last child and a direction along the stack is
/// pressed, or on any scroll wheel movement for vertical stacks. An optional slider
/// sub-element mirrors and drives the window position.
#[derive(Debug)]
pub struct StackPanel {
    orientation: StackOrientation,
    padding: f64,
    horizontal_alignment: HorizontalAnchor,
    vertical_alignment: VerticalAnchor,
    max_visible: usize,
    slider_id: Id,
    slider: Option<ElementId>,
    // Shared with the slider's value listener, which must be `Send`.
    start: Arc<AtomicUsize>,
    laid_out: usize,
    pending_focus: Option<usize>,
}

impl Default for StackPanel {
    fn default() -> Self {
        Self::new(StackOrientation::Down)
    }
}

impl StackPanel {
    /// An unpaged stack with no padding.
    pub fn new(orientation: StackOrientation) -> Self {
        Self {
            orientation,
            padding: 0.0,
            horizontal_alignment: HorizontalAnchor::Left,
            vertical_alignment: VerticalAnchor::Top,
            max_visible: 0,
            slider_id: Id::default(),
            slider: None,
            start: Arc::new(AtomicUsize::new(0)),
            laid_out: 0,
            pending_focus: None,
        }
    }

    /// Set the gap between neighbors in reference units (builder style).
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Show at most `count` children at a time; zero shows all (builder style).
    pub fn with_max_visible(mut self, count: usize) -> Self {
        self.max_visible = count;
        self
    }

    /// Set the cross-axis alignment (builder style).
    pub fn with_alignment(mut self, horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
        self
    }

    /// Set the scroll slider sub-element id (builder style).
    pub fn with_slider(mut self, slider: impl Into<Id>) -> Self {
        self.slider_id = slider.into();
        self
    }

    pub(crate) fn from_data(
        data: &DataObject<'_>,
        default_orientation: StackOrientation,
    ) -> Result<Self> {
        let orientation = data
            .named("stackingOrientation", StackOrientation::from_name)?
            .unwrap_or(default_orientation);
        let mut panel = Self::new(orientation);
        if orientation.is_vertical() {
            if let Some(h) = data.named("stackElementAlignment", HorizontalAnchor::from_name)? {
                panel.horizontal_alignment = h;
            }
        } else if let Some(v) = data.named("stackElementAlignment", VerticalAnchor::from_name)? {
            panel.vertical_alignment = v;
        }
        panel.padding = data.f64("stackElementPadding")?.unwrap_or(0.0);
        panel.max_visible = data.u32("maxVisibleItems")?.unwrap_or(0) as usize;
        panel.slider_id = Id::new(data.str("sliderSubElementId")?.unwrap_or_default());
        Ok(panel)
    }

    /// Stacking direction.
    pub fn orientation(&self) -> StackOrientation {
        self.orientation
    }

    /// Gap between neighbors in reference units.
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Window size; zero when unpaged.
    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    /// Index of the first child in the window.
    pub fn start_index(&self) -> usize {
        self.start.load(Ordering::Relaxed)
    }

    /// Index of the last child in the window (may lie past the last child).
    pub fn end_index(&self) -> usize {
        (self.start_index() + self.max_visible).saturating_sub(1)
    }

    /// Hide and detach every child and scroll back to the start.
    pub fn reset(&mut self, tree: &mut ElementTree, element: ElementId) {
        self.start.store(0, Ordering::Relaxed);
        for child in tree.children(element).to_vec() {
            tree.set_visible(child, false);
            tree.detach(child);
        }
        self.laid_out = 0;
    }

    fn anchor(&self) -> Anchor {
        match self.orientation {
            StackOrientation::Down => Anchor::new(self.horizontal_alignment, VerticalAnchor::Top),
            StackOrientation::Up => Anchor::new(self.horizontal_alignment, VerticalAnchor::Bottom),
            StackOrientation::Left => Anchor::new(HorizontalAnchor::Right, self.vertical_alignment),
            StackOrientation::Right => Anchor::new(HorizontalAnchor::Left, self.vertical_alignment),
        }
    }

    fn is_paged(&self) -> bool {
        self.max_visible > 0
    }

    /// Resize the slider range to the number of hidden positions.
    fn sync_slider(&self, children: &[ElementId], cx: &mut WidgetCx<'_>) {
        let Some(slider) = self.slider else {
            return;
        };
        let max_visible = self.max_visible;
        let first_size = cx.tree.size_ref(children[0]);
        let padding = self.padding;
        let vertical = self.orientation.is_vertical();
        let Some((widget, tree)) = cx.widget_and_tree::<Slider>(slider) else {
            return;
        };
        let hidden = children.len().saturating_sub(max_visible);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            reason = "Child counts are small."
        )]
        let (max_value, steps) = (hidden as f32, hidden as u32 + 1);
        widget.modify_slider_range(tree, 0.0, max_value, steps);
        widget.set_slider_value(tree, 0.0);
        #[allow(clippy::cast_precision_loss, reason = "Child counts are small.")]
        let (count, gaps) = (max_visible as f64, max_visible.saturating_sub(1) as f64);
        if vertical {
            tree.set_height(slider, first_size.height * count + padding * gaps);
        } else {
            tree.set_width(slider, first_size.width * count + padding * gaps);
        }
    }

    fn focused_at_beginning(&self, children: &[ElementId], tree: &ElementTree) -> bool {
        children
            .get(self.start_index())
            .is_some_and(|&c| tree.is_focused(c))
    }

    fn focused_at_end(&self, children: &[ElementId], tree: &ElementTree) -> bool {
        let last = if self.is_paged() && children.len() > self.max_visible {
            self.end_index()
        } else {
            children.len().saturating_sub(1)
        };
        children.get(last).is_some_and(|&c| tree.is_focused(c))
    }

    fn shift(&mut self, forward: bool, is_mouse: bool, cx: &mut WidgetCx<'_>) -> Outcome {
        let children = cx.tree.children(cx.element).to_vec();
        let at_beginning = self.focused_at_beginning(&children, cx.tree);
        let at_end = self.focused_at_end(&children, cx.tree);
        let start = self.start_index();
        let (trigger, more) = if forward {
            (at_end, self.end_index() + 1 < children.len())
        } else {
            (at_beginning, start > 0)
        };
        if !(is_mouse || trigger) || !more {
            return Outcome::NotHandled;
        }
        let start = if forward { start + 1 } else { start - 1 };
        self.start.store(start, Ordering::Relaxed);
        let end = self.end_index();
        tracing::debug!(start, end, count = children.len(), "shifted stack window");
        if at_beginning {
            self.pending_focus = Some(start);
        } else if at_end {
            self.pending_focus = Some(end);
        }
        if let Some(slider) = self.slider
            && cx.tree.is_visible(slider)
            && let Some((widget, tree)) = cx.widget_and_tree::<Slider>(slider)
        {
            #[allow(clippy::cast_precision_loss, reason = "Child counts are small.")]
            let value = start as f32;
            widget.set_slider_value(tree, value);
        }
        Outcome::Handled
    }
}

impl WidgetBehavior for StackPanel {
    fn handle_global_input_state(
        &mut self,
        input: &InputState,
        cx: &mut WidgetCx<'_>,
    ) -> Outcome {
        if !self.is_paged() || cx.tree.child_count(cx.element) == 0 {
            return Outcome::NotHandled;
        }
        let (back, forward) = if self.orientation.is_vertical() {
            (Direction::Up, Direction::Down)
        } else {
            (Direction::Left, Direction::Right)
        };
        let mut previous = input.direction_pressed(back);
        let mut next = input.direction_pressed(forward);
        let mut is_mouse = false;
        if self.orientation.is_vertical() {
            let scroll = input.scroll_delta();
            if scroll < 0 {
                is_mouse = true;
                next = true;
            } else if scroll > 0 {
                is_mouse = true;
                previous = true;
            }
        }
        if previous {
            self.shift(false, is_mouse, cx)
        } else if next {
            self.shift(true, is_mouse, cx)
        } else {
            Outcome::NotHandled
        }
    }

    fn update(&mut self, _dt: f32, cx: &mut WidgetCx<'_>) {
        let children = cx.tree.children(cx.element).to_vec();
        let count = children.len();
        if count != self.laid_out && count > 0 {
            if self.is_paged() {
                self.sync_slider(&children, cx);
                let last_start = count.saturating_sub(self.max_visible);
                if self.start_index() > last_start {
                    self.start.store(last_start, Ordering::Relaxed);
                }
            }
            self.laid_out = count;
        }

        let anchor = self.anchor();
        let sign = self.orientation.sign();
        let (start, end) = (self.start_index(), self.end_index());
        let mut offset = Vec2::ZERO;
        for (i, &child) in children.iter().enumerate() {
            if self.is_paged() {
                cx.tree.set_visible(child, i >= start && i <= end);
            }
            if !cx.tree.flags(child).contains(ElementFlags::VISIBLE) {
                continue;
            }
            let nested = cx
                .tree
                .class_id(child)
                .is_some_and(|class| class.as_str().ends_with("stackpanel"));
            if !nested {
                cx.tree.set_positioning_anchor(child, anchor);
                cx.tree.set_sizing_anchor(child, anchor);
            }
            cx.tree.set_relative_position(child, offset);
            let size = cx.tree.size_ref(child);
            offset += sign * self.padding + Vec2::new(sign.x * size.width, sign.y * size.height);
        }

        if let Some(slider) = self.slider {
            cx.tree
                .set_visible(slider, self.is_paged() && count > self.max_visible);
        }
        if let Some(index) = self.pending_focus.take()
            && let Some(&child) = children.get(index)
        {
            cx.request_focus(child);
        }
    }

    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        self.slider = cx.sub_element(&self.slider_id);
        let Some(slider) = self.slider else {
            return;
        };
        if let Some(widget) = cx.widget::<Slider>(slider) {
            let start = Arc::clone(&self.start);
            widget.value_event().add_listener(move |value| {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "Slider values here are small non-negative indices."
                )]
                start.store(value.round().max(0.0) as usize, Ordering::Relaxed);
            });
        }
    }
}
