// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kurbo::{Rect, Vec2};
use understory_element_tree::ElementId;
use understory_style::{HorizontalTextWrapping, Id, VerticalTextTruncation};

use super::{RenderCx, Slider, WidgetBehavior, WidgetCx};
use crate::data::DataObject;
use crate::error::Result;

/// A scrolling log of text lines, newest at the bottom of a viewport panel.
///
/// Lines are kept newest first. A vertical slider sub-element with a range of
/// `-(lines - 1)..=0` scrolls back through older lines.
#[derive(Debug)]
pub struct ConsoleWindow {
    max_lines: usize,
    slider_id: Id,
    viewport_id: Id,
    slider: Option<ElementId>,
    viewport: Option<ElementId>,
    lines: Vec<String>,
    // Shared with the slider's value listener, which must be `Send`.
    offset: Arc<AtomicUsize>,
}

impl Default for ConsoleWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LINES)
    }
}

impl ConsoleWindow {
    /// Line capacity used for slider ranges when the data gives none.
    pub const DEFAULT_MAX_LINES: usize = 100;

    /// An empty console.
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines,
            slider_id: Id::default(),
            viewport_id: Id::default(),
            slider: None,
            viewport: None,
            lines: Vec::new(),
            offset: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the slider and viewport sub-element ids (builder style).
    pub fn with_sub_elements(mut self, slider: impl Into<Id>, viewport: impl Into<Id>) -> Self {
        self.slider_id = slider.into();
        self.viewport_id = viewport.into();
        self
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        let max_lines = data
            .u32("maxConsoleLines")?
            .map_or(Self::DEFAULT_MAX_LINES, |n| n as usize);
        Ok(Self::new(max_lines).with_sub_elements(
            data.str("verticalSliderSubElementId")?.unwrap_or_default(),
            data.str("viewportPanelSubElementId")?.unwrap_or_default(),
        ))
    }

    /// Stored lines, newest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line capacity used for the slider range.
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Number of newest lines scrolled past.
    pub fn display_offset(&self) -> usize {
        self.offset.load(Ordering::Relaxed)
    }

    /// Add a line at the front.
    ///
    /// While fewer than `maxConsoleLines` lines are stored (counted before the insert), the
    /// slider range grows to cover the lines already present and the slider is shown. Lines
    /// are never evicted, so the log grows until [`clear_all_lines`](Self::clear_all_lines)
    /// is called.
    pub fn append_line_of_text(&mut self, cx: &mut WidgetCx<'_>, line: impl Into<String>) {
        let len = self.lines.len();
        if len < self.max_lines
            && let Some(slider) = self.slider
            && let Some((widget, tree)) = cx.widget_and_tree::<Slider>(slider)
        {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_precision_loss,
                reason = "Line counts are small."
            )]
            let (min, steps) = (-(len as f32), len as u32);
            widget.modify_slider_range(tree, min, 0.0, steps);
            tree.set_visible(slider, true);
        }
        self.lines.insert(0, line.into());
    }

    /// Remove every line and reset the slider.
    pub fn clear_all_lines(&mut self, cx: &mut WidgetCx<'_>) {
        self.lines.clear();
        self.offset.store(0, Ordering::Relaxed);
        if let Some(slider) = self.slider {
            if let Some((widget, tree)) = cx.widget_and_tree::<Slider>(slider) {
                widget.modify_slider_range(tree, -1.0, 0.0, 1);
            }
            cx.tree.set_visible(slider, false);
        }
    }

    /// Rectangles of the lines drawn from the bottom of `area` upward, starting at the
    /// display offset. Stops at the first line that would fall entirely above `area`.
    fn line_rects(&self, area: Rect, line_height: f64) -> Vec<(usize, Rect)> {
        let mut rects = Vec::new();
        if line_height <= 0.0 {
            return rects;
        }
        for (row, index) in (self.display_offset()..self.lines.len()).enumerate() {
            #[allow(clippy::cast_precision_loss, reason = "Line counts are small.")]
            let row = row as f64;
            let bottom = area.y1 - row * line_height;
            if bottom <= area.y0 {
                break;
            }
            rects.push((index, Rect::new(area.x0, bottom - line_height, area.x1, bottom)));
        }
        rects
    }
}

impl WidgetBehavior for ConsoleWindow {
    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        let (Some(viewport), Some(style)) = (self.viewport, cx.style()) else {
            return Ok(());
        };
        let frame = cx.frame();
        let scissor = cx
            .renderer
            .intersect_scissor_rect(cx.tree.screen_rect_px(viewport));
        let area = cx.tree.padded_rect_px(viewport);
        let result = style.line_height(cx.renderer, true).and_then(|line_height| {
            self.line_rects(area, line_height.trunc())
                .into_iter()
                .try_for_each(|(index, rect)| {
                    style.render_text(
                        cx.renderer,
                        rect,
                        &self.lines[index],
                        HorizontalTextWrapping::Overflow,
                        VerticalTextTruncation::Overflow,
                        frame,
                    )
                })
        });
        cx.renderer.pop_scissor_rect(scissor);
        result
    }

    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        self.slider = cx.sub_element(&self.slider_id);
        self.viewport = cx.sub_element(&self.viewport_id);
        let Some(slider) = self.slider else {
            return;
        };
        if let Some((widget, tree)) = cx.widget_and_tree::<Slider>(slider) {
            let offset = Arc::clone(&self.offset);
            widget.value_event().add_listener(move |value| {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "Slider values here are small non-positive line offsets."
                )]
                offset.store((-value).round().max(0.0) as usize, Ordering::Relaxed);
            });
            widget.modify_slider_range(tree, -1.0, 0.0, 1);
        }
        cx.tree.set_visible(slider, false);
        if let Some(viewport) = self.viewport {
            let viewport_size = cx.tree.size_ref(viewport);
            let viewport_y = cx
                .tree
                .properties(viewport)
                .map_or(0.0, |p| p.relative_position.y);
            cx.tree.set_height(slider, viewport_size.height);
            let slider_width = cx.tree.size_ref(slider).width;
            cx.tree.set_relative_position(
                slider,
                Vec2::new(viewport_size.width - slider_width, viewport_y),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Widget, WidgetMap};
    use kurbo::Size;
    use understory_element_tree::{ElementProperties, ElementTree};
    use understory_style::StyleSheet;

    #[test]
    fn lines_are_inserted_newest_first_without_eviction() {
        let mut tree = ElementTree::new();
        let element = tree.insert(
            Id::new("console"),
            Id::new("consolewindow"),
            ElementProperties::default(),
            false,
        );
        let mut widgets = WidgetMap::new();
        let styles = StyleSheet::new();
        let mut cx = WidgetCx::new(element, &mut tree, &mut widgets, &styles);
        let mut console = ConsoleWindow::new(2);
        for line in ["a", "b", "c"] {
            console.append_line_of_text(&mut cx, line);
        }
        assert_eq!(console.lines(), ["c", "b", "a"]);
        console.clear_all_lines(&mut cx);
        assert!(console.lines().is_empty());
    }

    #[test]
    fn slider_range_tracks_lines_below_capacity() {
        let mut tree = ElementTree::new();
        let element = tree.insert(
            Id::new("console"),
            Id::new("consolewindow"),
            ElementProperties::default(),
            false,
        );
        let viewport = tree.insert(
            Id::new("view"),
            Id::new("panel"),
            ElementProperties::default().with_size(Size::new(200.0, 80.0)),
            false,
        );
        let slider = tree.insert(
            Id::new("scroll"),
            Id::new("slider"),
            ElementProperties::default().with_size(Size::new(10.0, 10.0)),
            false,
        );
        tree.attach_to(viewport, element, true);
        tree.attach_to(slider, element, true);
        let mut widgets = WidgetMap::new();
        widgets.insert(slider, Widget::from(Slider::default()));
        let styles = StyleSheet::new();
        let mut cx = WidgetCx::new(element, &mut tree, &mut widgets, &styles);
        let mut console = ConsoleWindow::new(2).with_sub_elements("scroll", "view");
        console.post_load(&mut cx);
        assert!(!cx.tree.is_visible(slider));
        assert_eq!(cx.tree.size_ref(slider), Size::new(10.0, 80.0));
        assert_eq!(
            cx.tree.properties(slider).unwrap().relative_position,
            Vec2::new(190.0, 0.0)
        );

        for line in ["a", "b", "c"] {
            console.append_line_of_text(&mut cx, line);
        }
        assert!(cx.tree.is_visible(slider));
        let (widget, tree) = cx.widget_and_tree::<Slider>(slider).unwrap();
        // The third line arrived at capacity, so the range still covers one older line.
        assert_eq!(widget.range(), (-1.0, 0.0));
        widget.set_slider_value(tree, -1.0);
        assert_eq!(console.display_offset(), 1);

        console.clear_all_lines(&mut cx);
        assert_eq!(console.display_offset(), 0);
        assert!(!cx.tree.is_visible(slider));
    }

    #[test]
    fn lines_fill_upward_from_the_bottom() {
        let mut console = ConsoleWindow::new(10);
        console.lines = vec!["3".into(), "2".into(), "1".into()];
        let rects = console.line_rects(Rect::new(0.0, 0.0, 100.0, 25.0), 10.0);
        assert_eq!(
            rects,
            [
                (0, Rect::new(0.0, 15.0, 100.0, 25.0)),
                (1, Rect::new(0.0, 5.0, 100.0, 15.0)),
                (2, Rect::new(0.0, -5.0, 100.0, 5.0)),
            ]
        );
        console.offset.store(2, Ordering::Relaxed);
        let rects = console.line_rects(Rect::new(0.0, 0.0, 100.0, 25.0), 10.0);
        assert_eq!(rects, [(2, Rect::new(0.0, 15.0, 100.0, 25.0))]);
    }
}
