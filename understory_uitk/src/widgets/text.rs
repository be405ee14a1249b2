// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use understory_element_tree::ElementId;
use understory_style::{
    HorizontalTextWrapping, Id, VerticalTextTruncation, max_display_lines, split_lines,
    visible_line_range, word_wrap,
};

use super::{RenderCx, Slider, WidgetBehavior, WidgetCx};
use crate::data::DataObject;
use crate::error::Result;

/// Line counts from the last truncated render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TextLayout {
    lines: usize,
    max_lines: usize,
}

/// A block of text.
///
/// With `vertTrunc: truncate` only the lines that fit are drawn. An optional slider
/// sub-element scrolls through the rest: it is shown and given one step per hidden line
/// whenever the wrapped text no longer fits.
#[derive(Debug)]
pub struct StaticText {
    text: String,
    wrapping: HorizontalTextWrapping,
    truncation: VerticalTextTruncation,
    is_legend: bool,
    slider_id: Id,
    slider: Option<ElementId>,
    first_line: Arc<AtomicUsize>,
    measured: Option<TextLayout>,
    applied: Option<TextLayout>,
}

impl Default for StaticText {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEXT)
    }
}

impl StaticText {
    /// Text shown when the data gives none.
    pub const DEFAULT_TEXT: &'static str = "Lorem Ipsum";

    /// Unwrapped, untruncated text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            wrapping: HorizontalTextWrapping::Overflow,
            truncation: VerticalTextTruncation::Overflow,
            is_legend: false,
            slider_id: Id::default(),
            slider: None,
            first_line: Arc::new(AtomicUsize::new(0)),
            measured: None,
            applied: None,
        }
    }

    /// Set wrapping and truncation (builder style).
    pub fn with_layout(
        mut self,
        wrapping: HorizontalTextWrapping,
        truncation: VerticalTextTruncation,
    ) -> Self {
        self.wrapping = wrapping;
        self.truncation = truncation;
        self
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        let mut text = Self::new(data.str("text")?.unwrap_or(Self::DEFAULT_TEXT));
        if let Some(wrapping) = data.named("horzWrap", HorizontalTextWrapping::from_name)? {
            text.wrapping = wrapping;
        }
        if let Some(truncation) = data.named("vertTrunc", VerticalTextTruncation::from_name)? {
            text.truncation = truncation;
        }
        text.is_legend = data.bool("isLegend")?.unwrap_or(false);
        text.slider_id = Id::new(data.str("sliderSubElementId")?.unwrap_or_default());
        Ok(text)
    }

    /// The text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.first_line.store(0, Ordering::Relaxed);
        }
    }

    /// First line drawn when truncating.
    pub fn first_line(&self) -> usize {
        self.first_line.load(Ordering::Relaxed)
    }

    /// Wrapping mode.
    pub fn wrapping(&self) -> HorizontalTextWrapping {
        self.wrapping
    }

    /// Truncation mode.
    pub fn truncation(&self) -> VerticalTextTruncation {
        self.truncation
    }

    fn apply_layout(&mut self, cx: &mut WidgetCx<'_>) {
        let Some(slider) = self.slider else {
            return;
        };
        if self.measured == self.applied {
            return;
        }
        self.applied = self.measured;
        let height = cx.tree.size_ref(cx.element).height;
        let Some((widget, tree)) = cx.widget_and_tree::<Slider>(slider) else {
            return;
        };
        match self.measured {
            Some(TextLayout { lines, max_lines }) if lines > max_lines => {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_precision_loss,
                    reason = "Line counts are small."
                )]
                let (hidden, steps) = ((lines - max_lines) as f32, (lines - max_lines) as u32 + 1);
                tree.set_height(slider, height);
                widget.modify_slider_range(tree, 0.0, hidden, steps);
                widget.set_slider_value(tree, 0.0);
                tree.set_visible(slider, true);
            }
            _ => tree.set_visible(slider, false),
        }
    }
}

impl WidgetBehavior for StaticText {
    fn update(&mut self, _dt: f32, cx: &mut WidgetCx<'_>) {
        self.apply_layout(cx);
    }

    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        let Some(style) = cx.style() else {
            return Ok(());
        };
        let rect = cx.screen_rect_px();
        let frame = cx.frame();
        if self.is_legend {
            return style.render_legend_text(cx.renderer, rect, &self.text, frame);
        }
        if self.truncation == VerticalTextTruncation::Overflow {
            self.measured = None;
            return style.render_text(
                cx.renderer,
                rect,
                &self.text,
                self.wrapping,
                self.truncation,
                frame,
            );
        }
        let Some(font) = style.font_handle(cx.renderer) else {
            return Ok(());
        };
        let area = style.subtract_padding_from_rect(rect);
        let renderer = &mut *cx.renderer;
        let wrapped = word_wrap(&self.text, area.width(), self.wrapping, |candidate| {
            Ok(renderer.measure_text(font, candidate, true)?.width)
        })?;
        let lines = split_lines(&wrapped);
        let max_lines = max_display_lines(area.height(), style.line_height(cx.renderer, true)?);
        self.measured = Some(TextLayout {
            lines: lines.len(),
            max_lines,
        });
        let range = visible_line_range(lines.len(), max_lines, self.first_line(), self.truncation);
        let visible = lines[range].join("\n");
        style.render_text(
            cx.renderer,
            rect,
            &visible,
            HorizontalTextWrapping::Overflow,
            VerticalTextTruncation::Overflow,
            frame,
        )
    }

    fn post_load(&mut self, cx: &mut WidgetCx<'_>) {
        self.slider = cx.sub_element(&self.slider_id);
        let Some(slider) = self.slider else {
            return;
        };
        if let Some(widget) = cx.widget::<Slider>(slider) {
            let first_line = Arc::clone(&self.first_line);
            widget.value_event().add_listener(move |value| {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "Slider values here are small non-negative line indices."
                )]
                first_line.store(value.round().max(0.0) as usize, Ordering::Relaxed);
            });
        }
        cx.tree.set_visible(slider, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_fields() {
        let value = json!({
            "text": "hello",
            "horzWrap": "wrapAtSpace",
            "vertTrunc": "truncate",
            "isLegend": false
        });
        let data = DataObject::new(&value, "t").unwrap();
        let text = StaticText::from_data(&data).unwrap();
        assert_eq!(text.text(), "hello");
        assert_eq!(text.wrapping(), HorizontalTextWrapping::WrapAtSpace);
        assert_eq!(text.truncation(), VerticalTextTruncation::Truncate);

        let value = json!({});
        let data = DataObject::new(&value, "t").unwrap();
        assert_eq!(StaticText::from_data(&data).unwrap().text(), "Lorem Ipsum");
    }

    #[test]
    fn changing_text_scrolls_to_top() {
        let mut text = StaticText::new("a");
        text.first_line.store(3, Ordering::Relaxed);
        text.set_text("a");
        assert_eq!(text.first_line(), 3);
        text.set_text("b");
        assert_eq!(text.first_line(), 0);
    }
}
