// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text styles: font resolution, measurement, wrapping, and drawing.
//!
//! Measurement results are memoized per style in a [`FrameEvictCache`](crate::FrameEvictCache)
//! keyed by the measured string. The cache holds unscaled sizes; the renderer's current font
//! scale is applied on every lookup so a pushed font scale never poisons the cache.

use core::ops::Range;

use kurbo::{Point, Rect, Size};

use crate::error::Result;
use crate::frame::FrameNumber;
use crate::renderer::{FontHandle, StyleRenderer, TextString};
use crate::style::{
    FontType, FontWeight, HorizontalAlign, HorizontalTextWrapping, Style, TextStyleProps,
    VerticalAlign, VerticalTextTruncation,
};

impl TextStyleProps {
    /// Resolved font face path.
    pub fn font_name(&self) -> &str {
        self.font.as_deref().unwrap_or(Style::DEFAULT_FONT)
    }

    /// Resolved font type.
    pub fn font_type(&self) -> FontType {
        self.font_type.unwrap_or(FontType::Sprite)
    }

    /// Resolved font size.
    pub fn font_size(&self) -> u32 {
        self.font_size.unwrap_or(Style::DEFAULT_FONT_SIZE)
    }

    /// Resolved weight.
    pub fn weight(&self) -> FontWeight {
        self.weight.unwrap_or(FontWeight::Normal)
    }

    /// Resolved horizontal alignment.
    pub fn horizontal_align(&self) -> HorizontalAlign {
        self.horizontal_align.unwrap_or(HorizontalAlign::Left)
    }

    /// Resolved vertical alignment.
    pub fn vertical_align(&self) -> VerticalAlign {
        self.vertical_align.unwrap_or(VerticalAlign::Top)
    }

    /// Resolved legend font face path.
    pub fn legend_font_name(&self) -> &str {
        self.legend_font
            .as_deref()
            .unwrap_or(Style::DEFAULT_LEGEND_FONT)
    }

    /// File name handed to the renderer when caching the font.
    ///
    /// Sprite fonts are stored one file per size and weight; scalable fonts use the face path.
    pub fn font_file_name(&self) -> String {
        match self.font_type() {
            FontType::Sprite => {
                let suffix = match self.weight() {
                    FontWeight::Normal => "",
                    FontWeight::Italic => "_Italic",
                    FontWeight::Bold => "_Bold",
                };
                format!("{}_{}{}.spritefont", self.font_name(), self.font_size(), suffix)
            }
            FontType::FreeType => self.font_name().to_owned(),
        }
    }

    /// File name of the controller-legend sprite font.
    pub fn legend_font_file_name(&self) -> String {
        format!("{}.spritefont", self.legend_font_name())
    }
}

/// Split text into lines at `'\n'`. Always yields at least one (possibly empty) line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Top-left origin of a block of `text_size` aligned inside `rect`.
pub fn text_origin(
    rect: Rect,
    text_size: Size,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
) -> Point {
    let dx = rect.width() - text_size.width;
    let dy = rect.height() - text_size.height;
    let x = match horizontal {
        HorizontalAlign::Left => rect.x0,
        HorizontalAlign::Center => rect.x0 + dx * 0.5,
        HorizontalAlign::Right => rect.x0 + dx,
    };
    let y = match vertical {
        VerticalAlign::Top => rect.y0,
        VerticalAlign::Middle => rect.y0 + dy * 0.5,
        VerticalAlign::Bottom => rect.y0 + dy,
    };
    Point::new(x, y)
}

/// Vertical offset of the first line of a multi-line block relative to single-line placement.
pub fn first_line_offset(line_count: usize, line_height: f64, vertical: VerticalAlign) -> f64 {
    let extra = line_count.saturating_sub(1) as f64 * line_height;
    match vertical {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Middle => -extra * 0.5,
        VerticalAlign::Bottom => -extra,
    }
}

/// Re-flow `text` so no line is wider than `width`.
///
/// With [`HorizontalTextWrapping::WrapAtSpace`], lines are broken at spaces; a single word
/// wider than `width` stays alone on its line. Explicit newlines are kept and trailing blank
/// lines are dropped. With [`HorizontalTextWrapping::Overflow`] the text is returned unchanged.
pub fn word_wrap(
    text: &str,
    width: f64,
    wrapping: HorizontalTextWrapping,
    mut measure: impl FnMut(&str) -> Result<f64>,
) -> Result<String> {
    if wrapping == HorizontalTextWrapping::Overflow {
        return Ok(text.to_owned());
    }
    let mut lines: Vec<String> = Vec::new();
    for source in text.split('\n') {
        let mut current = String::new();
        for word in source.split(' ').filter(|w| !w.is_empty()) {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate)? > width {
                lines.push(core::mem::replace(&mut current, word.to_owned()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    while lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    Ok(lines.join("\n"))
}

/// Number of whole lines of `line_height` that fit in `height`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Line counts are small non-negative integers."
)]
pub fn max_display_lines(height: f64, line_height: f64) -> usize {
    if line_height <= 0.0 || height <= 0.0 {
        return 0;
    }
    (height / line_height).floor() as usize
}

/// Range of lines to draw, starting at `first_line` (clamped so the range stays full).
pub fn visible_line_range(
    line_count: usize,
    max_lines: usize,
    first_line: usize,
    truncation: VerticalTextTruncation,
) -> Range<usize> {
    if truncation == VerticalTextTruncation::Overflow || line_count <= max_lines {
        return 0..line_count;
    }
    let start = first_line.min(line_count - max_lines);
    start..start + max_lines
}

impl Style {
    /// Cache (if needed) and return this text style's font. `None` for non-text styles.
    pub fn font_handle(&self, renderer: &mut dyn StyleRenderer) -> Option<FontHandle> {
        let props = self.text()?;
        if let Some(handle) = self.font.get()
            && renderer.is_valid_font(handle)
        {
            return Some(handle);
        }
        let handle = renderer.cache_font(props.font_type(), &props.font_file_name(), props.font_size());
        self.font.set(Some(handle));
        Some(handle)
    }

    /// Cache and return the legend font. Legend fonts are always sprite fonts.
    pub fn legend_font_handle(&self, renderer: &mut dyn StyleRenderer) -> Option<FontHandle> {
        let props = self.text()?;
        Some(renderer.cache_font(
            FontType::Sprite,
            &props.legend_font_file_name(),
            props.font_size(),
        ))
    }

    /// Line height of this style's font. Zero for non-text styles.
    pub fn line_height(&self, renderer: &mut dyn StyleRenderer, scaled: bool) -> Result<f64> {
        match self.font_handle(renderer) {
            Some(handle) => renderer.font_line_height(handle, scaled),
            None => Ok(0.0),
        }
    }

    /// Measure one line of text, scaled by the current font scale.
    pub fn measure_text(
        &self,
        renderer: &mut dyn StyleRenderer,
        text: &str,
        frame: FrameNumber,
    ) -> Result<Size> {
        let unscaled = self.measure_text_unscaled(renderer, text, frame)?;
        let scale = f64::from(renderer.current_font_scale());
        Ok(Size::new(unscaled.width * scale, unscaled.height * scale))
    }

    /// Measure one line of text ignoring the font scale stack.
    pub fn measure_text_unscaled(
        &self,
        renderer: &mut dyn StyleRenderer,
        text: &str,
        frame: FrameNumber,
    ) -> Result<Size> {
        let Some(handle) = self.font_handle(renderer) else {
            return Ok(Size::ZERO);
        };
        let key = text.to_owned();
        if let Some(size) = self.measurements.borrow_mut().find(&key, frame) {
            return Ok(*size);
        }
        let size = renderer.measure_text(handle, text, false)?;
        self.measurements.borrow_mut().add(key, size, frame);
        Ok(size)
    }

    /// Draw `text` inside `rect` (pixels) with this style's font and alignment.
    ///
    /// The rectangle is shrunk by the style padding first. Wrapping and truncation are applied
    /// against the padded rectangle. Non-text styles draw nothing.
    pub fn render_text(
        &self,
        renderer: &mut dyn StyleRenderer,
        rect: Rect,
        text: &str,
        wrapping: HorizontalTextWrapping,
        truncation: VerticalTextTruncation,
        frame: FrameNumber,
    ) -> Result<()> {
        let Some(handle) = self.font_handle(renderer) else {
            return Ok(());
        };
        self.render_text_with(renderer, handle, true, rect, text, wrapping, truncation, frame)
    }

    /// Like [`render_text`](Self::render_text) but drawing with the legend font.
    pub fn render_legend_text(
        &self,
        renderer: &mut dyn StyleRenderer,
        rect: Rect,
        text: &str,
        frame: FrameNumber,
    ) -> Result<()> {
        let Some(handle) = self.legend_font_handle(renderer) else {
            return Ok(());
        };
        self.render_text_with(
            renderer,
            handle,
            false,
            rect,
            text,
            HorizontalTextWrapping::Overflow,
            VerticalTextTruncation::Overflow,
            frame,
        )
    }

    fn render_text_with(
        &self,
        renderer: &mut dyn StyleRenderer,
        handle: FontHandle,
        memoize: bool,
        rect: Rect,
        text: &str,
        wrapping: HorizontalTextWrapping,
        truncation: VerticalTextTruncation,
        frame: FrameNumber,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let Some(props) = self.text() else {
            return Ok(());
        };
        let (horizontal, vertical) = (props.horizontal_align(), props.vertical_align());
        let area = self.subtract_padding_from_rect(rect);
        let line_height = renderer.font_line_height(handle, true)?;

        let wrapped = word_wrap(text, area.width(), wrapping, |candidate| {
            let size = renderer.measure_text(handle, candidate, true)?;
            Ok(size.width)
        })?;
        let lines = split_lines(&wrapped);
        let range = visible_line_range(
            lines.len(),
            max_display_lines(area.height(), line_height),
            0,
            truncation,
        );
        let lines = &lines[range];

        let start = first_line_offset(lines.len(), line_height, vertical);
        let color = renderer.current_color();
        let mut strings = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let size = if memoize {
                self.measure_text(renderer, line, frame)?
            } else {
                renderer.measure_text(handle, line, true)?
            };
            let mut position = text_origin(area, size, horizontal, vertical);
            position.y += start + i as f64 * line_height;
            strings.push(TextString {
                text: (*line).to_owned(),
                position,
                color,
            });
        }
        renderer.draw_text(handle, &strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessRenderer, RenderCommand};
    use crate::style::StyleKind;

    fn text_style(size: u32) -> Style {
        Style::new(
            "text",
            StyleKind::Text(TextStyleProps {
                font_size: Some(size),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn font_file_names() {
        let mut props = TextStyleProps::default();
        assert_eq!(props.font_file_name(), "Assets/Fonts/SegoeUI_18.spritefont");
        props.weight = Some(FontWeight::Bold);
        props.font_size = Some(24);
        assert_eq!(props.font_file_name(), "Assets/Fonts/SegoeUI_24_Bold.spritefont");
        props.font_type = Some(FontType::FreeType);
        assert_eq!(props.font_file_name(), "Assets/Fonts/SegoeUI");
        assert_eq!(
            props.legend_font_file_name(),
            "Assets/Fonts/XboxOneControllerLegendSmall.spritefont"
        );
    }

    #[test]
    fn origin_alignment() {
        let rect = Rect::new(0.0, 0.0, 100.0, 40.0);
        let size = Size::new(20.0, 10.0);
        assert_eq!(
            text_origin(rect, size, HorizontalAlign::Left, VerticalAlign::Top),
            Point::new(0.0, 0.0)
        );
        assert_eq!(
            text_origin(rect, size, HorizontalAlign::Center, VerticalAlign::Middle),
            Point::new(40.0, 15.0)
        );
        assert_eq!(
            text_origin(rect, size, HorizontalAlign::Right, VerticalAlign::Bottom),
            Point::new(80.0, 30.0)
        );
        assert_eq!(first_line_offset(3, 10.0, VerticalAlign::Bottom), -20.0);
        assert_eq!(first_line_offset(3, 10.0, VerticalAlign::Middle), -10.0);
    }

    #[test]
    fn wrap_at_space_breaks_lines() {
        // One unit per character.
        let measure = |s: &str| Ok(s.chars().count() as f64);
        let wrapped = word_wrap(
            "the quick brown fox",
            10.0,
            HorizontalTextWrapping::WrapAtSpace,
            measure,
        )
        .unwrap();
        assert_eq!(wrapped, "the quick\nbrown fox");

        let kept = word_wrap("a\n\nb\n\n", 10.0, HorizontalTextWrapping::WrapAtSpace, measure)
            .unwrap();
        assert_eq!(kept, "a\n\nb");

        let long = word_wrap("supercalifragilistic x", 5.0, HorizontalTextWrapping::WrapAtSpace, measure)
            .unwrap();
        assert_eq!(long, "supercalifragilistic\nx");

        let overflow =
            word_wrap("a b c", 1.0, HorizontalTextWrapping::Overflow, measure).unwrap();
        assert_eq!(overflow, "a b c");
    }

    #[test]
    fn truncation_ranges() {
        assert_eq!(max_display_lines(55.0, 18.0), 3);
        assert_eq!(max_display_lines(10.0, 0.0), 0);
        assert_eq!(visible_line_range(5, 3, 0, VerticalTextTruncation::Truncate), 0..3);
        assert_eq!(visible_line_range(5, 3, 4, VerticalTextTruncation::Truncate), 2..5);
        assert_eq!(visible_line_range(5, 3, 0, VerticalTextTruncation::Overflow), 0..5);
        assert_eq!(visible_line_range(2, 3, 1, VerticalTextTruncation::Truncate), 0..2);
    }

    #[test]
    fn measurement_is_cached_unscaled() {
        let mut r = HeadlessRenderer::new();
        let style = text_style(20);
        let a = style.measure_text(&mut r, "abcd", 1).unwrap();
        assert_eq!(a, Size::new(40.0, 20.0));
        assert_eq!(style.measurements.borrow().len(), 1);

        let i = r.push_font_scale(2.0);
        let b = style.measure_text(&mut r, "abcd", 1).unwrap();
        r.pop_font_scale(i);
        assert_eq!(b, Size::new(80.0, 40.0));
        assert_eq!(style.measurements.borrow().len(), 1, "scale does not add entries");
    }

    #[test]
    fn font_handle_is_cached_once() {
        let mut r = HeadlessRenderer::new();
        let style = text_style(18);
        let a = style.font_handle(&mut r);
        let b = style.font_handle(&mut r);
        assert!(a.is_some());
        assert_eq!(a, b);
        assert_eq!(Style::new("basic", StyleKind::Basic).font_handle(&mut r), None);
    }

    #[test]
    fn render_multi_line_text() {
        let mut r = HeadlessRenderer::new();
        let mut style = text_style(10);
        if let StyleKind::Text(props) = &mut style.kind {
            props.horizontal_align = Some(HorizontalAlign::Right);
        }
        style
            .render_text(
                &mut r,
                Rect::new(0.0, 0.0, 100.0, 100.0),
                "ab\ncdef",
                HorizontalTextWrapping::Overflow,
                VerticalTextTruncation::Overflow,
                1,
            )
            .unwrap();
        let Some(RenderCommand::DrawText { strings, .. }) = r.commands().last() else {
            panic!("expected a text draw, got {:?}", r.commands());
        };
        assert_eq!(strings.len(), 2);
        assert_eq!(strings[0].position, Point::new(90.0, 0.0));
        assert_eq!(strings[1].position, Point::new(80.0, 10.0));
    }

    #[test]
    fn render_truncates_to_height() {
        let mut r = HeadlessRenderer::new();
        let style = text_style(10);
        style
            .render_text(
                &mut r,
                Rect::new(0.0, 0.0, 100.0, 25.0),
                "a\nb\nc\nd",
                HorizontalTextWrapping::Overflow,
                VerticalTextTruncation::Truncate,
                1,
            )
            .unwrap();
        let Some(RenderCommand::DrawText { strings, .. }) = r.commands().last() else {
            panic!("expected a text draw");
        };
        let texts: Vec<_> = strings.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["a", "b"]);
    }
}
