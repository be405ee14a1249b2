// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless [`StyleRenderer`] with fixed text metrics and a command log.
//!
//! ## Usage
//!
//! Useful for tools, layout checks, and tests: it keeps the same stacks and caches a real
//! backend keeps, measures text with simple per-glyph metrics, and appends every draw and
//! state change to a [`RenderCommand`] log instead of touching a GPU.
//!
//! ```
//! use understory_style::{Color, HeadlessRenderer, StyleRenderer};
//!
//! let mut r = HeadlessRenderer::new();
//! let i = r.push_tint_color(Color::RED);
//! assert_eq!(r.current_color(), Color::RED);
//! r.pop_tint_color(i);
//! assert_eq!(r.current_color(), Color::WHITE);
//! ```

use std::collections::HashMap;

use kurbo::{Point, Rect, Size};

use crate::error::{Result, StyleError};
use crate::renderer::{FontHandle, StyleRenderer, TextString, TextureHandle, TexturedQuad};
use crate::style::FontType;
use crate::types::Color;

/// One recorded renderer call.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// `setup_render` was called.
    Setup,
    /// `finalize_render` was called.
    Finalize,
    /// A scissor rectangle was pushed (after intersection, if any) at the given index.
    PushScissor(Rect, usize),
    /// The scissor rectangle at the given index was popped.
    PopScissor(usize),
    /// A tint color was pushed at the given index.
    PushTint(Color, usize),
    /// The tint color at the given index was popped.
    PopTint(usize),
    /// A font scale was pushed at the given index.
    PushFontScale(f32, usize),
    /// The font scale at the given index was popped.
    PopFontScale(usize),
    /// Textured quads were drawn with the given tint.
    DrawQuads {
        /// Texture used.
        texture: TextureHandle,
        /// Quads drawn.
        quads: Vec<TexturedQuad>,
        /// Active tint.
        tint: Color,
    },
    /// Text was drawn.
    DrawText {
        /// Font used.
        font: FontHandle,
        /// Text runs drawn.
        strings: Vec<TextString>,
    },
    /// Debug grid lines were drawn.
    Grid {
        /// Grid origin.
        origin: Point,
        /// Grid extent.
        size: Size,
        /// Cell size.
        cell: Size,
    },
}

#[derive(Clone, Debug)]
struct FontEntry {
    size: u32,
}

/// In-memory renderer. See the [module docs](self).
#[derive(Clone, Debug)]
pub struct HeadlessRenderer {
    window: Size,
    scissors: Vec<Rect>,
    tints: Vec<Color>,
    font_scales: Vec<f32>,
    textures: Vec<Size>,
    texture_paths: HashMap<String, TextureHandle>,
    fonts: Vec<FontEntry>,
    font_keys: HashMap<(FontType, String, u32), FontHandle>,
    default_texture_size: Size,
    commands: Vec<RenderCommand>,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRenderer {
    /// Horizontal advance of one glyph, as a fraction of the font size.
    pub const GLYPH_ADVANCE: f64 = 0.5;

    /// Create a renderer for a 1920x1080 window with 64x64 textures.
    pub fn new() -> Self {
        Self {
            window: Size::new(1920.0, 1080.0),
            scissors: Vec::new(),
            tints: Vec::new(),
            font_scales: Vec::new(),
            textures: Vec::new(),
            texture_paths: HashMap::new(),
            fonts: Vec::new(),
            font_keys: HashMap::new(),
            default_texture_size: Size::new(64.0, 64.0),
            commands: Vec::new(),
        }
    }

    /// Size reported for every texture cached from now on.
    pub fn set_default_texture_size(&mut self, size: Size) {
        self.default_texture_size = size;
    }

    /// Recorded commands since construction or the last [`take_commands`](Self::take_commands).
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        core::mem::take(&mut self.commands)
    }

    /// The active scissor rectangle, if any.
    pub fn current_scissor(&self) -> Option<Rect> {
        self.scissors.last().copied()
    }

    /// Current depth of the tint stack.
    pub fn tint_depth(&self) -> usize {
        self.tints.len()
    }

    /// Current depth of the scissor stack.
    pub fn scissor_depth(&self) -> usize {
        self.scissors.len()
    }

    fn font(&self, handle: FontHandle) -> Result<&FontEntry> {
        self.fonts
            .get(handle.0 as usize)
            .ok_or(StyleError::InvalidFontHandle(handle))
    }

    fn push_texture(&mut self) -> TextureHandle {
        self.textures.push(self.default_texture_size);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Handles use 32-bit indices by design."
        )]
        TextureHandle((self.textures.len() - 1) as u32)
    }

    fn pop_stack<T>(stack: &mut Vec<T>, index: usize, what: &str) {
        debug_assert!(
            !stack.is_empty() && index == stack.len() - 1,
            "mismatched {what} pop index {index} for stack depth {}",
            stack.len()
        );
        stack.truncate(index);
    }
}

impl StyleRenderer for HeadlessRenderer {
    fn setup_render(&mut self) {
        self.commands.push(RenderCommand::Setup);
    }

    fn finalize_render(&mut self) {
        self.commands.push(RenderCommand::Finalize);
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window = Size::new(f64::from(width), f64::from(height));
    }

    fn window_rect(&self) -> Rect {
        self.window.to_rect()
    }

    fn clear_caches(&mut self) {
        self.textures.clear();
        self.texture_paths.clear();
        self.fonts.clear();
        self.font_keys.clear();
    }

    fn push_scissor_rect(&mut self, rect: Rect) -> usize {
        let index = self.scissors.len();
        self.scissors.push(rect);
        self.commands.push(RenderCommand::PushScissor(rect, index));
        index
    }

    fn intersect_scissor_rect(&mut self, rect: Rect) -> usize {
        let clipped = match self.scissors.last() {
            Some(top) => top.intersect(rect),
            None => rect,
        };
        self.push_scissor_rect(clipped)
    }

    fn pop_scissor_rect(&mut self, index: usize) {
        Self::pop_stack(&mut self.scissors, index, "scissor");
        self.commands.push(RenderCommand::PopScissor(index));
    }

    fn push_tint_color(&mut self, color: Color) -> usize {
        let index = self.tints.len();
        self.tints.push(color);
        self.commands.push(RenderCommand::PushTint(color, index));
        index
    }

    fn pop_tint_color(&mut self, index: usize) {
        Self::pop_stack(&mut self.tints, index, "tint");
        self.commands.push(RenderCommand::PopTint(index));
    }

    fn current_color(&self) -> Color {
        self.tints.last().copied().unwrap_or(Color::WHITE)
    }

    fn push_font_scale(&mut self, scale: f32) -> usize {
        let index = self.font_scales.len();
        self.font_scales.push(scale);
        self.commands.push(RenderCommand::PushFontScale(scale, index));
        index
    }

    fn pop_font_scale(&mut self, index: usize) {
        Self::pop_stack(&mut self.font_scales, index, "font scale");
        self.commands.push(RenderCommand::PopFontScale(index));
    }

    fn current_font_scale(&self) -> f32 {
        self.font_scales.iter().product()
    }

    fn cache_texture(&mut self, path: &str) -> TextureHandle {
        if let Some(handle) = self.texture_paths.get(path) {
            return *handle;
        }
        let handle = self.push_texture();
        self.texture_paths.insert(path.to_owned(), handle);
        handle
    }

    fn cache_texture_from_data(&mut self, _data: &[u8]) -> TextureHandle {
        self.push_texture()
    }

    fn is_valid_texture(&self, handle: TextureHandle) -> bool {
        (handle.0 as usize) < self.textures.len()
    }

    fn texture_size(&self, handle: TextureHandle) -> Option<Size> {
        self.textures.get(handle.0 as usize).copied()
    }

    fn draw_textured_quads(&mut self, handle: TextureHandle, quads: &[TexturedQuad]) {
        if !self.is_valid_texture(handle) {
            return;
        }
        self.commands.push(RenderCommand::DrawQuads {
            texture: handle,
            quads: quads.to_vec(),
            tint: self.current_color(),
        });
    }

    fn cache_font(&mut self, font_type: FontType, path: &str, size: u32) -> FontHandle {
        let key = (font_type, path.to_owned(), size);
        if let Some(handle) = self.font_keys.get(&key) {
            return *handle;
        }
        self.fonts.push(FontEntry { size });
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Handles use 32-bit indices by design."
        )]
        let handle = FontHandle((self.fonts.len() - 1) as u32);
        self.font_keys.insert(key, handle);
        handle
    }

    fn is_valid_font(&self, handle: FontHandle) -> bool {
        (handle.0 as usize) < self.fonts.len()
    }

    fn font_line_height(&self, handle: FontHandle, scaled: bool) -> Result<f64> {
        let font = self.font(handle)?;
        let scale = if scaled {
            f64::from(self.current_font_scale())
        } else {
            1.0
        };
        Ok(f64::from(font.size) * scale)
    }

    fn measure_text(&self, handle: FontHandle, text: &str, scaled: bool) -> Result<Size> {
        let line_height = self.font_line_height(handle, scaled)?;
        let glyphs = text.chars().count() as f64;
        Ok(Size::new(
            glyphs * line_height * Self::GLYPH_ADVANCE,
            line_height,
        ))
    }

    fn draw_text(&mut self, handle: FontHandle, strings: &[TextString]) -> Result<()> {
        self.font(handle)?;
        self.commands.push(RenderCommand::DrawText {
            font: handle,
            strings: strings.to_vec(),
        });
        Ok(())
    }

    fn render_grid(&mut self, origin: Point, size: Size, cell: Size) {
        self.commands.push(RenderCommand::Grid { origin, size, cell });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scissor_intersection_and_pop() {
        let mut r = HeadlessRenderer::new();
        let a = r.push_scissor_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = r.intersect_scissor_rect(Rect::new(50.0, 50.0, 200.0, 200.0));
        assert_eq!((a, b), (0, 1));
        assert_eq!(r.current_scissor(), Some(Rect::new(50.0, 50.0, 100.0, 100.0)));
        r.pop_scissor_rect(b);
        r.pop_scissor_rect(a);
        assert_eq!(r.current_scissor(), None);
    }

    #[test]
    #[should_panic(expected = "mismatched tint pop index")]
    #[cfg(debug_assertions)]
    fn mismatched_pop_asserts() {
        let mut r = HeadlessRenderer::new();
        let _a = r.push_tint_color(Color::RED);
        let _b = r.push_tint_color(Color::BLACK);
        r.pop_tint_color(0);
    }

    #[test]
    fn font_scales_compose() {
        let mut r = HeadlessRenderer::new();
        assert_eq!(r.current_font_scale(), 1.0);
        let a = r.push_font_scale(2.0);
        let b = r.push_font_scale(0.5);
        let c = r.push_font_scale(3.0);
        assert_eq!(r.current_font_scale(), 3.0);
        r.pop_font_scale(c);
        r.pop_font_scale(b);
        assert_eq!(r.current_font_scale(), 2.0);
        r.pop_font_scale(a);
    }

    #[test]
    fn caches_are_idempotent() {
        let mut r = HeadlessRenderer::new();
        let t1 = r.cache_texture("Assets/a.png");
        let t2 = r.cache_texture("Assets/a.png");
        let t3 = r.cache_texture("Assets/b.png");
        assert_eq!(t1, t2);
        assert_ne!(t1, t3);

        let f1 = r.cache_font(FontType::Sprite, "SegoeUI_18.spritefont", 18);
        let f2 = r.cache_font(FontType::Sprite, "SegoeUI_18.spritefont", 18);
        let f3 = r.cache_font(FontType::FreeType, "SegoeUI_18.spritefont", 18);
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
    }

    #[test]
    fn invalid_handles() {
        let mut r = HeadlessRenderer::new();
        assert_eq!(
            r.measure_text(FontHandle(9), "x", false),
            Err(StyleError::InvalidFontHandle(FontHandle(9)))
        );
        r.draw_textured_quads(TextureHandle(3), &[]);
        assert!(r.commands().is_empty(), "invalid texture draws are ignored");
    }

    #[test]
    fn measurement_uses_fixed_metrics() {
        let mut r = HeadlessRenderer::new();
        let f = r.cache_font(FontType::Sprite, "f", 20);
        assert_eq!(r.measure_text(f, "abcd", false).unwrap(), Size::new(40.0, 20.0));
        let i = r.push_font_scale(2.0);
        assert_eq!(r.measure_text(f, "abcd", true).unwrap(), Size::new(80.0, 40.0));
        r.pop_font_scale(i);
    }
}
