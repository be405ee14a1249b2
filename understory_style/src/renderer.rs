// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The style-rendering contract.
//!
//! ## Overview
//!
//! [`StyleRenderer`] is the narrow seam between the element tree and a drawing backend.
//! Styles and widgets only talk to this trait; they never see GPU, image, or font APIs.
//!
//! ## Stack discipline
//!
//! Scissor rectangles, tint colors, and font scales are kept on LIFO stacks.
//! Every `push_*` returns the depth index of the new entry and the matching `pop_*`
//! must be handed that same index. Passing any other index is a programming error;
//! implementations assert on it in debug builds and truncate the stack to the index in release.
//!
//! ## Handles
//!
//! Textures and fonts are cached by the backend and referred to by small handles.
//! Caching the same texture path (or the same font type, path and size) again returns the
//! same handle. Font queries with an invalid handle return [`StyleError::InvalidFontHandle`];
//! drawing with an invalid texture handle does nothing.
//!
//! [`StyleError::InvalidFontHandle`]: crate::StyleError::InvalidFontHandle

use kurbo::{Point, Rect, Size};

use crate::error::Result;
use crate::style::FontType;
use crate::types::Color;

/// Handle of a font cached by a [`StyleRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// Handle of a texture cached by a [`StyleRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// A run of text positioned in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextString {
    /// The text to draw (a single line).
    pub text: String,
    /// Top-left position in pixels.
    pub position: Point,
    /// Color to draw with.
    pub color: Color,
}

/// A textured quad: a destination rectangle in pixels and a source rectangle in texels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexturedQuad {
    /// Destination in pixels.
    pub dest: Rect,
    /// Source region of the texture in texels.
    pub source: Rect,
}

/// Drawing backend used by styles and widgets.
pub trait StyleRenderer {
    /// Begin a frame of rendering.
    fn setup_render(&mut self);
    /// End a frame of rendering and flush pending work.
    fn finalize_render(&mut self);

    /// Inform the backend of the window size in pixels.
    fn set_window_size(&mut self, width: u32, height: u32);
    /// The full window rectangle in pixels.
    fn window_rect(&self) -> Rect;
    /// Drop cached resources.
    fn clear_caches(&mut self) {}

    /// Push a scissor rectangle (pixels). Returns its stack index.
    fn push_scissor_rect(&mut self, rect: Rect) -> usize;
    /// Push the intersection of `rect` with the current scissor rectangle. Returns its stack index.
    fn intersect_scissor_rect(&mut self, rect: Rect) -> usize;
    /// Pop the scissor rectangle pushed at `index`.
    fn pop_scissor_rect(&mut self, index: usize);

    /// Push a tint color. Returns its stack index.
    fn push_tint_color(&mut self, color: Color) -> usize;
    /// Pop the tint color pushed at `index`.
    fn pop_tint_color(&mut self, index: usize);
    /// The active tint color, or opaque white when none is pushed.
    fn current_color(&self) -> Color;

    /// Push a font scale. Active scales compose multiplicatively. Returns its stack index.
    fn push_font_scale(&mut self, scale: f32) -> usize;
    /// Pop the font scale pushed at `index`.
    fn pop_font_scale(&mut self, index: usize);
    /// Product of all active font scales (`1.0` when none is pushed).
    fn current_font_scale(&self) -> f32;

    /// Cache a texture by file path. Repeated calls with the same path return the same handle.
    fn cache_texture(&mut self, path: &str) -> TextureHandle;
    /// Cache a texture from encoded image bytes.
    fn cache_texture_from_data(&mut self, data: &[u8]) -> TextureHandle;
    /// Returns true if `handle` refers to a cached texture.
    fn is_valid_texture(&self, handle: TextureHandle) -> bool;
    /// Size of a cached texture in texels.
    fn texture_size(&self, handle: TextureHandle) -> Option<Size>;
    /// Draw textured quads tinted with the current color. Invalid handles draw nothing.
    fn draw_textured_quads(&mut self, handle: TextureHandle, quads: &[TexturedQuad]);

    /// Cache a font keyed by type, path and size.
    fn cache_font(&mut self, font_type: FontType, path: &str, size: u32) -> FontHandle;
    /// Returns true if `handle` refers to a cached font.
    fn is_valid_font(&self, handle: FontHandle) -> bool;
    /// Line height of a font, optionally scaled by the current font scale.
    fn font_line_height(&self, handle: FontHandle, scaled: bool) -> Result<f64>;
    /// Measure a single line of text, optionally scaled by the current font scale.
    fn measure_text(&self, handle: FontHandle, text: &str, scaled: bool) -> Result<Size>;
    /// Draw text runs.
    fn draw_text(&mut self, handle: FontHandle, strings: &[TextString]) -> Result<()>;

    /// Draw debug grid lines over `size` starting at `origin`, spaced by `cell`.
    fn render_grid(&mut self, origin: Point, size: Size, cell: Size);
}
