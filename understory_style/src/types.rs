// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small value types shared by styles and renderers: colors and edge thicknesses.

use kurbo::Rect;

/// A linear RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white, the neutral tint.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);

    /// Create a color from float components (not clamped).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 0-255 RGB components and a 0-1 alpha, clamping every component.
    pub fn from_rgb8_alpha(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(r / 255.0, g / 255.0, b / 255.0, a).clamped()
    }

    /// Clamp every component into `0.0..=1.0`.
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let r = channel(0)?;
        let g = channel(2)?;
        let b = channel(4)?;
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        ))
    }

    /// Component-wise multiplication, used to combine tints.
    pub fn modulate(self, other: Self) -> Self {
        Self::new(
            self.r * other.r,
            self.g * other.g,
            self.b * other.b,
            self.a * other.a,
        )
    }
}

/// Per-edge thickness in reference units, used for margins and padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Edges {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge.
    pub right: i32,
    /// Bottom edge.
    pub bottom: i32,
}

impl Edges {
    /// No thickness on any edge.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create edges from left, top, right, bottom.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same thickness on all four edges.
    pub const fn uniform(v: i32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Grow `rect` outward by these edges.
    pub fn outset(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x0 - f64::from(self.left),
            rect.y0 - f64::from(self.top),
            rect.x1 + f64::from(self.right),
            rect.y1 + f64::from(self.bottom),
        )
    }

    /// Shrink `rect` inward by these edges.
    pub fn inset(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x0 + f64::from(self.left),
            rect.y0 + f64::from(self.top),
            rect.x1 - f64::from(self.right),
            rect.y1 - f64::from(self.bottom),
        )
    }

    /// Scale every edge, rounding toward zero.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Edge thickness is integral in reference units and pixels."
    )]
    pub fn scaled(&self, scale: f64) -> Self {
        Self::new(
            (f64::from(self.left) * scale) as i32,
            (f64::from(self.top) * scale) as i32,
            (f64::from(self.right) * scale) as i32,
            (f64::from(self.bottom) * scale) as i32,
        )
    }
}
