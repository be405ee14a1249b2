// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprite styles: textures stretched over rectangles, optionally nine-sliced.

use kurbo::{Rect, Vec2};

use crate::renderer::{StyleRenderer, TextureHandle, TexturedQuad};
use crate::style::{SpriteStyleProps, SpriteType, Style};

fn clamp_uv(uv: Rect) -> Rect {
    Rect::new(
        uv.x0.clamp(0.0, 1.0),
        uv.y0.clamp(0.0, 1.0),
        uv.x1.clamp(0.0, 1.0),
        uv.y1.clamp(0.0, 1.0),
    )
}

impl SpriteStyleProps {
    /// Texture path, if any.
    pub fn texture_name(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    /// Resolved texels per reference unit.
    pub fn texels_per_ref_unit(&self) -> f64 {
        self.texels_per_ref_unit
            .filter(|t| *t > 0.0)
            .unwrap_or(Style::DEFAULT_TEXELS_PER_REF_UNIT)
    }

    /// Resolved sprite type.
    pub fn sprite_type(&self) -> SpriteType {
        self.sprite_type.unwrap_or(SpriteType::Simple)
    }

    /// Outer UV extents clamped to `0..1`.
    pub fn outer_uv(&self) -> Rect {
        clamp_uv(self.outer_uv.unwrap_or(Style::DEFAULT_UV))
    }

    /// Inner UV extents clamped to `0..1`.
    pub fn inner_uv(&self) -> Rect {
        clamp_uv(self.inner_uv.unwrap_or(Style::DEFAULT_UV))
    }
}

/// The part of `rect` selected by normalized extents `uv`.
pub fn sub_rect(rect: Rect, uv: Rect) -> Rect {
    let (w, h) = (rect.width(), rect.height());
    Rect::new(
        rect.x0 + uv.x0 * w,
        rect.y0 + uv.y0 * h,
        rect.x0 + uv.x1 * w,
        rect.y0 + uv.y1 * h,
    )
}

/// Build the quads that draw `texture` (texel rectangle) over `dest` (pixels).
///
/// `Simple` yields one quad over the outer UV region. The sliced types keep the corner pieces
/// at their texel size (converted through `texels_per_ref_unit` and the reference-to-pixel
/// `scale`) and stretch the edges; the center piece is only emitted for `NineSliced`.
pub fn slice_quads(
    dest: Rect,
    texture: Rect,
    texels_per_ref_unit: f64,
    scale: f64,
    outer: Rect,
    inner: Rect,
    sprite_type: SpriteType,
) -> Vec<TexturedQuad> {
    let source_outer = sub_rect(texture, outer);
    if sprite_type == SpriteType::Simple {
        return vec![TexturedQuad {
            dest,
            source: source_outer,
        }];
    }
    let source_inner = sub_rect(texture, inner);
    let k = scale / texels_per_ref_unit;

    let dx = [
        dest.x0,
        dest.x0 + (source_inner.x0 - source_outer.x0) * k,
        dest.x1 - (source_outer.x1 - source_inner.x1) * k,
        dest.x1,
    ];
    let dy = [
        dest.y0,
        dest.y0 + (source_inner.y0 - source_outer.y0) * k,
        dest.y1 - (source_outer.y1 - source_inner.y1) * k,
        dest.y1,
    ];
    let sx = [source_outer.x0, source_inner.x0, source_inner.x1, source_outer.x1];
    let sy = [source_outer.y0, source_inner.y0, source_inner.y1, source_outer.y1];

    let mut quads = Vec::with_capacity(9);
    for row in 0..3 {
        for col in 0..3 {
            if row == 1 && col == 1 && sprite_type != SpriteType::NineSliced {
                continue;
            }
            quads.push(TexturedQuad {
                dest: Rect::new(dx[col], dy[row], dx[col + 1], dy[row + 1]),
                source: Rect::new(sx[col], sy[row], sx[col + 1], sy[row + 1]),
            });
        }
    }
    quads
}

impl Style {
    /// Cache (if needed) and return this sprite style's texture.
    ///
    /// `None` for non-sprite styles and sprite styles without a texture.
    pub fn texture_handle(&self, renderer: &mut dyn StyleRenderer) -> Option<TextureHandle> {
        let name = self.sprite()?.texture_name()?;
        if let Some(handle) = self.texture.get()
            && renderer.is_valid_texture(handle)
        {
            return Some(handle);
        }
        let handle = renderer.cache_texture(name);
        self.texture.set(Some(handle));
        Some(handle)
    }

    /// Draw this sprite over `rect` (pixels).
    ///
    /// `override_texture` replaces the style's texture when it is valid. Drawing with no
    /// usable texture does nothing.
    pub fn render_sprite(
        &self,
        renderer: &mut dyn StyleRenderer,
        rect: Rect,
        scale: f64,
        override_texture: Option<TextureHandle>,
    ) {
        let Some(props) = self.sprite() else {
            return;
        };
        let handle = match override_texture.filter(|h| renderer.is_valid_texture(*h)) {
            Some(handle) => handle,
            None => match self.texture_handle(renderer) {
                Some(handle) => handle,
                None => return,
            },
        };
        let Some(size) = renderer.texture_size(handle) else {
            return;
        };
        let quads = slice_quads(
            rect,
            size.to_rect(),
            props.texels_per_ref_unit(),
            scale,
            props.outer_uv(),
            props.inner_uv(),
            props.sprite_type(),
        );
        renderer.draw_textured_quads(handle, &quads);
    }

    /// Draw the leading `fraction` (per axis, clamped to `0..1`) of the outer UV region
    /// stretched over `rect`. Used by fill bars.
    pub fn render_cropped_sprite(
        &self,
        renderer: &mut dyn StyleRenderer,
        rect: Rect,
        fraction: Vec2,
    ) {
        let Some(props) = self.sprite() else {
            return;
        };
        let Some(handle) = self.texture_handle(renderer) else {
            return;
        };
        let Some(size) = renderer.texture_size(handle) else {
            return;
        };
        let outer = sub_rect(size.to_rect(), props.outer_uv());
        let crop = Rect::new(0.0, 0.0, fraction.x.clamp(0.0, 1.0), fraction.y.clamp(0.0, 1.0));
        renderer.draw_textured_quads(
            handle,
            &[TexturedQuad {
                dest: rect,
                source: sub_rect(outer, crop),
            }],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessRenderer, RenderCommand};
    use crate::style::StyleKind;
    use kurbo::Size;

    fn sprite_style(sprite_type: SpriteType) -> Style {
        Style::new(
            "sprite",
            StyleKind::Sprite(SpriteStyleProps {
                texture: Some("Assets/panel.png".into()),
                sprite_type: Some(sprite_type),
                inner_uv: Some(Rect::new(0.25, 0.25, 0.75, 0.75)),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn uv_extents_are_clamped() {
        let props = SpriteStyleProps {
            outer_uv: Some(Rect::new(-1.0, 0.5, 2.0, 1.0)),
            ..Default::default()
        };
        assert_eq!(props.outer_uv(), Rect::new(0.0, 0.5, 1.0, 1.0));
        assert_eq!(props.inner_uv(), Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(props.texels_per_ref_unit(), 1.0);
    }

    #[test]
    fn nine_slice_keeps_corners() {
        let texture = Rect::new(0.0, 0.0, 64.0, 64.0);
        let dest = Rect::new(100.0, 100.0, 400.0, 200.0);
        let inner = Rect::new(0.25, 0.25, 0.75, 0.75);
        let quads = slice_quads(dest, texture, 1.0, 1.0, Style::DEFAULT_UV, inner, SpriteType::NineSliced);
        assert_eq!(quads.len(), 9);
        // Top-left corner stays 16x16.
        assert_eq!(quads[0].dest, Rect::new(100.0, 100.0, 116.0, 116.0));
        assert_eq!(quads[0].source, Rect::new(0.0, 0.0, 16.0, 16.0));
        // Center stretches.
        assert_eq!(quads[4].dest, Rect::new(116.0, 116.0, 384.0, 184.0));
        assert_eq!(quads[4].source, Rect::new(16.0, 16.0, 48.0, 48.0));

        let eight = slice_quads(dest, texture, 1.0, 1.0, Style::DEFAULT_UV, inner, SpriteType::EightSliced);
        assert_eq!(eight.len(), 8);
        assert!(!eight.iter().any(|q| q.source == Rect::new(16.0, 16.0, 48.0, 48.0)));
    }

    #[test]
    fn corners_follow_scale() {
        let quads = slice_quads(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            Rect::new(0.0, 0.0, 64.0, 64.0),
            2.0,
            0.5,
            Style::DEFAULT_UV,
            Rect::new(0.25, 0.25, 0.75, 0.75),
            SpriteType::NineSliced,
        );
        assert_eq!(quads[0].dest, Rect::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn render_sprite_draws_and_caches_texture() {
        let mut r = HeadlessRenderer::new();
        let style = sprite_style(SpriteType::Simple);
        style.render_sprite(&mut r, Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, None);
        style.render_sprite(&mut r, Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, None);
        let draws: Vec<_> = r
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawQuads { texture, quads, .. } => Some((*texture, quads.len())),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0], draws[1]);
        assert_eq!(draws[0].1, 1);
    }

    #[test]
    fn sprite_without_texture_draws_nothing() {
        let mut r = HeadlessRenderer::new();
        let style = Style::new("empty", StyleKind::Sprite(SpriteStyleProps::default()));
        style.render_sprite(&mut r, Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, None);
        assert!(r.commands().is_empty());
    }

    #[test]
    fn cropped_sprite_uses_fraction_of_source() {
        let mut r = HeadlessRenderer::new();
        r.set_default_texture_size(Size::new(100.0, 20.0));
        let style = sprite_style(SpriteType::Simple);
        style.render_cropped_sprite(&mut r, Rect::new(0.0, 0.0, 50.0, 20.0), Vec2::new(0.5, 2.0));
        let Some(RenderCommand::DrawQuads { quads, .. }) = r.commands().last() else {
            panic!("expected a quad draw");
        };
        assert_eq!(quads[0].source, Rect::new(0.0, 0.0, 50.0, 20.0));
    }
}
