// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_style::TextureHandle;

use super::{RenderCx, WidgetBehavior};
use crate::data::DataObject;
use crate::error::Result;

/// A sprite whose texture can be swapped at runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    texture_override: Option<TextureHandle>,
}

impl Image {
    /// An image drawing its style's texture.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_data(_data: &DataObject<'_>) -> Result<Self> {
        Ok(Self::new())
    }

    /// Draw `texture` instead of the style's texture, or go back to the style with `None`.
    pub fn set_texture_override(&mut self, texture: Option<TextureHandle>) {
        self.texture_override = texture;
    }

    /// The texture drawn instead of the style's, if any.
    pub fn texture_override(&self) -> Option<TextureHandle> {
        self.texture_override
    }
}

impl WidgetBehavior for Image {
    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        if let Some(style) = cx.style() {
            let rect = cx.screen_rect_px();
            let scale = cx.scale();
            style.render_sprite(cx.renderer, rect, scale, self.texture_override);
        }
        Ok(())
    }
}
