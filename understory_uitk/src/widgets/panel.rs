// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{RenderCx, WidgetBehavior, render_background};
use crate::data::DataObject;
use crate::error::Result;

/// A sprite background that can clip its descendants to its own rectangle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Panel {
    /// Clip descendants to the panel's pixel rectangle.
    pub clip_children: bool,
    scissor: Option<usize>,
}

impl Panel {
    /// A panel that does not clip.
    pub fn new() -> Self {
        Self::default()
    }

    /// A panel that clips its descendants.
    pub fn clipping() -> Self {
        Self {
            clip_children: true,
            scissor: None,
        }
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        Ok(Self {
            clip_children: data.bool("clipChildren")?.unwrap_or(false),
            scissor: None,
        })
    }
}

impl WidgetBehavior for Panel {
    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        render_background(cx);
        if self.clip_children {
            let rect = cx.screen_rect_px();
            self.scissor = Some(cx.renderer.intersect_scissor_rect(rect));
        }
        Ok(())
    }

    fn post_render(&mut self, cx: &mut RenderCx<'_>) {
        if let Some(index) = self.scissor.take() {
            cx.renderer.pop_scissor_rect(index);
        }
    }
}
