// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Vec2};

use super::{RenderCx, WidgetBehavior};
use crate::data::DataObject;
use crate::error::Result;

/// A bar filled from the left by a fraction of its width.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressBar {
    progress: f32,
}

impl ProgressBar {
    /// An empty bar.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_data(data: &DataObject<'_>) -> Result<Self> {
        let mut bar = Self::new();
        bar.set_progress(data.f32("progressPercentage")?.unwrap_or(0.0));
        Ok(bar)
    }

    /// Fill fraction in `0..=1`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Set the fill fraction, clamped to `0..=1`.
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    /// The filled part of `rect`.
    pub fn fill_rect(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x0,
            rect.y0,
            rect.x0 + rect.width() * f64::from(self.progress),
            rect.y1,
        )
    }
}

impl WidgetBehavior for ProgressBar {
    fn render(&mut self, cx: &mut RenderCx<'_>) -> understory_style::Result<()> {
        if self.progress <= 0.0 {
            return Ok(());
        }
        if let Some(style) = cx.style() {
            let rect = self.fill_rect(cx.screen_rect_px());
            style.render_cropped_sprite(
                cx.renderer,
                rect,
                Vec2::new(f64::from(self.progress), 1.0),
            );
        }
        Ok(())
    }
}
