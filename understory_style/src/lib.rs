// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_style --heading-base-level=0

//! Understory Style: identifiers, frame caches, inheritable styles, and the rendering contract.
//!
//! This crate holds the leaf building blocks of the Understory UI toolkit.
//!
//! - [`Id`]: case-insensitive identifier used for element, style, and class ids.
//! - [`FrameClock`], [`FrameCached`], [`FrameEvictCache`]: memoization scoped to frames.
//! - [`Style`] and [`StyleSheet`]: named styles with optional properties and one-time
//!   inheritance flattening.
//! - [`StyleRenderer`]: the narrow drawing contract (scissor, tint, and font-scale stacks,
//!   texture and font caches, text and quad drawing) that styles and widgets render through.
//! - [`HeadlessRenderer`]: an in-memory renderer with fixed metrics and a command log.
//!
//! ## Styles
//!
//! Every style property is an `Option`. A set property overrides; an unset one is inherited
//! from the ancestor during flattening, or falls back to a default when read. Styles come in
//! four kinds ([`StyleKind`]): null, basic, text, and sprite.
//!
//! ```
//! use understory_style::{
//!     BaseStyleProps, Color, ColorUsage, HeadlessRenderer, Style, StyleKind, StyleRenderer,
//! };
//!
//! let style = Style::new("highlight", StyleKind::Basic).with_base(BaseStyleProps {
//!     color: Some(Color::RED),
//!     color_usage: Some(ColorUsage::Override),
//!     ..Default::default()
//! });
//!
//! let mut renderer = HeadlessRenderer::new();
//! let pushed = style.before_render(&mut renderer);
//! assert_eq!(renderer.current_color(), Color::RED);
//! let rest = style.after_render(&mut renderer, pushed);
//! style.post_render(&mut renderer, rest);
//! assert_eq!(renderer.current_color(), Color::WHITE);
//! ```
//!
//! ## Frames
//!
//! Frame numbers come from a single [`FrameClock`] that the scene advances once per update.
//! Caches compare their stored frame against the current one; frame numbers must only grow.

mod error;
mod frame;
mod headless;
mod id;
mod renderer;
mod sheet;
mod sprite;
mod style;
mod text;
mod types;

pub use error::{Result, StyleError};
pub use frame::{FrameCached, FrameClock, FrameEvictCache, FrameNumber};
pub use headless::{HeadlessRenderer, RenderCommand};
pub use id::Id;
pub use renderer::{FontHandle, StyleRenderer, TextString, TextureHandle, TexturedQuad};
pub use sheet::StyleSheet;
pub use sprite::{slice_quads, sub_rect};
pub use style::{
    BaseStyleProps, ColorUsage, FontType, FontWeight, HorizontalAlign, HorizontalTextWrapping,
    SpriteStyleProps, SpriteType, Style, StyleKind, TextStyleProps, VerticalAlign,
    VerticalTextTruncation,
};
pub use text::{
    first_line_offset, max_display_lines, split_lines, text_origin, visible_line_range, word_wrap,
};
pub use types::{Color, Edges};
