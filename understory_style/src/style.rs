// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The style model: inheritable bags of optional rendering properties.
//!
//! ## Overview
//!
//! A [`Style`] carries base properties (tint color and how it is applied, margin, padding)
//! plus kind-specific properties ([`StyleKind::Text`] or [`StyleKind::Sprite`]).
//! Every property is an `Option`: `Some` means the style sets (overrides) it, `None` means
//! it is inherited or defaulted.
//!
//! ## Inheritance
//!
//! A style may name an ancestor through [`Style::inherits_from`]. Flattening (see
//! [`StyleSheet::flatten`](crate::StyleSheet::flatten)) copies every unset property from the
//! already-flattened ancestor and then clears the reference, so after flattening a style is
//! fully self-contained. Kind-specific properties are only inherited between styles of the
//! same kind.
//!
//! ## Render bracketing
//!
//! [`Style::before_render`], [`Style::after_render`] and [`Style::post_render`] bracket an
//! element's draw according to its [`ColorUsage`]:
//!
//! - `UseExisting`: nothing is pushed.
//! - `SetExisting`: the tint is pushed before rendering and popped in `post_render`, so it also
//!   applies to every descendant drawn in between.
//! - `Override`: the tint is pushed before rendering and popped in `after_render`, so it only
//!   applies to the element's own draw.

use std::cell::{Cell, RefCell};

use kurbo::{Rect, Size};

use crate::frame::FrameEvictCache;
use crate::id::Id;
use crate::renderer::{FontHandle, StyleRenderer, TextureHandle};
use crate::types::{Color, Edges};

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Look up a value by its data name (case-insensitive).
            pub fn from_name(name: &str) -> Option<Self> {
                $( if name.eq_ignore_ascii_case($text) { return Some(Self::$variant); } )+
                None
            }

            /// The data name of this value.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }
    };
}

named_enum! {
    /// How a style's color affects the renderer's tint stack.
    ColorUsage {
        /// Draw with whatever tint is already active.
        UseExisting => "useExisting",
        /// Push the color for this element and all of its descendants.
        SetExisting => "setExisting",
        /// Push the color for this element's own draw only.
        Override => "override",
    }
}

named_enum! {
    /// Font technology used to render text.
    FontType {
        /// Pre-rasterized sprite fonts, one file per size and weight.
        Sprite => "sprite",
        /// Scalable fonts rasterized on demand.
        FreeType => "freetype",
    }
}

named_enum! {
    /// Font weight or slant.
    FontWeight {
        /// Regular weight.
        Normal => "normal",
        /// Italic slant.
        Italic => "italic",
        /// Bold weight.
        Bold => "bold",
    }
}

named_enum! {
    /// Horizontal text alignment within a rectangle.
    HorizontalAlign {
        /// Align to the left edge.
        Left => "left",
        /// Center horizontally.
        Center => "center",
        /// Align to the right edge.
        Right => "right",
    }
}

named_enum! {
    /// Vertical text alignment within a rectangle.
    VerticalAlign {
        /// Align to the top edge.
        Top => "top",
        /// Center vertically.
        Middle => "middle",
        /// Align to the bottom edge.
        Bottom => "bottom",
    }
}

named_enum! {
    /// How a sprite texture is stretched over a rectangle.
    SpriteType {
        /// Stretch the whole texture.
        Simple => "simple",
        /// Nine-slice without the center piece.
        EightSliced => "eightSliced",
        /// Nine-slice: fixed corners, stretched edges and center.
        NineSliced => "nineSliced",
    }
}

named_enum! {
    /// Horizontal wrapping applied to text that does not fit its rectangle.
    HorizontalTextWrapping {
        /// Let long lines run past the rectangle.
        Overflow => "overflow",
        /// Break lines at spaces so they fit the rectangle width.
        WrapAtSpace => "wrapAtSpace",
    }
}

named_enum! {
    /// Vertical truncation applied to text taller than its rectangle.
    VerticalTextTruncation {
        /// Draw every line.
        Overflow => "overflow",
        /// Draw only the lines that fit the rectangle height.
        Truncate => "truncate",
    }
}

/// Properties shared by every style kind.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BaseStyleProps {
    /// Tint color.
    pub color: Option<Color>,
    /// How [`color`](Self::color) is applied.
    pub color_usage: Option<ColorUsage>,
    /// Space outside the element rectangle.
    pub margin: Option<Edges>,
    /// Space inside the element rectangle reserved from children.
    pub padding: Option<Edges>,
}

impl BaseStyleProps {
    fn inherit_from(&mut self, ancestor: &Self) {
        self.color = self.color.or(ancestor.color);
        self.color_usage = self.color_usage.or(ancestor.color_usage);
        self.margin = self.margin.or(ancestor.margin);
        self.padding = self.padding.or(ancestor.padding);
    }
}

/// Text-specific properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStyleProps {
    /// Font face path without size or weight decoration.
    pub font: Option<String>,
    /// Font technology.
    pub font_type: Option<FontType>,
    /// Font size in points.
    pub font_size: Option<u32>,
    /// Font weight.
    pub weight: Option<FontWeight>,
    /// Horizontal alignment.
    pub horizontal_align: Option<HorizontalAlign>,
    /// Vertical alignment.
    pub vertical_align: Option<VerticalAlign>,
    /// Controller-legend font face path.
    pub legend_font: Option<String>,
}

impl TextStyleProps {
    fn inherit_from(&mut self, ancestor: &Self) {
        if self.font.is_none() {
            self.font.clone_from(&ancestor.font);
        }
        self.font_type = self.font_type.or(ancestor.font_type);
        self.font_size = self.font_size.or(ancestor.font_size);
        self.weight = self.weight.or(ancestor.weight);
        self.horizontal_align = self.horizontal_align.or(ancestor.horizontal_align);
        self.vertical_align = self.vertical_align.or(ancestor.vertical_align);
        if self.legend_font.is_none() {
            self.legend_font.clone_from(&ancestor.legend_font);
        }
    }
}

/// Sprite-specific properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpriteStyleProps {
    /// Texture file path.
    pub texture: Option<String>,
    /// Texels that map onto one reference unit (slice corner scale).
    pub texels_per_ref_unit: Option<f64>,
    /// Stretching mode.
    pub sprite_type: Option<SpriteType>,
    /// Outer UV rectangle, normalized to `0..1`.
    pub outer_uv: Option<Rect>,
    /// Inner UV rectangle for sliced sprites, normalized to `0..1`.
    pub inner_uv: Option<Rect>,
}

impl SpriteStyleProps {
    fn inherit_from(&mut self, ancestor: &Self) {
        if self.texture.is_none() {
            self.texture.clone_from(&ancestor.texture);
        }
        self.texels_per_ref_unit = self.texels_per_ref_unit.or(ancestor.texels_per_ref_unit);
        self.sprite_type = self.sprite_type.or(ancestor.sprite_type);
        self.outer_uv = self.outer_uv.or(ancestor.outer_uv);
        self.inner_uv = self.inner_uv.or(ancestor.inner_uv);
    }
}

/// The kind of a style and its kind-specific properties.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleKind {
    /// Draws nothing; only base properties.
    Null,
    /// Base properties only.
    Basic,
    /// Text rendering.
    Text(TextStyleProps),
    /// Sprite rendering.
    Sprite(SpriteStyleProps),
}

impl StyleKind {
    /// The class id name of this kind as used in data.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Null => "NullStyle",
            Self::Basic => "BasicStyle",
            Self::Text(_) => "TextStyle",
            Self::Sprite(_) => "SpriteStyle",
        }
    }

    /// Construct an empty kind from a class id name.
    pub fn from_class_name(name: &str) -> Option<Self> {
        let kind = match Id::new(name).as_str() {
            "nullstyle" => Self::Null,
            "basicstyle" | "style" => Self::Basic,
            "textstyle" => Self::Text(TextStyleProps::default()),
            "spritestyle" => Self::Sprite(SpriteStyleProps::default()),
            _ => return None,
        };
        Some(kind)
    }
}

/// A named, inheritable style.
#[derive(Clone, Debug)]
pub struct Style {
    id: Id,
    inherits_from: Id,
    /// Base properties.
    pub base: BaseStyleProps,
    /// Kind and kind-specific properties.
    pub kind: StyleKind,
    pub(crate) font: Cell<Option<FontHandle>>,
    pub(crate) texture: Cell<Option<TextureHandle>>,
    pub(crate) measurements: RefCell<FrameEvictCache<String, Size>>,
}

impl Style {
    /// Id of the style every element uses when none is given.
    pub const NULL_STYLE_ID: &'static str = "nullstyle";

    /// Default tint color.
    pub const DEFAULT_COLOR: Color = Color::WHITE;
    /// Default font face.
    pub const DEFAULT_FONT: &'static str = "Assets/Fonts/SegoeUI";
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: u32 = 18;
    /// Default legend font face.
    pub const DEFAULT_LEGEND_FONT: &'static str = "Assets/Fonts/XboxOneControllerLegendSmall";
    /// Default texels per reference unit.
    pub const DEFAULT_TEXELS_PER_REF_UNIT: f64 = 1.0;
    /// Default UV extents.
    pub const DEFAULT_UV: Rect = Rect::new(0.0, 0.0, 1.0, 1.0);

    /// Create a style with no properties set.
    pub fn new(id: impl Into<Id>, kind: StyleKind) -> Self {
        Self {
            id: id.into(),
            inherits_from: Id::default(),
            base: BaseStyleProps::default(),
            kind,
            font: Cell::new(None),
            texture: Cell::new(None),
            measurements: RefCell::new(FrameEvictCache::new()),
        }
    }

    /// The null style registered under [`Style::NULL_STYLE_ID`].
    pub fn null() -> Self {
        Self::new(Self::NULL_STYLE_ID, StyleKind::Null)
    }

    /// Set the ancestor this style inherits from (builder style).
    pub fn with_inherits_from(mut self, ancestor: impl Into<Id>) -> Self {
        self.inherits_from = ancestor.into();
        self
    }

    /// Set the base properties (builder style).
    pub fn with_base(mut self, base: BaseStyleProps) -> Self {
        self.base = base;
        self
    }

    /// The style id.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// The ancestor id, empty once flattened or when there is none.
    pub fn inherits_from(&self) -> &Id {
        &self.inherits_from
    }

    /// Set or clear the ancestor id.
    pub fn set_inherits_from(&mut self, ancestor: Id) {
        self.inherits_from = ancestor;
    }

    /// Class id name of this style's kind.
    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Copy every unset property from `ancestor` and clear the inheritance reference.
    ///
    /// `ancestor` is expected to be flattened already.
    pub fn inherit_from(&mut self, ancestor: &Self) {
        self.base.inherit_from(&ancestor.base);
        match (&mut self.kind, &ancestor.kind) {
            (StyleKind::Text(mine), StyleKind::Text(theirs)) => mine.inherit_from(theirs),
            (StyleKind::Sprite(mine), StyleKind::Sprite(theirs)) => mine.inherit_from(theirs),
            _ => {}
        }
        self.inherits_from = Id::default();
        self.font.set(None);
        self.texture.set(None);
        self.measurements.borrow_mut().clear();
    }

    /// Resolved tint color.
    pub fn color(&self) -> Color {
        self.base.color.unwrap_or(Self::DEFAULT_COLOR)
    }

    /// Resolved color usage.
    pub fn color_usage(&self) -> ColorUsage {
        self.base.color_usage.unwrap_or(ColorUsage::UseExisting)
    }

    /// Resolved margin.
    pub fn margin(&self) -> Edges {
        self.base.margin.unwrap_or(Edges::ZERO)
    }

    /// Resolved padding.
    pub fn padding(&self) -> Edges {
        self.base.padding.unwrap_or(Edges::ZERO)
    }

    /// Text properties, if this is a text style.
    pub fn text(&self) -> Option<&TextStyleProps> {
        match &self.kind {
            StyleKind::Text(props) => Some(props),
            _ => None,
        }
    }

    /// Sprite properties, if this is a sprite style.
    pub fn sprite(&self) -> Option<&SpriteStyleProps> {
        match &self.kind {
            StyleKind::Sprite(props) => Some(props),
            _ => None,
        }
    }

    /// Grow `rect` by this style's margin.
    pub fn add_margin_to_rect(&self, rect: Rect) -> Rect {
        self.margin().outset(rect)
    }

    /// Shrink `rect` by this style's margin.
    pub fn subtract_margin_from_rect(&self, rect: Rect) -> Rect {
        self.margin().inset(rect)
    }

    /// Shrink `rect` by this style's padding.
    pub fn subtract_padding_from_rect(&self, rect: Rect) -> Rect {
        self.padding().inset(rect)
    }

    /// Push this style's tint if its usage requires it. Returns the pushed stack index.
    pub fn before_render(&self, renderer: &mut dyn StyleRenderer) -> Option<usize> {
        match self.color_usage() {
            ColorUsage::UseExisting => None,
            ColorUsage::SetExisting | ColorUsage::Override => {
                Some(renderer.push_tint_color(self.color()))
            }
        }
    }

    /// Pop an `Override` tint. Returns whatever is still pushed for [`post_render`](Self::post_render).
    pub fn after_render(
        &self,
        renderer: &mut dyn StyleRenderer,
        pushed: Option<usize>,
    ) -> Option<usize> {
        match (self.color_usage(), pushed) {
            (ColorUsage::Override, Some(index)) => {
                renderer.pop_tint_color(index);
                None
            }
            (_, pushed) => pushed,
        }
    }

    /// Pop a `SetExisting` tint once the element's descendants have rendered.
    pub fn post_render(&self, renderer: &mut dyn StyleRenderer, pushed: Option<usize>) {
        if let (ColorUsage::SetExisting, Some(index)) = (self.color_usage(), pushed) {
            renderer.pop_tint_color(index);
        }
    }
}

impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.inherits_from == other.inherits_from
            && self.base == other.base
            && self.kind == other.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessRenderer, RenderCommand};

    fn tinted(usage: ColorUsage) -> Style {
        Style::new("s", StyleKind::Basic).with_base(BaseStyleProps {
            color: Some(Color::RED),
            color_usage: Some(usage),
            ..Default::default()
        })
    }

    #[test]
    fn defaults_resolve() {
        let s = Style::new("plain", StyleKind::Basic);
        assert_eq!(s.color(), Color::WHITE);
        assert_eq!(s.color_usage(), ColorUsage::UseExisting);
        assert_eq!(s.margin(), Edges::ZERO);
        assert_eq!(s.padding(), Edges::ZERO);
        assert!(s.inherits_from().is_empty());
    }

    #[test]
    fn inherit_copies_unset_only() {
        let mut ancestor = Style::new("a", StyleKind::Text(TextStyleProps::default()));
        ancestor.base.margin = Some(Edges::uniform(1));
        ancestor.base.color = Some(Color::BLACK);
        if let StyleKind::Text(t) = &mut ancestor.kind {
            t.font_size = Some(24);
        }

        let mut child = Style::new("b", StyleKind::Text(TextStyleProps::default()))
            .with_inherits_from("a");
        child.base.color = Some(Color::RED);
        child.inherit_from(&ancestor);

        assert_eq!(child.margin(), Edges::uniform(1));
        assert_eq!(child.color(), Color::RED);
        assert_eq!(child.text().and_then(|t| t.font_size), Some(24));
        assert!(child.inherits_from().is_empty());
    }

    #[test]
    fn kind_props_not_inherited_across_kinds() {
        let mut ancestor = Style::new("a", StyleKind::Sprite(SpriteStyleProps::default()));
        if let StyleKind::Sprite(s) = &mut ancestor.kind {
            s.texture = Some("t.png".into());
        }
        ancestor.base.padding = Some(Edges::uniform(3));
        let mut child = Style::new("b", StyleKind::Text(TextStyleProps::default()));
        child.inherit_from(&ancestor);
        assert_eq!(child.padding(), Edges::uniform(3));
        assert_eq!(child.text(), Some(&TextStyleProps::default()));
    }

    #[test]
    fn override_pops_after_render() {
        let mut r = HeadlessRenderer::new();
        let s = tinted(ColorUsage::Override);
        let pushed = s.before_render(&mut r);
        assert_eq!(r.current_color(), Color::RED);
        let rest = s.after_render(&mut r, pushed);
        assert_eq!(rest, None);
        assert_eq!(r.current_color(), Color::WHITE);
        s.post_render(&mut r, rest);
        assert_eq!(r.tint_depth(), 0);
    }

    #[test]
    fn set_existing_pops_in_post_render() {
        let mut r = HeadlessRenderer::new();
        let s = tinted(ColorUsage::SetExisting);
        let pushed = s.before_render(&mut r);
        let rest = s.after_render(&mut r, pushed);
        assert_eq!(r.current_color(), Color::RED, "still active for descendants");
        s.post_render(&mut r, rest);
        assert_eq!(r.current_color(), Color::WHITE);
        assert_eq!(
            r.commands(),
            &[RenderCommand::PushTint(Color::RED, 0), RenderCommand::PopTint(0)]
        );
    }

    #[test]
    fn use_existing_pushes_nothing() {
        let mut r = HeadlessRenderer::new();
        let s = tinted(ColorUsage::UseExisting);
        let pushed = s.before_render(&mut r);
        assert_eq!(pushed, None);
        let rest = s.after_render(&mut r, pushed);
        s.post_render(&mut r, rest);
        assert!(r.commands().is_empty());
    }

    #[test]
    fn margin_and_padding_helpers() {
        let mut s = Style::new("m", StyleKind::Basic);
        s.base.margin = Some(Edges::uniform(5));
        s.base.padding = Some(Edges::new(1, 2, 3, 4));
        let r = Rect::new(10.0, 10.0, 50.0, 50.0);
        assert_eq!(s.add_margin_to_rect(r), Rect::new(5.0, 5.0, 55.0, 55.0));
        assert_eq!(s.subtract_margin_from_rect(r), Rect::new(15.0, 15.0, 45.0, 45.0));
        assert_eq!(s.subtract_padding_from_rect(r), Rect::new(11.0, 12.0, 47.0, 46.0));
    }

    #[test]
    fn enum_names_round_trip_case_insensitively() {
        assert_eq!(ColorUsage::from_name("SETEXISTING"), Some(ColorUsage::SetExisting));
        assert_eq!(SpriteType::from_name("nineSliced"), Some(SpriteType::NineSliced));
        assert_eq!(FontType::from_name("FreeType"), Some(FontType::FreeType));
        assert_eq!(HorizontalAlign::from_name("diagonal"), None);
        assert!(StyleKind::from_class_name("TextStyle").is_some());
        assert!(StyleKind::from_class_name("Nope").is_none());
    }
}
