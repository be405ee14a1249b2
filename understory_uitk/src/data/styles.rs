// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styles from data.

use serde_json::Value;
use understory_style::{
    BaseStyleProps, ColorUsage, FontType, FontWeight, HorizontalAlign, Id, SpriteStyleProps,
    SpriteType, Style, StyleKind, TextStyleProps, VerticalAlign,
};

use super::object::DataObject;
use super::patch::promote_class_fields;
use crate::error::{Result, UiError};

/// Build a [`Style`] from a style object.
///
/// `classId` picks the kind (`Style`, `BasicStyle`, `TextStyle`, `SpriteStyle` or
/// `NullStyle`). The id comes from `id`, then `fallback_id`, then a fresh unique id.
/// Kind-specific fields may be written flat or nested under the lower-camel class key.
///
/// ```
/// use serde_json::json;
/// use understory_uitk::data::style_from_data;
///
/// let style = style_from_data(
///     &json!({ "classId": "TextStyle", "id": "title", "textStyle": { "fontSize": 32 } }),
///     "styles.json",
///     None,
/// )
/// .unwrap();
/// assert_eq!(style.id().as_str(), "title");
/// assert_eq!(style.text().and_then(|t| t.font_size), Some(32));
/// ```
pub fn style_from_data(data: &Value, context: &str, fallback_id: Option<Id>) -> Result<Style> {
    let class = DataObject::new(data, context)?
        .require_str("classId")?
        .to_owned();
    let mut data = data.clone();
    promote_class_fields(&mut data, &class);
    let obj = DataObject::new(&data, context)?;

    let mut kind = StyleKind::from_class_name(&class).ok_or_else(|| UiError::UnknownClass {
        context: context.to_owned(),
        class: class.clone(),
    })?;

    let id = match obj.str("id")? {
        Some(id) => Id::new(id),
        None => fallback_id.unwrap_or_else(|| Id::create_uuid(Some("style_"))),
    };

    let base = BaseStyleProps {
        color: obj.color("color")?,
        color_usage: obj.named("colorUsage", ColorUsage::from_name)?,
        margin: obj.edges("margin")?,
        padding: obj.edges("padding")?,
    };

    match &mut kind {
        StyleKind::Text(text) => *text = text_props(&obj)?,
        StyleKind::Sprite(sprite) => *sprite = sprite_props(&obj)?,
        StyleKind::Null | StyleKind::Basic => {}
    }

    let mut style = Style::new(id, kind).with_base(base);
    if let Some(ancestor) = obj.str("inheritsFromId")? {
        style.set_inherits_from(Id::new(ancestor));
    }
    tracing::trace!(style = %style.id(), class = style.class_name(), "style parsed");
    Ok(style)
}

fn text_props(obj: &DataObject<'_>) -> Result<TextStyleProps> {
    let font_size = match obj.u32("fontSize")? {
        Some(size) => Some(size),
        None => obj.u32("size")?,
    };
    Ok(TextStyleProps {
        font: obj.str("font")?.map(str::to_owned),
        font_type: obj.named("fontType", FontType::from_name)?,
        font_size,
        weight: obj.named("weight", FontWeight::from_name)?,
        horizontal_align: obj.named("horizontalAlign", HorizontalAlign::from_name)?,
        vertical_align: obj.named("verticalAlign", VerticalAlign::from_name)?,
        legend_font: obj.str("legendFont")?.map(str::to_owned),
    })
}

fn sprite_props(obj: &DataObject<'_>) -> Result<SpriteStyleProps> {
    Ok(SpriteStyleProps {
        texture: obj.str("texture")?.map(str::to_owned),
        texels_per_ref_unit: obj.f64("texelsPerRefUnit")?,
        sprite_type: obj.named("spriteType", SpriteType::from_name)?,
        outer_uv: obj.uv_rect("outerUVExtents")?,
        inner_uv: obj.uv_rect("innerUVExtents")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use serde_json::json;
    use understory_style::{Color, Edges};

    #[test]
    fn flat_text_style() {
        let style = style_from_data(
            &json!({
                "classId": "textstyle",
                "id": "Body",
                "inheritsFromId": "Base",
                "color": [255, 0, 0],
                "colorUsage": "override",
                "padding": [1, 2, 3, 4],
                "size": 24,
                "weight": "bold",
                "horizontalAlign": "center"
            }),
            "t",
            None,
        )
        .unwrap();
        assert_eq!(style.id().as_str(), "body");
        assert_eq!(style.inherits_from().as_str(), "base");
        assert_eq!(style.base.color, Some(Color::RED));
        assert_eq!(style.base.color_usage, Some(ColorUsage::Override));
        assert_eq!(style.base.padding, Some(Edges::new(1, 2, 3, 4)));
        let text = style.text().unwrap();
        assert_eq!(text.font_size, Some(24));
        assert_eq!(text.weight, Some(FontWeight::Bold));
        assert_eq!(text.horizontal_align, Some(HorizontalAlign::Center));
        assert_eq!(text.vertical_align, None);
    }

    #[test]
    fn nested_sprite_style() {
        let style = style_from_data(
            &json!({
                "classId": "SpriteStyle",
                "spriteStyle": {
                    "texture": "ui/frame.png",
                    "spriteType": "nineSliced",
                    "innerUVExtents": [0.25, 0.25, 0.75, 0.75]
                }
            }),
            "t",
            Some(Id::new("frame")),
        )
        .unwrap();
        assert_eq!(style.id().as_str(), "frame");
        let sprite = style.sprite().unwrap();
        assert_eq!(sprite.texture.as_deref(), Some("ui/frame.png"));
        assert_eq!(sprite.sprite_type, Some(SpriteType::NineSliced));
        assert_eq!(sprite.inner_uv, Some(Rect::new(0.25, 0.25, 0.75, 0.75)));
    }

    #[test]
    fn unknown_or_missing_class() {
        assert!(matches!(
            style_from_data(&json!({ "classId": "Glitter" }), "t", None),
            Err(UiError::UnknownClass { class, .. }) if class == "Glitter"
        ));
        assert!(matches!(
            style_from_data(&json!({ "id": "a" }), "t", None),
            Err(UiError::MissingField { field: "classId", .. })
        ));
    }

    #[test]
    fn generated_ids_are_unique() {
        let data = json!({ "classId": "Style" });
        let a = style_from_data(&data, "t", None).unwrap();
        let b = style_from_data(&data, "t", None).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().as_str().starts_with("style_"));
    }
}
