// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed field access over JSON objects.

use kurbo::{Rect, Size, Vec2};
use serde_json::{Map, Value};
use understory_element_tree::{Anchor, HorizontalAnchor, VerticalAnchor};
use understory_style::{Color, Edges};

use crate::error::{Result, UiError};

/// A JSON object with typed getters.
///
/// Optional getters return `Ok(None)` for an absent field and an error for a field of the
/// wrong shape, so a typo in a data file is reported instead of silently defaulted.
///
/// ```
/// use serde_json::json;
/// use understory_uitk::data::DataObject;
///
/// let value = json!({ "id": "ok", "size": [200, 40], "visible": false });
/// let data = DataObject::new(&value, "ok").unwrap();
/// assert_eq!(data.require_str("id").unwrap(), "ok");
/// assert_eq!(data.size("size").unwrap().map(|s| s.width), Some(200.0));
/// assert_eq!(data.bool("visible").unwrap(), Some(false));
/// assert_eq!(data.bool("enabled").unwrap(), None);
/// assert!(data.f64("visible").is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DataObject<'a> {
    map: &'a Map<String, Value>,
    context: &'a str,
}

impl<'a> DataObject<'a> {
    /// Wrap `value`, which must be an object. `context` names it in errors.
    pub fn new(value: &'a Value, context: &'a str) -> Result<Self> {
        match value.as_object() {
            Some(map) => Ok(Self { map, context }),
            None => Err(UiError::invalid(context, "expected an object")),
        }
    }

    /// The error context.
    pub fn context(&self) -> &'a str {
        self.context
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Field names in document order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.map.keys().map(String::as_str)
    }

    /// Raw field value.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    fn invalid(&self, key: &str, expected: &str) -> UiError {
        UiError::invalid(format!("{}.{key}", self.context), format!("expected {expected}"))
    }

    /// A nested object.
    pub fn object(&self, key: &str) -> Result<Option<Self>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Self {
                map,
                context: self.context,
            })),
            Some(_) => Err(self.invalid(key, "an object")),
        }
    }

    /// A nested array.
    pub fn array(&self, key: &str) -> Result<Option<&'a [Value]>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.as_slice())),
            Some(_) => Err(self.invalid(key, "an array")),
        }
    }

    /// A boolean.
    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid(key, "a boolean")),
        }
    }

    /// A number.
    pub fn f64(&self, key: &str) -> Result<Option<f64>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a number")),
        }
    }

    /// A number, narrowed to `f32`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Widget values are stored in single precision."
    )]
    pub fn f32(&self, key: &str) -> Result<Option<f32>> {
        Ok(self.f64(key)?.map(|v| v as f32))
    }

    /// A non-negative integer.
    pub fn u32(&self, key: &str) -> Result<Option<u32>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a non-negative integer")),
        }
    }

    /// A string.
    pub fn str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid(key, "a string")),
        }
    }

    /// A string that must be present.
    pub fn require_str(&self, key: &'static str) -> Result<&'a str> {
        self.str(key)?
            .ok_or_else(|| UiError::missing(self.context, key))
    }

    /// An array of strings.
    pub fn string_array(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(items) = self.array(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| self.invalid(key, "an array of strings"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// An array of `min..=max` numbers.
    fn numbers(&self, key: &str, min: usize, max: usize) -> Result<Option<Vec<f64>>> {
        let Some(items) = self.array(key)? else {
            return Ok(None);
        };
        let expected = || {
            if min == max {
                format!("an array of {min} numbers")
            } else {
                format!("an array of {min} to {max} numbers")
            }
        };
        if !(min..=max).contains(&items.len()) {
            return Err(self.invalid(key, &expected()));
        }
        items
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| self.invalid(key, &expected())))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// `[x, y]`.
    pub fn vec2(&self, key: &str) -> Result<Option<Vec2>> {
        Ok(self.numbers(key, 2, 2)?.map(|n| Vec2::new(n[0], n[1])))
    }

    /// `[width, height]`.
    pub fn size(&self, key: &str) -> Result<Option<Size>> {
        Ok(self.numbers(key, 2, 2)?.map(|n| Size::new(n[0], n[1])))
    }

    /// `[left, top, right, bottom]`, rounded to whole reference units.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Edge thickness is integral in reference units."
    )]
    pub fn edges(&self, key: &str) -> Result<Option<Edges>> {
        Ok(self.numbers(key, 4, 4)?.map(|n| {
            Edges::new(
                n[0].round() as i32,
                n[1].round() as i32,
                n[2].round() as i32,
                n[3].round() as i32,
            )
        }))
    }

    /// `[r, g, b]` or `[r, g, b, a]` with 0-255 channels and a 0-1 alpha (default 1).
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Colors are stored in single precision."
    )]
    pub fn color(&self, key: &str) -> Result<Option<Color>> {
        Ok(self.numbers(key, 3, 4)?.map(|n| {
            let alpha = n.get(3).copied().unwrap_or(1.0);
            Color::from_rgb8_alpha(n[0] as f32, n[1] as f32, n[2] as f32, alpha as f32)
        }))
    }

    /// `[x0, y0, x1, y1]` UV extents, each clamped to `0..1`.
    pub fn uv_rect(&self, key: &str) -> Result<Option<Rect>> {
        Ok(self.numbers(key, 4, 4)?.map(|n| {
            let c = |v: f64| v.clamp(0.0, 1.0);
            Rect::new(c(n[0]), c(n[1]), c(n[2]), c(n[3]))
        }))
    }

    /// `[horizontal, vertical]` anchor names.
    pub fn anchor(&self, key: &str) -> Result<Option<Anchor>> {
        let Some(names) = self.string_array(key)? else {
            return Ok(None);
        };
        let [horizontal, vertical] = names.as_slice() else {
            return Err(self.invalid(key, "an array of two anchor names"));
        };
        let h = HorizontalAnchor::from_name(horizontal)
            .ok_or_else(|| UiError::UnknownAnchor(horizontal.clone()))?;
        let v = VerticalAnchor::from_name(vertical)
            .ok_or_else(|| UiError::UnknownAnchor(vertical.clone()))?;
        Ok(Some(Anchor::new(h, v)))
    }

    /// A string naming one value of an enumeration, looked up with `from_name`.
    pub fn named<T>(
        &self,
        key: &'static str,
        from_name: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>> {
        let Some(name) = self.str(key)? else {
            return Ok(None);
        };
        from_name(name)
            .map(Some)
            .ok_or_else(|| UiError::UnknownEnumValue {
                field: key,
                value: name.to_owned(),
            })
    }
}
