// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named value substitutions.

use std::collections::HashMap;

use serde_json::{Value, json};
use crate::error::{Result, UiError};

/// Substitutions keyed by `#name`.
///
/// A string value equal to a defined key is replaced by the definition. A string that is not
/// defined but spells a CSS color (`#RRGGBB` or `#RRGGBBAA`) becomes a color array
/// `[r, g, b, a]` with 0-255 channels and a 0-1 alpha.
///
/// ```
/// use serde_json::json;
/// use understory_uitk::data::DataDefinitions;
///
/// let mut defs = DataDefinitions::new();
/// defs.load(&json!({ "#accent": "#FF000080", "#pad": [4, 4, 4, 4] }), true).unwrap();
///
/// let mut data = json!({ "color": "#accent", "padding": "#pad" });
/// defs.replace_all(&mut data);
/// assert_eq!(data["color"], json!([255, 0, 0, 128.0 / 255.0]));
/// assert_eq!(data["padding"], json!([4, 4, 4, 4]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DataDefinitions {
    values: HashMap<String, Value>,
}

impl DataDefinitions {
    /// Nested definitions are expanded at most this deep.
    pub const MAX_DEPTH: usize = 16;

    /// No definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` names a definition: `#` followed by anything but another `#`.
    pub fn is_definition(key: &str) -> bool {
        let mut chars = key.chars();
        chars.next() == Some('#') && chars.next().is_some_and(|c| c != '#')
    }

    /// Parse a literal CSS color into a color array.
    pub fn css_color(text: &str) -> Option<Value> {
        let hex = text.strip_prefix('#')?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let alpha = match hex.len() {
            8 => f64::from(channel(6)?) / 255.0,
            _ => 1.0,
        };
        Some(json!([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }

    /// Load definitions from a `definitions` object.
    ///
    /// With `replace_existing` false, keys that are already defined keep their value. Keys
    /// that are not definition names are skipped with a warning.
    pub fn load(&mut self, definitions: &Value, replace_existing: bool) -> Result<()> {
        let Some(object) = definitions.as_object() else {
            return Err(UiError::invalid("definitions", "expected an object"));
        };
        for (key, value) in object {
            if !Self::is_definition(key) {
                tracing::warn!(key = %key, "ignoring definition key without a leading '#'");
                continue;
            }
            if replace_existing || !self.values.contains_key(key) {
                self.values.insert(key.clone(), value.clone());
            }
        }
        tracing::debug!(count = self.values.len(), "definitions loaded");
        Ok(())
    }

    /// Define or redefine one key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// The raw value of a definition.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// A definition with its own references replaced.
    pub fn resolved(&self, key: &str) -> Option<Value> {
        let mut value = self.values.get(key)?.clone();
        self.replace_all(&mut value);
        Some(value)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forget every definition.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Replace every reference inside `data`, recursively. Returns true if anything changed.
    pub fn replace_all(&self, data: &mut Value) -> bool {
        self.replace_at_depth(data, 0)
    }

    fn replace_at_depth(&self, data: &mut Value, depth: usize) -> bool {
        match data {
            Value::String(text) => {
                if let Some(definition) = self.values.get(text.as_str()) {
                    if depth >= Self::MAX_DEPTH {
                        tracing::warn!(key = %text, "definition nesting too deep; left unexpanded");
                        return false;
                    }
                    let mut value = definition.clone();
                    self.replace_at_depth(&mut value, depth + 1);
                    *data = value;
                    true
                } else if let Some(color) = Self::css_color(text) {
                    *data = color;
                    true
                } else {
                    false
                }
            }
            Value::Array(items) => {
                let mut changed = false;
                for item in items {
                    changed |= self.replace_at_depth(item, depth);
                }
                changed
            }
            Value::Object(object) => {
                let mut changed = false;
                for value in object.values_mut() {
                    changed |= self.replace_at_depth(value, depth);
                }
                changed
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_names() {
        assert!(DataDefinitions::is_definition("#a"));
        assert!(!DataDefinitions::is_definition("##a"));
        assert!(!DataDefinitions::is_definition("#"));
        assert!(!DataDefinitions::is_definition("a"));
    }

    #[test]
    fn nested_references_expand() {
        let mut defs = DataDefinitions::new();
        defs.load(
            &json!({ "#red": "#FF0000", "#warn": { "color": "#red", "size": 3 } }),
            true,
        )
        .unwrap();
        let mut data = json!(["#warn", "plain", 7]);
        assert!(defs.replace_all(&mut data));
        assert_eq!(data, json!([{ "color": [255, 0, 0, 1.0], "size": 3 }, "plain", 7]));
    }

    #[test]
    fn load_can_keep_existing() {
        let mut defs = DataDefinitions::new();
        defs.load(&json!({ "#a": 1 }), true).unwrap();
        defs.load(&json!({ "#a": 2, "#b": 3 }), false).unwrap();
        assert_eq!(defs.get("#a"), Some(&json!(1)));
        assert_eq!(defs.get("#b"), Some(&json!(3)));
        defs.load(&json!({ "#a": 2 }), true).unwrap();
        assert_eq!(defs.get("#a"), Some(&json!(2)));
        assert!(defs.load(&json!([1]), true).is_err());
    }

    #[test]
    fn self_reference_stops() {
        let mut defs = DataDefinitions::new();
        defs.set("#loop", json!(["#loop"]));
        let mut data = json!("#loop");
        defs.replace_all(&mut data);
        let mut depth = 0;
        let mut cursor = &data;
        while let Some(inner) = cursor.get(0) {
            depth += 1;
            cursor = inner;
        }
        assert_eq!(depth, DataDefinitions::MAX_DEPTH);
    }
}
