// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON merge patch and schema promotion.

use serde_json::{Map, Value};

/// Apply `patch` onto `target` with RFC 7386 semantics.
///
/// Objects merge key by key, recursively; a `null` in the patch deletes the key; any other
/// value (arrays included) replaces the target value.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(target) = target else {
        return;
    };
    for (key, value) in patch {
        if value.is_null() {
            target.remove(key);
        } else {
            merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
        }
    }
}

fn lower_camel(class: &str) -> String {
    let mut chars = class.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lift class-specific fields nested under the class key onto the object itself.
///
/// In the nested schema, fields specific to a class live in an object keyed by the class id
/// with a lowercase first letter (`"textStyle": { ... }` for `TextStyle`). A key that only
/// matches case-insensitively is still applied, with a warning. Returns true if fields were
/// promoted.
pub fn promote_class_fields(data: &mut Value, class: &str) -> bool {
    let Some(object) = data.as_object() else {
        return false;
    };
    let key = lower_camel(class);
    let nested = match object.get(&key) {
        Some(nested) => nested.clone(),
        None => {
            let Some((found, nested)) = object
                .iter()
                .find(|(k, v)| v.is_object() && k.eq_ignore_ascii_case(class))
            else {
                return false;
            };
            tracing::warn!(
                key = %found,
                class,
                "class field key is not camelCased; applying it anyway"
            );
            nested.clone()
        }
    };
    if !nested.is_object() {
        return false;
    }
    merge_patch(data, &nested);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn rfc_7386_examples() {
        let mut doc = json!({ "a": "b", "c": { "d": "e", "f": "g" } });
        merge_patch(&mut doc, &json!({ "a": "z", "c": { "f": null } }));
        assert_eq!(doc, json!({ "a": "z", "c": { "d": "e" } }));

        let mut doc = json!({ "a": [1, 2] });
        merge_patch(&mut doc, &json!({ "a": [3] }));
        assert_eq!(doc, json!({ "a": [3] }));

        let mut doc = json!(["a"]);
        merge_patch(&mut doc, &json!({ "b": { "c": null, "d": 1 } }));
        assert_eq!(doc, json!({ "b": { "d": 1 } }));

        let mut doc = json!({ "a": 1 });
        merge_patch(&mut doc, &json!("replaced"));
        assert_eq!(doc, json!("replaced"));
    }

    #[test]
    fn promotes_camel_cased_class_key() {
        let mut data = json!({
            "classId": "StaticText",
            "id": "label",
            "staticText": { "text": "hi" }
        });
        assert!(promote_class_fields(&mut data, "StaticText"));
        assert_eq!(data["text"], "hi");
    }

    #[traced_test]
    #[test]
    fn case_insensitive_match_warns() {
        let mut data = json!({ "classId": "Slider", "SLIDER": { "initialValue": 0.25 } });
        assert!(promote_class_fields(&mut data, "Slider"));
        assert_eq!(data["initialValue"], 0.25);
        assert!(logs_contain("not camelCased"));
    }

    #[test]
    fn nothing_to_promote() {
        let mut data = json!({ "classId": "Panel", "id": "p" });
        let before = data.clone();
        assert!(!promote_class_fields(&mut data, "Panel"));
        assert_eq!(data, before);
    }
}
