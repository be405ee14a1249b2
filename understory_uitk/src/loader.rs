// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout and prefab loading.
//!
//! ## Documents
//!
//! A layout file is a JSON object with these top-level keys:
//!
//! - `definitions`: `#name` values substituted wherever the name appears as a string.
//! - `styles`: an array of style objects (see [`style_from_data`]).
//! - `layout`: the root element. Required.
//! - `includes`: files merged under this one, earliest lowest. Included files may not have
//!   `includes` or `layout` of their own, and a file may not include itself.
//!
//! An element has `id` and `classId`, the base fields `visible`, `enabled`, `focusable`,
//! `styleId` (or an inline `style`), `positioningAnchor`, `position`, `sizingAnchor`, `size`,
//! its widget's fields, and optional `subElements` and `childElements` arrays. Sub-elements
//! may not declare children. `prefabRef` names a prefab file whose `prefab` object the element
//! is patched onto.
//!
//! ## Atomicity
//!
//! Loading parses and validates the whole document first, against staged copies of the
//! definitions and style sheet. Elements are only created once everything has parsed and every
//! style has flattened, so a failed load leaves the scene untouched.

use serde_json::Value;
use understory_element_tree::{ElementFlags, ElementId, ElementProperties};
use understory_style::{Id, Style, StyleSheet};

use crate::UiManager;
use crate::data::{
    DataDefinitions, DataObject, DataSource, load_json, merge_patch, parse_json,
    promote_class_fields, style_from_data,
};
use crate::error::{Result, UiError};
use crate::widgets::Widget;

/// An element parsed from data, not yet in the tree.
#[derive(Debug)]
struct ParsedElement {
    id: Id,
    props: ElementProperties,
    widget: Widget,
    sub_elements: Vec<ParsedElement>,
    children: Vec<ParsedElement>,
}

/// Definitions and styles as they will be once the current load succeeds.
struct Staging<'a> {
    source: &'a dyn DataSource,
    definitions: DataDefinitions,
    styles: StyleSheet,
}

impl Staging<'_> {
    /// Load a `styles` array. Layout styles replace existing ones; prefab styles never do.
    fn load_styles(&mut self, styles: &mut Value, context: &str, replace: bool) -> Result<()> {
        let Value::Array(items) = styles else {
            return Err(UiError::invalid("styles", "expected an array"));
        };
        for item in items.iter_mut() {
            self.definitions.replace_all(item);
            if !replace {
                let Some(id) = item.get("id").and_then(Value::as_str).map(Id::new) else {
                    tracing::warn!(context, "prefab style without an id skipped");
                    continue;
                };
                if self.styles.contains(&id) {
                    continue;
                }
            }
            let style = style_from_data(item, context, None)?;
            if self.styles.replace_style(style).is_some() {
                tracing::warn!(context, "style redefined by a later load");
            }
        }
        Ok(())
    }

    /// Read a prefab file, staging its definitions and new styles. Returns the `prefab`
    /// object with definitions replaced.
    fn load_prefab_data(&mut self, path: &str) -> Result<Value> {
        let mut root = load_json(self.source, path)?;
        if let Some(definitions) = root.get("definitions") {
            self.definitions.load(definitions, false)?;
        }
        if let Some(styles) = root.get_mut("styles") {
            self.load_styles(styles, path, false)?;
        }
        let mut prefab = root
            .get_mut("prefab")
            .map(Value::take)
            .ok_or_else(|| UiError::missing(path, "prefab"))?;
        self.definitions.replace_all(&mut prefab);
        if prefab.get("childElements").is_some() {
            return Err(UiError::invalid(
                "childElements",
                format!("prefab `{path}` may not declare child elements"),
            ));
        }
        if prefab.get("classId").is_none() {
            return Err(UiError::missing(path, "classId"));
        }
        Ok(prefab)
    }

    /// Parse an element and its descendants.
    fn element(
        &mut self,
        context: &str,
        mut data: Value,
        is_sub_element: bool,
    ) -> Result<ParsedElement> {
        if !data.is_object() {
            return Err(UiError::invalid(context, "an element must be an object"));
        }
        if data.get("id").is_none() {
            return Err(UiError::missing(context, "id"));
        }
        if let Some(path) = data.get("prefabRef").and_then(Value::as_str) {
            let path = path.to_owned();
            let mut prefab = self.load_prefab_data(&path)?;
            merge_patch(&mut prefab, &data);
            data = prefab;
        }

        let obj = DataObject::new(&data, context)?;
        let id = obj.require_str("id")?.to_owned();
        let Some(class) = obj.str("classId")?.map(str::to_owned) else {
            return Err(UiError::missing(id, "classId"));
        };
        if !Widget::is_known_class(&class) {
            return Err(UiError::UnknownClass { context: id, class });
        }
        promote_class_fields(&mut data, &class);

        let obj = DataObject::new(&data, &id)?;
        let widget = Widget::from_data(&class, &obj)?;
        let props = self.properties(&obj)?;

        let mut sub_elements = Vec::new();
        if let Some(items) = obj.array("subElements")? {
            for item in items {
                sub_elements.push(self.element(&id, item.clone(), true)?);
            }
        }
        let mut children = Vec::new();
        if let Some(items) = obj.array("childElements")? {
            if is_sub_element {
                tracing::warn!(element = %id, "sub-element child elements ignored");
            } else {
                for item in items {
                    children.push(self.element(&id, item.clone(), false)?);
                }
            }
        }
        tracing::trace!(element = %id, class = %class, "element parsed");
        Ok(ParsedElement {
            id: Id::new(&id),
            props,
            widget,
            sub_elements,
            children,
        })
    }

    fn properties(&mut self, obj: &DataObject<'_>) -> Result<ElementProperties> {
        let mut props = ElementProperties::default();
        for (bit, key, default) in [
            (ElementFlags::VISIBLE, "visible", true),
            (ElementFlags::ENABLED, "enabled", true),
            (ElementFlags::FOCUSABLE, "focusable", false),
        ] {
            props.flags.set(bit, obj.bool(key)?.unwrap_or(default));
        }

        props.style_id = match (obj.str("styleId")?, obj.get("style")) {
            (Some(style_id), _) => Id::new(style_id),
            (None, Some(inline)) => {
                let style = style_from_data(inline, obj.context(), None)?;
                let id = style.id().clone();
                self.styles.add_style(style);
                id
            }
            (None, None) => Id::new(Style::NULL_STYLE_ID),
        };

        if let Some(anchor) = obj.anchor("positioningAnchor")? {
            props.positioning_anchor = anchor;
        }
        if let Some(position) = obj.vec2("position")? {
            props.relative_position = position;
        }
        if let Some(anchor) = obj.anchor("sizingAnchor")? {
            props.sizing_anchor = anchor;
        }
        if let Some(size) = obj.size("size")? {
            props.relative_size = size;
        }
        Ok(props)
    }
}

impl UiManager {
    fn staging(&self) -> Staging<'_> {
        Staging {
            source: &*self.source,
            definitions: self.definitions.clone(),
            styles: self.styles.clone(),
        }
    }

    fn commit(&mut self, definitions: DataDefinitions, mut styles: StyleSheet) -> Result<()> {
        styles.flatten_all()?;
        self.definitions = definitions;
        self.styles = styles;
        Ok(())
    }

    /// Create the elements of `parsed`, registering the root and full children, then run
    /// `post_load` over the new subtree.
    fn build(&mut self, parsed: ParsedElement) -> ElementId {
        let ParsedElement {
            id,
            props,
            widget,
            sub_elements,
            children,
        } = parsed;
        let root = self.insert_widget(id, props, widget, true);
        let mut stack = vec![(root, sub_elements, children)];
        while let Some((parent, sub_elements, children)) = stack.pop() {
            for (parsed, as_sub) in sub_elements
                .into_iter()
                .map(|s| (s, true))
                .chain(children.into_iter().map(|c| (c, false)))
            {
                let ParsedElement {
                    id,
                    props,
                    widget,
                    sub_elements,
                    children,
                } = parsed;
                let element = self.insert_widget(id, props, widget, !as_sub);
                self.tree.attach_to(element, parent, as_sub);
                stack.push((element, sub_elements, children));
            }
        }
        self.post_load(root);
        root
    }

    /// Merge the files listed under `includes` beneath `root`.
    fn resolve_includes(&self, context: &str, root: Value) -> Result<Value> {
        let Some(includes) = root.get("includes") else {
            return Ok(root);
        };
        let Value::Array(paths) = includes else {
            return Err(UiError::invalid("includes", "expected an array of paths"));
        };
        let context_id = Id::new(context);
        let mut merged: Option<Value> = None;
        for path in paths {
            let Some(path) = path.as_str() else {
                return Err(UiError::invalid("includes", "expected an array of paths"));
            };
            if Id::new(path) == context_id {
                return Err(UiError::IncludeViolation {
                    path: path.to_owned(),
                    reason: "a file may not include itself",
                });
            }
            let include = load_json(&*self.source, path)?;
            if include.get("includes").is_some() {
                return Err(UiError::IncludeViolation {
                    path: path.to_owned(),
                    reason: "included files may not have includes",
                });
            }
            if include.get("layout").is_some() {
                return Err(UiError::IncludeViolation {
                    path: path.to_owned(),
                    reason: "included files may not have a layout",
                });
            }
            tracing::debug!(context, include = path, "merging include");
            match &mut merged {
                Some(merged) => merge_patch(merged, &include),
                None => merged = Some(include),
            }
        }
        let mut merged = merged.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        merge_patch(&mut merged, &root);
        Ok(merged)
    }

    /// Load a layout document already parsed to JSON. `context` names it in errors.
    ///
    /// The new root element is registered but not attached.
    pub fn load_layout_from_value(&mut self, context: &str, root: Value) -> Result<ElementId> {
        let mut root = self.resolve_includes(context, root)?;
        let mut staging = self.staging();
        if let Some(definitions) = root.get("definitions") {
            staging.definitions.load(definitions, true)?;
        }
        if let Some(styles) = root.get_mut("styles") {
            staging.load_styles(styles, context, true)?;
        }
        let mut layout = root
            .get_mut("layout")
            .map(Value::take)
            .ok_or_else(|| UiError::missing(context, "layout"))?;
        staging.definitions.replace_all(&mut layout);
        let parsed = staging.element(context, layout, false)?;

        let Staging {
            definitions,
            styles,
            ..
        } = staging;
        self.commit(definitions, styles)?;
        let root = self.build(parsed);
        tracing::info!(context, elements = self.tree.depth_ordered(root).len(), "layout loaded");
        Ok(root)
    }

    /// Load a layout from JSON text.
    ///
    /// ```
    /// use understory_uitk::{UiConfig, UiManager};
    ///
    /// let mut ui = UiManager::new(UiConfig::default());
    /// let root = ui
    ///     .load_layout_from_str(
    ///         "inline",
    ///         r##"{
    ///             "definitions": { "#greeting": "hello" },
    ///             "layout": {
    ///                 "id": "main", "classId": "Panel",
    ///                 "childElements": [
    ///                     { "id": "label", "classId": "StaticText", "text": "#greeting" }
    ///                 ]
    ///             }
    ///         }"##,
    ///     )
    ///     .unwrap();
    /// ui.add_child(root, ui.root());
    /// assert!(ui.find_by_id("label").is_some());
    /// ```
    pub fn load_layout_from_str(&mut self, context: &str, text: &str) -> Result<ElementId> {
        let root = parse_json(context, text)?;
        self.load_layout_from_value(context, root)
    }

    /// Load a layout file through the scene's data source.
    pub fn load_layout_from_file(&mut self, path: &str) -> Result<ElementId> {
        let root = load_json(&*self.source, path)?;
        self.load_layout_from_value(path, root)
    }

    /// Load a layout file and attach its root as a child of `parent`.
    pub fn add_child_from_layout(&mut self, parent: ElementId, path: &str) -> Result<ElementId> {
        let element = self.load_layout_from_file(path)?;
        self.add_child(element, parent);
        Ok(element)
    }

    /// Create a new instance of a prefab. `path` may also be a `#name` definition holding the
    /// path.
    ///
    /// The instance root gets a fresh unique id and is registered; its sub-elements are not,
    /// so one prefab can be instantiated many times.
    pub fn instantiate_prefab(&mut self, path: &str) -> Result<ElementId> {
        let path = if DataDefinitions::is_definition(path) {
            self.definitions
                .resolved(path)
                .and_then(|v| v.as_str().map(str::to_owned))
                .ok_or_else(|| {
                    UiError::invalid(path, "prefab path definition is not defined")
                })?
        } else {
            path.to_owned()
        };

        let mut staging = self.staging();
        let mut prefab = staging.load_prefab_data(&path)?;
        let id = Id::create_uuid(None);
        if let Some(object) = prefab.as_object_mut() {
            object.insert("id".into(), Value::String(id.as_str().to_owned()));
        }
        let parsed = staging.element(&path, prefab, false)?;

        let Staging {
            definitions,
            styles,
            ..
        } = staging;
        self.commit(definitions, styles)?;
        let root = self.build(parsed);
        tracing::debug!(prefab = %path, instance = %id, "prefab instantiated");
        Ok(root)
    }

    /// Instantiate a prefab and attach it as a child of `parent`.
    pub fn add_child_from_prefab(&mut self, parent: ElementId, path: &str) -> Result<ElementId> {
        let element = self.instantiate_prefab(path)?;
        self.add_child(element, parent);
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UiConfig;
    use crate::data::MemoryDataSource;
    use crate::widgets::{Button, ConsoleWindow, Slider, StackPanel, StaticText};
    use kurbo::{Size, Vec2};
    use understory_element_tree::{Anchor, HorizontalAnchor, VerticalAnchor};
    use understory_style::Color;
    use tracing_test::traced_test;

    fn scene(files: &[(&str, &str)]) -> UiManager {
        let mut source = MemoryDataSource::new();
        for (path, text) in files {
            source.insert(*path, *text);
        }
        UiManager::new(UiConfig::default()).with_data_source(source)
    }

    const MENU: &str = r##"{
        "definitions": { "#accent": "#FF0000", "#title": "Main menu" },
        "styles": [
            { "classId": "BasicStyle", "id": "base", "margin": [1, 1, 1, 1] },
            { "classId": "TextStyle", "id": "title", "inheritsFromId": "base", "color": "#accent" }
        ],
        "layout": {
            "id": "menu", "classId": "Panel",
            "size": [400, 300],
            "childElements": [
                {
                    "id": "heading", "classId": "StaticText", "styleId": "title",
                    "staticText": { "text": "#title" },
                    "positioningAnchor": ["center", "middle"],
                    "sizingAnchor": ["center", "middle"],
                    "size": [100, 50]
                },
                {
                    "id": "play", "classId": "Button", "focusable": true,
                    "position": [10, 20], "size": [80, 30],
                    "subElements": [
                        { "id": "label", "classId": "StaticText", "text": "Play" }
                    ]
                }
            ]
        }
    }"##;

    #[test]
    fn layouts_build_the_tree_with_styles_and_definitions() {
        let mut ui = scene(&[("menu.json", MENU)]);
        let menu = ui.add_child_from_layout(ui.root(), "menu.json").unwrap();
        assert_eq!(ui.find_by_id("menu"), Some(menu));

        let heading = ui.find_by_id("heading").unwrap();
        assert_eq!(ui.widget::<StaticText>(heading).unwrap().text(), "Main menu");
        assert_eq!(ui.tree().screen_rect_ref(heading).origin().x, 150.0);
        assert_eq!(ui.tree().screen_rect_ref(heading).origin().y, 125.0);
        let style = ui.tree().style(heading).unwrap();
        assert_eq!(style.color(), Color::from_rgb8_alpha(255.0, 0.0, 0.0, 1.0));
        assert_eq!(style.margin(), ui.styles().get(&Id::new("base")).unwrap().margin());
        assert!(style.inherits_from().is_empty());

        let play = ui.find_by_id("play").unwrap();
        assert!(ui.tree().is_focusable(play));
        assert_eq!(
            ui.tree().properties(play).unwrap().relative_position,
            Vec2::new(10.0, 20.0)
        );
        assert_eq!(ui.tree().sub_elements(play).len(), 1);
        // Sub-elements are not registered.
        assert!(ui.tree().try_find_by_id(&Id::new("label")).is_none());
        assert!(ui.widget::<Button>(play).is_some());
        assert_eq!(ui.definitions().get("#title"), Some(&Value::from("Main menu")));
    }

    #[test]
    fn missing_class_fails_before_anything_is_built() {
        let mut ui = scene(&[]);
        let before = ui.tree().len();
        let err = ui
            .load_layout_from_str(
                "broken",
                r#"{
                    "styles": [ { "classId": "BasicStyle", "id": "unused" } ],
                    "layout": {
                        "id": "root", "classId": "Panel",
                        "childElements": [ { "id": "orphan" } ]
                    }
                }"#,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            UiError::MissingField { ref context, field: "classId" } if context == "orphan"
        ));
        assert_eq!(ui.tree().len(), before);
        assert!(!ui.styles().contains(&Id::new("unused")));

        let err = ui.load_layout_from_str("empty", "{}").unwrap_err();
        assert!(matches!(err, UiError::MissingField { field: "layout", .. }));
        let err = ui
            .load_layout_from_str("noid", r#"{ "layout": { "classId": "Panel" } }"#)
            .unwrap_err();
        assert!(matches!(err, UiError::MissingField { field: "id", .. }));
    }

    #[test]
    fn classless_root_fails_before_anything_is_built() {
        let mut ui = scene(&[]);
        let before = ui.tree().len();
        let err = ui
            .load_layout_from_str("screen", r#"{ "layout": { "id": "root" } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            UiError::MissingField { ref context, field: "classId" } if context == "root"
        ));
        assert_eq!(ui.tree().len(), before);
        assert!(ui.tree().try_find_by_id(&Id::new("root")).is_none());
    }

    #[test]
    fn unknown_child_class_is_rejected_with_its_element() {
        let mut ui = scene(&[]);
        let before = ui.tree().len();
        let err = ui
            .load_layout_from_str(
                "screen",
                r#"{
                    "layout": {
                        "id": "root", "classId": "Panel",
                        "childElements": [ { "id": "ticker", "classId": "Marquee" } ]
                    }
                }"#,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            UiError::UnknownClass { ref context, ref class }
                if context == "ticker" && class == "Marquee"
        ));
        assert_eq!(ui.tree().len(), before);
    }

    #[test]
    fn bad_values_are_reported() {
        let mut ui = scene(&[]);
        let err = ui
            .load_layout_from_str(
                "x",
                r#"{ "layout": { "id": "a", "classId": "Panel", "sizingAnchor": ["left", "nowhere"] } }"#,
            )
            .unwrap_err();
        assert!(matches!(err, UiError::UnknownAnchor(ref a) if a == "nowhere"));
        let err = ui
            .load_layout_from_str("x", r#"{ "layout": { "id": "a", "classId": "Ticker" } }"#)
            .unwrap_err();
        assert!(matches!(err, UiError::UnknownClass { .. }));
    }

    #[test]
    fn includes_merge_in_order_and_are_validated() {
        let mut ui = scene(&[
            ("a.json", r##"{ "definitions": { "#text": "from a", "#other": "a" } }"##),
            ("b.json", r##"{ "definitions": { "#text": "from b" } }"##),
            (
                "main.json",
                r##"{
                    "includes": ["a.json", "b.json"],
                    "layout": { "id": "t", "classId": "StaticText", "text": "#text" }
                }"##,
            ),
            ("self.json", r#"{ "includes": ["SELF.json"], "layout": {} }"#),
            ("nested.json", r#"{ "includes": ["a.json"] }"#),
            ("withlayout.json", r#"{ "layout": {} }"#),
            ("uses_nested.json", r#"{ "includes": ["nested.json"], "layout": {} }"#),
            ("uses_layout.json", r#"{ "includes": ["withlayout.json"], "layout": {} }"#),
        ]);
        let t = ui.load_layout_from_file("main.json").unwrap();
        assert_eq!(ui.widget::<StaticText>(t).unwrap().text(), "from b");
        assert_eq!(ui.definitions().get("#other"), Some(&Value::from("a")));

        for (file, reason) in [
            ("self.json", "a file may not include itself"),
            ("uses_nested.json", "included files may not have includes"),
            ("uses_layout.json", "included files may not have a layout"),
        ] {
            let err = ui.load_layout_from_file(file).unwrap_err();
            assert!(
                matches!(err, UiError::IncludeViolation { reason: r, .. } if r == reason),
                "{file}: {err}"
            );
        }
    }

    const BUTTON_PREFAB: &str = r##"{
        "definitions": { "#caption": "OK" },
        "styles": [ { "classId": "BasicStyle", "id": "prefab_style", "margin": [2, 2, 2, 2] } ],
        "prefab": {
            "classId": "Button", "styleId": "prefab_style", "focusable": true,
            "size": [50, 20],
            "subElements": [ { "id": "caption", "classId": "StaticText", "text": "#caption" } ]
        }
    }"##;

    #[test]
    fn prefabs_instantiate_with_unique_ids() {
        let mut ui = scene(&[("button.json", BUTTON_PREFAB)]);
        let a = ui.add_child_from_prefab(ui.root(), "button.json").unwrap();
        let b = ui.add_child_from_prefab(ui.root(), "button.json").unwrap();
        assert_ne!(ui.tree().id(a), ui.tree().id(b));
        assert_eq!(ui.tree().find_by_id(ui.tree().id(a).unwrap()), Some(a));
        let caption = ui.tree().sub_elements(b)[0];
        assert_eq!(ui.widget::<StaticText>(caption).unwrap().text(), "OK");
        assert!(ui.styles().contains(&Id::new("prefab_style")));

        ui.definitions.set("#button_prefab", Value::from("button.json"));
        assert!(ui.instantiate_prefab("#button_prefab").is_ok());
        assert!(matches!(
            ui.instantiate_prefab("#nothing"),
            Err(UiError::InvalidValue { .. })
        ));
    }

    #[test]
    fn prefab_rules() {
        let mut ui = scene(&[
            ("kids.json", r#"{ "prefab": { "classId": "Panel", "childElements": [] } }"#),
            ("classless.json", r#"{ "prefab": { "size": [1, 1] } }"#),
            ("none.json", r#"{ "styles": [] }"#),
        ]);
        assert!(matches!(
            ui.instantiate_prefab("kids.json"),
            Err(UiError::InvalidValue { .. })
        ));
        assert!(matches!(
            ui.instantiate_prefab("classless.json"),
            Err(UiError::MissingField { field: "classId", .. })
        ));
        assert!(matches!(
            ui.instantiate_prefab("none.json"),
            Err(UiError::MissingField { field: "prefab", .. })
        ));
    }

    #[test]
    fn prefab_refs_are_patched_by_the_element() {
        let mut ui = scene(&[(
            "button.json",
            BUTTON_PREFAB,
        )]);
        let root = ui
            .load_layout_from_str(
                "screen",
                r#"{
                    "styles": [ { "classId": "BasicStyle", "id": "prefab_style" } ],
                    "layout": {
                        "id": "ok", "prefabRef": "button.json", "size": [90, 30]
                    }
                }"#,
            )
            .unwrap();
        assert!(ui.widget::<Button>(root).is_some());
        assert_eq!(ui.tree().size_ref(root), Size::new(90.0, 30.0));
        assert!(ui.tree().is_focusable(root));
        // The layout's own style was already present, so the prefab's is not loaded over it.
        let style = ui.styles().get(&Id::new("prefab_style")).unwrap();
        assert_eq!(style.margin(), Default::default());
    }

    #[test]
    fn inline_styles_and_defaults() {
        let mut ui = scene(&[]);
        let root = ui
            .load_layout_from_str(
                "x",
                r#"{
                    "layout": {
                        "id": "box", "classId": "Panel", "visible": false, "enabled": false,
                        "style": { "classId": "BasicStyle", "padding": [3, 3, 3, 3] },
                        "childElements": [ { "id": "plain", "classId": "Image" } ]
                    }
                }"#,
            )
            .unwrap();
        let style = ui.tree().style(root).unwrap();
        assert_eq!(style.padding().left, 3);
        let flags = ui.tree().flags(root);
        assert!(!flags.contains(ElementFlags::VISIBLE));
        assert!(!flags.contains(ElementFlags::ENABLED));

        let plain = ui.find_by_id("plain").unwrap();
        assert_eq!(ui.tree().style_id(plain).unwrap().as_str(), Style::NULL_STYLE_ID);
        let props = ui.tree().properties(plain).unwrap();
        assert!(props.has_undefined_size());
        assert_eq!(
            props.positioning_anchor,
            Anchor::new(HorizontalAnchor::Left, VerticalAnchor::Top)
        );
    }

    #[test]
    fn post_load_wires_sub_elements() {
        let mut ui = scene(&[]);
        let root = ui
            .load_layout_from_str(
                "x",
                r#"{
                    "layout": {
                        "id": "log", "classId": "ConsoleWindow",
                        "consoleWindow": {
                            "maxConsoleLines": 5,
                            "verticalSliderSubElementId": "scroll",
                            "viewportPanelSubElementId": "view"
                        },
                        "size": [300, 200],
                        "subElements": [
                            { "id": "view", "classId": "Panel", "size": [280, 200] },
                            {
                                "id": "scroll", "classId": "Slider", "size": [20, 20],
                                "slider": { "valueRange": [-1, 0], "sliderType": "discrete" }
                            }
                        ]
                    }
                }"#,
            )
            .unwrap();
        let scroll = ui.tree().sub_elements(root)[1];
        assert!(!ui.tree().flags(scroll).contains(ElementFlags::VISIBLE));
        assert_eq!(ui.tree().size_ref(scroll).height, 200.0);
        assert_eq!(ui.widget::<ConsoleWindow>(root).unwrap().max_lines(), 5);
        ui.with_widget(root, |console: &mut ConsoleWindow, cx| {
            console.append_line_of_text(cx, "one");
            console.append_line_of_text(cx, "two");
        });
        assert_eq!(ui.widget::<Slider>(scroll).unwrap().range(), (-1.0, 0.0));
        assert!(ui.tree().flags(scroll).contains(ElementFlags::VISIBLE));
    }

    #[test]
    fn stack_panel_class_aliases() {
        let mut ui = scene(&[]);
        let root = ui
            .load_layout_from_str(
                "x",
                r#"{ "layout": { "id": "row", "classId": "HorizontalStackPanel",
                     "stackElementPadding": 4 } }"#,
            )
            .unwrap();
        let panel = ui.widget::<StackPanel>(root).unwrap();
        assert!(!panel.orientation().is_vertical());
        assert_eq!(panel.padding(), 4.0);
    }

    #[traced_test]
    #[test]
    fn redefined_styles_warn() {
        let mut ui = scene(&[]);
        let layout = r#"{
            "styles": [ { "classId": "BasicStyle", "id": "shared" } ],
            "layout": { "id": "a", "classId": "Panel" }
        }"#;
        ui.load_layout_from_str("one", layout).unwrap();
        ui.remove_element(ui.find_by_id("a").unwrap());
        ui.load_layout_from_str("two", layout).unwrap();
        assert!(logs_contain("style redefined by a later load"));
    }
}
