// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The style sheet: every loaded style by id, and inheritance flattening.
//!
//! ## Usage
//!
//! ```
//! use understory_style::{BaseStyleProps, Color, Edges, Style, StyleKind, StyleSheet};
//!
//! let mut sheet = StyleSheet::new();
//! sheet.add_style(Style::new("a", StyleKind::Basic).with_base(BaseStyleProps {
//!     margin: Some(Edges::uniform(1)),
//!     ..Default::default()
//! }));
//! sheet.add_style(
//!     Style::new("b", StyleKind::Basic)
//!         .with_inherits_from("a")
//!         .with_base(BaseStyleProps { color: Some(Color::RED), ..Default::default() }),
//! );
//! sheet.flatten_all().unwrap();
//!
//! let b = sheet.get(&"b".into()).unwrap();
//! assert_eq!(b.margin(), Edges::uniform(1));
//! assert_eq!(b.color(), Color::RED);
//! assert!(b.inherits_from().is_empty());
//! ```
//!
//! Flattening may run in any order: [`StyleSheet::flatten`] flattens a style's ancestor first.
//! Styles are shared with elements as `Rc<Style>`, so flatten before binding styles to elements.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::{Result, StyleError};
use crate::id::Id;
use crate::style::Style;

/// Styles by id. See the [module docs](self).
///
/// Cloning is cheap: styles are shared, not copied.
#[derive(Clone, Debug)]
pub struct StyleSheet {
    styles: HashMap<Id, Rc<Style>>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheet {
    /// Create a sheet holding only the null style.
    pub fn new() -> Self {
        let mut styles = HashMap::new();
        let null = Style::null();
        styles.insert(null.id().clone(), Rc::new(null));
        Self { styles }
    }

    /// Number of styles, including the null style.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Returns true if only the null style is present.
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Add a style. A duplicate id replaces the earlier style.
    pub fn add_style(&mut self, style: Style) {
        let id = style.id().clone();
        debug_assert!(
            !self.styles.contains_key(&id) || id.as_str() == Style::NULL_STYLE_ID,
            "duplicate style id `{id}`"
        );
        if self.styles.contains_key(&id) {
            tracing::warn!(style = %id, "replacing style with duplicate id");
        }
        self.styles.insert(id, Rc::new(style));
    }

    /// Add a style, replacing any style with the same id. Returns the replaced style.
    ///
    /// Used when reloading data that is expected to redefine styles.
    pub fn replace_style(&mut self, style: Style) -> Option<Rc<Style>> {
        let id = style.id().clone();
        self.styles.insert(id, Rc::new(style))
    }

    /// Look up a style.
    pub fn get(&self, id: &Id) -> Option<Rc<Style>> {
        self.styles.get(id).cloned()
    }

    /// Returns true if a style with `id` exists.
    pub fn contains(&self, id: &Id) -> bool {
        self.styles.contains_key(id)
    }

    /// Ids of every style, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &Id> + '_ {
        self.styles.keys()
    }

    /// Remove every style except the null style.
    pub fn clear(&mut self) {
        self.styles.retain(|id, _| id.as_str() == Style::NULL_STYLE_ID);
    }

    /// Flatten one style (and, first, its ancestors).
    ///
    /// Flattening an already flat style is a no-op.
    pub fn flatten(&mut self, id: &Id) -> Result<()> {
        let mut visiting = HashSet::new();
        self.flatten_inner(id, &mut visiting)
    }

    fn flatten_inner(&mut self, id: &Id, visiting: &mut HashSet<Id>) -> Result<()> {
        let style = self
            .styles
            .get(id)
            .cloned()
            .ok_or_else(|| StyleError::UnknownStyle(id.clone()))?;
        let ancestor_id = style.inherits_from().clone();
        if ancestor_id.is_empty() {
            return Ok(());
        }
        if !visiting.insert(id.clone()) {
            return Err(StyleError::InheritanceCycle(id.clone()));
        }
        if !self.styles.contains_key(&ancestor_id) {
            return Err(StyleError::DanglingInheritance {
                style: id.clone(),
                ancestor: ancestor_id,
            });
        }
        self.flatten_inner(&ancestor_id, visiting)?;

        let ancestor = self
            .styles
            .get(&ancestor_id)
            .cloned()
            .ok_or_else(|| StyleError::UnknownStyle(ancestor_id.clone()))?;
        let mut flat = Style::clone(&style);
        flat.inherit_from(&ancestor);
        tracing::trace!(style = %id, ancestor = %ancestor_id, "flattened style");
        self.styles.insert(id.clone(), Rc::new(flat));
        visiting.remove(id);
        Ok(())
    }

    /// Flatten every style.
    pub fn flatten_all(&mut self) -> Result<()> {
        let ids: Vec<Id> = self.styles.keys().cloned().collect();
        for id in &ids {
            self.flatten(id)?;
        }
        tracing::debug!(count = ids.len(), "flattened all styles");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BaseStyleProps, ColorUsage, StyleKind};
    use crate::types::{Color, Edges};

    #[test]
    fn null_style_is_preregistered() {
        let sheet = StyleSheet::new();
        assert!(sheet.contains(&Id::new("NullStyle")));
        assert!(sheet.is_empty());
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn flatten_all_resolves_chains_in_any_order() {
        let mut sheet = StyleSheet::new();
        // Added child-first so the grandchild flattens before its ancestors.
        sheet.add_style(Style::new("c", StyleKind::Basic).with_inherits_from("b"));
        sheet.add_style(
            Style::new("b", StyleKind::Basic)
                .with_inherits_from("a")
                .with_base(BaseStyleProps {
                    color: Some(Color::RED),
                    ..Default::default()
                }),
        );
        sheet.add_style(Style::new("a", StyleKind::Basic).with_base(BaseStyleProps {
            margin: Some(Edges::uniform(1)),
            color_usage: Some(ColorUsage::UseExisting),
            ..Default::default()
        }));
        sheet.flatten_all().unwrap();

        let b = sheet.get(&Id::new("b")).unwrap();
        assert_eq!(b.margin(), Edges::uniform(1));
        assert_eq!(b.color(), Color::RED);
        assert!(b.inherits_from().is_empty());

        let c = sheet.get(&Id::new("c")).unwrap();
        assert_eq!(c.margin(), Edges::uniform(1));
        assert_eq!(c.color(), Color::RED);
    }

    #[test]
    fn flatten_is_idempotent() {
        let mut sheet = StyleSheet::new();
        sheet.add_style(Style::new("a", StyleKind::Basic));
        sheet.add_style(Style::new("b", StyleKind::Basic).with_inherits_from("a"));
        sheet.flatten(&Id::new("b")).unwrap();
        let first = sheet.get(&Id::new("b")).unwrap();
        sheet.flatten(&Id::new("b")).unwrap();
        let second = sheet.get(&Id::new("b")).unwrap();
        assert!(Rc::ptr_eq(&first, &second), "flat styles are left alone");
    }

    #[test]
    fn dangling_ancestor_is_an_error() {
        let mut sheet = StyleSheet::new();
        sheet.add_style(Style::new("b", StyleKind::Basic).with_inherits_from("missing"));
        assert_eq!(
            sheet.flatten_all(),
            Err(StyleError::DanglingInheritance {
                style: Id::new("b"),
                ancestor: Id::new("missing"),
            })
        );
    }

    #[test]
    fn cycles_are_detected() {
        let mut sheet = StyleSheet::new();
        sheet.add_style(Style::new("a", StyleKind::Basic).with_inherits_from("b"));
        sheet.add_style(Style::new("b", StyleKind::Basic).with_inherits_from("a"));
        assert!(matches!(
            sheet.flatten(&Id::new("a")),
            Err(StyleError::InheritanceCycle(_))
        ));
    }

    #[test]
    fn clear_keeps_null_style() {
        let mut sheet = StyleSheet::new();
        sheet.add_style(Style::new("a", StyleKind::Basic));
        sheet.clear();
        assert_eq!(sheet.len(), 1);
        assert!(sheet.contains(&Id::new(Style::NULL_STYLE_ID)));
    }
}
