// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Case-insensitive identifiers.

use std::fmt;
use std::sync::Arc;

/// A case-insensitive identifier used for element ids, style ids, and class ids.
///
/// The text is folded to lowercase on construction, so equality, ordering and
/// hashing all operate on the normalized form. An empty `Id` means "unset".
///
/// Cloning is cheap: the normalized text is shared.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(Arc<str>);

impl Id {
    /// Create an identifier from any string, folding it to lowercase.
    pub fn new(text: &str) -> Self {
        Self(Arc::from(text.to_lowercase()))
    }

    /// Create a process-unique identifier, optionally prefixed.
    ///
    /// Used for anonymously instantiated elements and inline styles.
    pub fn create_uuid(prefix: Option<&str>) -> Self {
        let uuid = uuid::Uuid::new_v4();
        match prefix {
            Some(prefix) => Self::new(&format!("{prefix}{uuid}")),
            None => Self::new(&uuid.to_string()),
        }
    }

    /// The normalized (lowercase) text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this identifier is empty ("unset").
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if this identifier is non-empty.
    pub fn is_set(&self) -> bool {
        !self.0.is_empty()
    }
}

impl Default for Id {
    fn default() -> Self {
        Self(Arc::from(""))
    }
}

impl From<&str> for Id {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Id {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl From<&String> for Id {
    fn from(text: &String) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_case_insensitively() {
        let a = Id::new("MainMenu");
        let b = Id::from("mainmenu");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "mainmenu");
        assert_eq!(a.cmp(&b), core::cmp::Ordering::Equal);
    }

    #[test]
    fn empty_id_is_unset() {
        assert!(Id::default().is_empty());
        assert!(!Id::default().is_set());
        assert!(Id::new("x").is_set());
    }

    #[test]
    fn uuids_are_unique_and_prefixed() {
        let a = Id::create_uuid(Some("Style_"));
        let b = Id::create_uuid(Some("Style_"));
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("style_"));
        assert!(Id::create_uuid(None).is_set());
    }
}
