// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data sources and the JSON data model.
//!
//! ## Overview
//!
//! Layouts, prefabs and styles are JSON documents read through a [`DataSource`]. The loader
//! never touches the file system directly, so scenes can be built from embedded data or a
//! [`MemoryDataSource`] in tests.
//!
//! - [`DataObject`]: typed field access over a JSON object with descriptive errors.
//! - [`DataDefinitions`]: `#name` substitutions and literal CSS colors.
//! - [`merge_patch`]: RFC 7386 merge patch, used for includes, prefabs and schema promotion.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::{Result, UiError};

mod definitions;
mod object;
mod patch;
mod styles;

pub use definitions::DataDefinitions;
pub use object::DataObject;
pub use patch::{merge_patch, promote_class_fields};
pub use styles::style_from_data;

/// Read-only access to data files by path.
pub trait DataSource {
    /// Read a whole file as text.
    fn read_to_string(&self, path: &str) -> Result<String>;
}

/// Reads files from disk, resolving relative paths against a root directory.
#[derive(Clone, Debug, Default)]
pub struct FsDataSource {
    root: PathBuf,
}

impl FsDataSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataSource for FsDataSource {
    fn read_to_string(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        std::fs::read_to_string(&full).map_err(|source| UiError::Io {
            path: full.display().to_string(),
            source,
        })
    }
}

/// In-memory files keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryDataSource {
    files: HashMap<String, String>,
}

impl MemoryDataSource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }

    /// Add a file (builder style).
    pub fn with_file(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl DataSource for MemoryDataSource {
    fn read_to_string(&self, path: &str) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| UiError::Io {
            path: path.to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

/// Parse JSON text, naming `path` in the error.
pub fn parse_json(path: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|source| UiError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Read and parse a JSON file from `source`.
pub fn load_json(source: &dyn DataSource, path: &str) -> Result<Value> {
    let text = source.read_to_string(path)?;
    parse_json(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reads_and_misses() {
        let src = MemoryDataSource::new().with_file("a.json", r#"{ "x": 1 }"#);
        assert_eq!(load_json(&src, "a.json").unwrap()["x"], 1);
        assert!(matches!(
            load_json(&src, "b.json"),
            Err(UiError::Io { path, .. }) if path == "b.json"
        ));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let src = MemoryDataSource::new().with_file("bad.json", "{ nope");
        let err = load_json(&src, "bad.json").unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn fs_source_reports_missing_files() {
        let src = FsDataSource::new("definitely/not/a/dir");
        assert!(matches!(
            src.read_to_string("layout.json"),
            Err(UiError::Io { .. })
        ));
    }
}
