// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene configuration.

use std::path::PathBuf;

use kurbo::Size;
use serde::Deserialize;

use crate::error::{Result, UiError};

/// Configuration for a [`UiManager`](crate::UiManager).
///
/// Every field has a default, so a JSON document only needs the fields it changes:
///
/// ```
/// use understory_uitk::UiConfig;
///
/// let config = UiConfig::from_json(r#"{ "reference_height": 720 }"#).unwrap();
/// assert_eq!(config.reference_width, 1920);
/// assert_eq!(config.reference_height, 720);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Width of the reference resolution that layouts are authored against.
    pub reference_width: u32,
    /// Height of the reference resolution.
    pub reference_height: u32,
    /// Prefix for relative data file paths.
    pub data_root: PathBuf,
    /// Reference-to-pixel scales below this make the scene empty.
    pub scale_epsilon: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            reference_width: 1920,
            reference_height: 1080,
            data_root: PathBuf::new(),
            scale_epsilon: 1e-4,
        }
    }
}

impl UiConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| UiError::Json {
            path: "config".into(),
            source,
        })
    }

    /// Set the reference resolution.
    pub fn with_reference_size(mut self, width: u32, height: u32) -> Self {
        self.reference_width = width;
        self.reference_height = height;
        self
    }

    /// Set the data root.
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    /// Set the scale epsilon.
    pub fn with_scale_epsilon(mut self, epsilon: f64) -> Self {
        self.scale_epsilon = epsilon;
        self
    }

    /// The reference resolution as a size.
    pub fn reference_size(&self) -> Size {
        Size::new(
            f64::from(self.reference_width),
            f64::from(self.reference_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = UiConfig::default();
        assert_eq!(c.reference_size(), Size::new(1920.0, 1080.0));
        assert_eq!(c.scale_epsilon, 1e-4);
        assert!(c.data_root.as_os_str().is_empty());
    }

    #[test]
    fn builders_and_json() {
        let c = UiConfig::new()
            .with_reference_size(1280, 720)
            .with_data_root("assets");
        assert_eq!(c.reference_size(), Size::new(1280.0, 720.0));
        assert_eq!(c.data_root, PathBuf::from("assets"));

        let c = UiConfig::from_json(r#"{ "data_root": "ui", "scale_epsilon": 0.5 }"#).unwrap();
        assert_eq!(c.data_root, PathBuf::from("ui"));
        assert_eq!(c.scale_epsilon, 0.5);
        assert!(UiConfig::from_json("[").is_err());
    }
}
