// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for data loading and scene construction.

use understory_style::StyleError;

/// Errors raised while loading layouts, prefabs, styles and configuration.
///
/// These are configuration errors: the offending document is rejected and no partial tree is
/// left behind.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    /// A required field is absent.
    #[error("{context}: missing required field `{field}`")]
    MissingField {
        /// Where the field was expected (file or element id).
        context: String,
        /// Name of the field.
        field: &'static str,
    },
    /// No widget or style kind is registered for a class id.
    #[error("{context}: unknown class `{class}`")]
    UnknownClass {
        /// Where the class was named.
        context: String,
        /// The class id as written.
        class: String,
    },
    /// A string field holds a value outside its enumeration.
    #[error("unknown value `{value}` for field `{field}`")]
    UnknownEnumValue {
        /// Name of the field.
        field: &'static str,
        /// The value as written.
        value: String,
    },
    /// An anchor name is neither a horizontal nor a vertical anchor.
    #[error("unknown anchor `{0}`")]
    UnknownAnchor(String),
    /// A field has the wrong shape or type.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field.
        field: String,
        /// What was wrong.
        reason: String,
    },
    /// An include file breaks the include rules.
    #[error("include `{path}` rejected: {reason}")]
    IncludeViolation {
        /// The include path.
        path: String,
        /// Which rule was broken.
        reason: &'static str,
    },
    /// A data file is not valid JSON.
    #[error("`{path}` is not valid JSON: {source}")]
    Json {
        /// The file path or context.
        path: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// A data file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// The file path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Style resolution failed.
    #[error(transparent)]
    Style(#[from] StyleError),
}

impl UiError {
    pub(crate) fn missing(context: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            context: context.into(),
            field,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = core::result::Result<T, UiError>;
