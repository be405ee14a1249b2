// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by style resolution and style renderers.

use thiserror::Error;

use crate::id::Id;
use crate::renderer::FontHandle;

/// Style-level errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// A style names an ancestor that was never loaded.
    #[error("style `{style}` inherits from unknown style `{ancestor}`")]
    DanglingInheritance {
        /// The style being flattened.
        style: Id,
        /// The missing ancestor.
        ancestor: Id,
    },

    /// A style's inheritance chain loops back on itself.
    #[error("style `{0}` is part of an inheritance cycle")]
    InheritanceCycle(Id),

    /// A style id was looked up but not found.
    #[error("unknown style `{0}`")]
    UnknownStyle(Id),

    /// A font handle not produced by this renderer was used.
    #[error("invalid font handle {0:?}")]
    InvalidFontHandle(FontHandle),
}

/// Result alias for style operations.
pub type Result<T> = core::result::Result<T, StyleError>;
