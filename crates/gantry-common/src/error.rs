//! Unified error types for the gantry workspace.
//!
//! Lowering itself never fails; every variant here belongs either to the
//! loading collaborators (I/O, descriptor, interpolation) or to the two
//! abort paths of generation (render and format), plus identifier collisions.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum GantryError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A deployment descriptor could not be decoded.
    #[error("invalid descriptor {path}: {message}")]
    Descriptor {
        /// Descriptor file, or `<merged>` once several files were combined.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// Variable interpolation failed (missing required variable or bad syntax).
    #[error("interpolation error: {message}")]
    Interpolation {
        /// Description of the failure.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The expression tree could not be serialized into source text.
    #[error("render error: {message}")]
    Render {
        /// Description of the structural problem.
        message: String,
    },

    /// The final canonicalize pass rejected the rendered source.
    #[error("format error: {message}")]
    Format {
        /// Description of the formatting failure.
        message: String,
    },

    /// Two entity names resolve to the same generated identifier.
    #[error("services \"{first}\" and \"{second}\" both resolve to identifier {identifier}")]
    NameCollision {
        /// The shared identifier.
        identifier: String,
        /// First entity name (in sorted order).
        first: String,
        /// Second entity name.
        second: String,
    },
}

impl GantryError {
    /// Builds a [`GantryError::Render`] from any displayable message.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Builds a [`GantryError::Format`] from any displayable message.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, GantryError>;
