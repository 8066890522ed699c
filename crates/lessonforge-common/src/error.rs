//! Unified error types for the lessonforge workspace.
//!
//! Every fatal condition of a generation run maps onto one variant here.
//! Non-fatal conditions are not errors; they travel as warnings on the
//! generation report.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest text could not be decoded into a value tree.
    #[error("decode error at line {line}: {message}")]
    Decode {
        /// 1-based line number of the offending line, `0` when unknown.
        line: usize,
        /// Description of the malformed construct.
        message: String,
    },

    /// The manifest file does not exist.
    #[error("manifest not found: {}", path.display())]
    MissingManifest {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The manifest decoded but lacks something generation needs.
    #[error("invalid manifest: {message}")]
    InvalidManifest {
        /// Description of the structural problem.
        message: String,
    },

    /// Orchestration units could not be composed into one aggregate file.
    #[error("aggregate compose construction failed: {message}")]
    AggregateConstruction {
        /// Description of the conflict.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl ForgeError {
    /// Builds an [`ForgeError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds an [`ForgeError::InvalidManifest`] from a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ForgeError>;
