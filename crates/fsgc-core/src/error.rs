//! Error and warning types for collection runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while configuring or running a collection.
#[derive(Debug, Error)]
pub enum GcError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A policy file exists but cannot be used.
    #[error("Invalid policy {path}: {message}")]
    InvalidPolicy { path: PathBuf, message: String },
}

impl GcError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid policy error.
    pub fn policy(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::InvalidPolicy {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error means the path is simply gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Kind of collection warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Error reading a directory; its subtree was skipped.
    ReadError,
    /// Error reading metadata for an entry.
    MetadataError,
    /// Policy file could not be read or parsed.
    PolicyError,
    /// A TTL marker carried an unusable value.
    TtlValueError,
    /// Removing an entry failed.
    DeleteError,
}

/// Non-fatal problem encountered during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl GcWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self::new(path, format!("Read error: {error}"), WarningKind::ReadError)
    }

    /// Create a policy warning from the error that invalidated the policy.
    pub fn policy(path: impl Into<PathBuf>, error: &GcError) -> Self {
        Self::new(path, error.to_string(), WarningKind::PolicyError)
    }

    /// Create a deletion failure warning.
    pub fn delete_failed(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Cannot delete {}: {error}", path.display()),
            path,
            kind: WarningKind::DeleteError,
        }
    }
}
