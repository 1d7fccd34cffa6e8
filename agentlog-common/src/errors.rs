//! Error types for the reconciliation engine.
//!
//! Two severities exist:
//!
//! | Type | Scope | Handling |
//! |------|-------|----------|
//! | [`ReconcileError`] | Whole run | Propagated to the caller, aborts the run |
//! | [`DocumentError`] | One settings step | Reported as a failed step, run continues |

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem and environment failures that abort a run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The home directory could not be determined.
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Reading a file failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating a directory tree failed.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing a file failed.
    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings document could not be serialized.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Problems loading the settings document. Fatal to the settings step only.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file exists but could not be read.
    #[error("Could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Malformed JSON in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is valid JSON but not shaped like a settings document.
    #[error("Unexpected structure in {path}: {what} is not a JSON {expected}")]
    Shape {
        path: PathBuf,
        what: String,
        expected: &'static str,
    },
}
