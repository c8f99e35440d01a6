//! Error types for git operations.
//!
//! [`GitError`] is the single error type returned by all [`GitRepo`](crate::GitRepo)
//! methods. The replay engine treats every variant as integrity-fatal: a blob,
//! tree, commit, or ref that could not be written ends the run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`GitRepo`](crate::GitRepo) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// A requested object, ref, or path was not found.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description of what was missing.
        message: String,
    },

    /// A repository could not be created or opened at the given path.
    #[error("cannot open repository at {}: {message}", path.display())]
    OpenFailed {
        /// Path that was passed to open or init.
        path: PathBuf,
        /// Details from the backend.
        message: String,
    },

    /// A ref name was rejected by the backend.
    #[error("invalid ref name `{value}`: {reason}")]
    InvalidRef {
        /// The raw ref name.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An I/O error occurred (file system, checkout, etc.).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The underlying git backend returned an unclassified error.
    ///
    /// The `message` should include enough context to diagnose the failure.
    #[error("git backend error: {message}")]
    BackendError {
        /// Freeform error description from the backend.
        message: String,
    },
}
