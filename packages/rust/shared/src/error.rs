//! Error types for taxsync.
//!
//! Library crates use [`TaxSyncError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all taxsync operations.
#[derive(Debug, thiserror::Error)]
pub enum TaxSyncError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the term store.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success response from the term store (e.g. taxonomy locked by
    /// another editor). Fatal for the current node and its unvisited subtree.
    #[error("store error (HTTP {status}): {message}")]
    Store { status: u16, message: String },

    /// Response body or header could not be interpreted.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A duplicate-sibling conflict could not be resolved to an existing id.
    #[error("cannot resolve duplicate term \"{term}\": {message}")]
    DuplicateUnresolved { term: String, message: String },

    /// Attaching leaf data to a term that has no remote id yet is a contract
    /// violation on the caller's part.
    #[error("cannot attach data to term \"{term}\" without its id")]
    MissingTermId { term: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TaxSyncError>;

impl TaxSyncError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a store error from an HTTP status and message.
    pub fn store(status: u16, msg: impl Into<String>) -> Self {
        Self::Store {
            status,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TaxSyncError::config("missing API root");
        assert_eq!(err.to_string(), "config error: missing API root");

        let err = TaxSyncError::store(500, "Taxonomy is locked by another user: jdoe");
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.to_string().contains("locked"));

        let err = TaxSyncError::MissingTermId {
            term: "ARCHT-100-01".into(),
        };
        assert!(err.to_string().contains("ARCHT-100-01"));
    }
}
