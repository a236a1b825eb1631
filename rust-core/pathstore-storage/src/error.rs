// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Storage error types for the PathStore backend abstraction.
//
// A single error enum is shared by every backend and by the migrator. Errors
// pick up context as they propagate (`StorageError::context`), so callers
// classify them with the `is_*` predicates, which look through any number of
// context layers, rather than by matching on a concrete variant.

use thiserror::Error;

/// Convenience alias used throughout the storage crates.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur when interacting with a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key failed syntactic validation (empty, `/`, or containing `//`).
    #[error("invalid key: {key:?}")]
    InvalidKey {
        /// The key as supplied by the caller.
        key: String,
    },

    /// The requested key was not found.
    #[error("key not found: {0}")]
    NotFound(String),

    /// A backend or the migrator was constructed with unusable configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// An I/O error occurred in the underlying storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data is corrupted or in an unexpected format.
    #[error("corrupted data: {0}")]
    CorruptedData(String),

    /// The storage backend is not available (e.g., connection lost).
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Another error annotated with where it happened.
    #[error("{context}: {source}")]
    Context {
        /// Human-readable description of the failing step.
        context: String,
        /// The wrapped error.
        #[source]
        source: Box<StorageError>,
    },
}

impl StorageError {
    /// Build an [`StorageError::InvalidKey`] for `key`.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        StorageError::InvalidKey { key: key.into() }
    }

    /// Wrap this error with a description of the step that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        StorageError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every context layer peeled off.
    pub fn root_cause(&self) -> &StorageError {
        let mut err = self;
        while let StorageError::Context { source, .. } = err {
            err = source;
        }
        err
    }

    /// True if the underlying cause is an invalid key.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self.root_cause(), StorageError::InvalidKey { .. })
    }

    /// True if the underlying cause is a missing key.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), StorageError::NotFound(_))
    }

    /// True if the underlying cause is unusable configuration.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self.root_cause(), StorageError::InvalidConfig(_))
    }

    /// True if the underlying cause is cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root_cause(), StorageError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_display() {
        let err = StorageError::invalid_key("a//b");
        assert_eq!(err.to_string(), "invalid key: \"a//b\"");
        assert!(err.is_invalid_key());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_display() {
        let err = StorageError::NotFound("/my-key".to_string());
        assert_eq!(err.to_string(), "key not found: /my-key");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file gone");
        let err = StorageError::Io(io_err);
        assert!(err.to_string().contains("I/O error"));
        // An I/O "not found" is not a missing key.
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_context_display_and_predicates() {
        let err = StorageError::NotFound("/a".to_string())
            .context("src storage: getting key=/a")
            .context("migration");
        assert_eq!(
            err.to_string(),
            "migration: src storage: getting key=/a: key not found: /a"
        );
        assert!(err.is_not_found());
        assert!(!err.is_invalid_key());
        assert!(matches!(err.root_cause(), StorageError::NotFound(k) if k == "/a"));
    }

    #[test]
    fn test_context_exposes_source() {
        use std::error::Error as _;

        let err = StorageError::invalid_key("").context("putting");
        let source = err.source().expect("context has a source");
        assert_eq!(source.to_string(), "invalid key: \"\"");
    }

    #[test]
    fn test_config_and_cancel_predicates() {
        assert!(StorageError::InvalidConfig("marker".into())
            .context("new migrator")
            .is_invalid_config());
        assert!(StorageError::Cancelled.context("list").is_cancelled());
        assert!(!StorageError::BackendUnavailable("down".into()).is_cancelled());
    }
}
