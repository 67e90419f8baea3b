//! Error types for Folio core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Folio core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] folio_storage::StorageError),

    /// Record codec error.
    #[error("codec error: {0}")]
    Codec(#[from] folio_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Entity kind ("account", "article", ...).
        kind: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// A key is already taken within its store.
    #[error("duplicate key: {key}")]
    DuplicateKey {
        /// The colliding key.
        key: String,
    },

    /// A data file violates a store invariant.
    #[error("store corrupted: {message}")]
    Corrupted {
        /// Description of the violation.
        message: String,
    },

    /// The operation is not valid in the entity's current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// The account already has a live session.
    #[error("{account} is already logged in")]
    AlreadyLoggedIn {
        /// The account with the live session.
        account: String,
    },

    /// The actor lacks the privilege for the operation, or the operation is
    /// a conflict of interest.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Description of the denial.
        message: String,
    },

    /// Another process holds the data directory lock.
    #[error("data directory locked: another process has exclusive access")]
    DirectoryLocked,
}

impl CoreError {
    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }
}
