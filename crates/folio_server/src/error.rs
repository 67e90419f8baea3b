//! Server error types.

use folio_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Domain-layer failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Socket or file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be parsed.
    #[error("malformed request: {0}")]
    BadRequest(String),

    /// A required query or form parameter is absent.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
}

impl ServerError {
    /// Builds a [`ServerError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
