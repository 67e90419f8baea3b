//! Error types for record encoding and decoding.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a record.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input ended before the field was complete.
    #[error("unexpected end of record: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the current field still required.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A string field did not contain valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A length prefix was malformed or unreasonably large.
    #[error("invalid length prefix: {0}")]
    InvalidLength(u64),

    /// A one-byte tag (boolean, enum discriminant, address length) held a
    /// value outside its domain.
    #[error("invalid {field} tag: {value:#04x}")]
    InvalidTag {
        /// Name of the field being decoded.
        field: &'static str,
        /// The offending byte.
        value: u8,
    },

    /// A record carried a format version this build does not understand.
    #[error("unsupported {entity} format version {version}")]
    UnsupportedVersion {
        /// Entity type being decoded.
        entity: &'static str,
        /// The version byte found.
        version: u8,
    },
}
