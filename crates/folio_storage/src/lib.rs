//! # Folio Storage
//!
//! Storage backend trait and implementations for Folio.
//!
//! This crate provides the lowest-level storage abstraction for the record
//! store. Storage backends are **opaque byte stores** - they do not
//! interpret the data they hold. All record framing (count headers, string
//! prefixes, tick timestamps) lives in the layers above.
//!
//! ## Design Principles
//!
//! - Backends are simple positional byte stores (read, write, append,
//!   truncate)
//! - No knowledge of Folio record layouts or count headers
//! - Must be `Send + Sync`; backends lock internally so callers can share
//!   them behind an `Arc`
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use folio_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
