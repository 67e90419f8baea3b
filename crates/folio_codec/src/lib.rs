//! # Folio Codec
//!
//! The fixed binary record layout shared by every persisted Folio entity.
//!
//! ## Layout rules
//!
//! - All multi-byte integers are little-endian
//! - Strings are LEB128 length-prefixed UTF-8
//! - Booleans are one byte, strictly `0` or `1`
//! - Identifiers are 16 raw bytes
//! - Timestamps are [`Ticks`]: signed 64-bit counts of 100-nanosecond
//!   intervals since the Unix epoch
//!
//! Records carry no trailing length or checksum; a record's byte length is
//! whatever a sequential decode consumes. [`RecordReader::position`] is how
//! the record store derives offsets and sizes while scanning a file.
//!
//! ## Usage
//!
//! ```
//! use folio_codec::{RecordReader, RecordWriter};
//!
//! let mut writer = RecordWriter::new();
//! writer.put_string("alice1234");
//! writer.put_bool(true);
//! let bytes = writer.into_bytes();
//!
//! let mut reader = RecordReader::new(&bytes);
//! assert_eq!(reader.get_string().unwrap(), "alice1234");
//! assert!(reader.get_bool().unwrap());
//! assert!(reader.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod reader;
mod ticks;
mod writer;

pub use error::{CodecError, CodecResult};
pub use reader::RecordReader;
pub use ticks::{Ticks, TICKS_PER_DAY, TICKS_PER_SECOND};
pub use writer::RecordWriter;
