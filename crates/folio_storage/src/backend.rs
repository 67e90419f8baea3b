//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for Folio record files.
///
/// Storage backends are **opaque byte stores**. They provide positional
/// reads and writes, appends, and truncation. Folio owns all file format
/// interpretation - backends do not understand records, count headers, or
/// entities.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `write_at` may extend the store when the write reaches past the end
/// - Backends must be `Send + Sync`; they lock internally, so all methods
///   take `&self`
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::ReadPastEnd`] if the requested range
    /// extends beyond the current size, or an I/O error.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Writes `data` starting at `offset`, overwriting existing bytes.
    ///
    /// Writing at or past the current end extends the store. Offsets beyond
    /// the end are not valid: `offset` must be at most the current size, so
    /// the store never contains holes.
    ///
    /// # Errors
    ///
    /// Returns an error if `offset` is greater than the current size or an
    /// I/O error occurs.
    fn write_at(&self, offset: u64, data: &[u8]) -> StorageResult<()>;

    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&self, data: &[u8]) -> StorageResult<u64>;

    /// Returns the current size of the storage in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Truncates the storage to the given size.
    ///
    /// Used by the record store after a shrinking in-place rewrite and by
    /// compaction.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_size` is greater than the current size or
    /// the truncation fails.
    fn truncate(&self, new_size: u64) -> StorageResult<()>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> StorageResult<()>;
}
