//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// Stores all bytes in a locked `Vec<u8>`. Suitable for unit tests and
/// ephemeral stores that don't need persistence.
///
/// # Example
///
/// ```rust
/// use folio_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// let offset = backend.append(b"test data").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    ///
    /// Useful for testing load and migration scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all data in the backend.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;

        let offset_usize = offset as usize;
        let end = offset_usize.saturating_add(len);
        if offset > size || end as u64 > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[offset_usize..end].to_vec())
    }

    fn write_at(&self, offset: u64, bytes: &[u8]) -> StorageResult<()> {
        let mut data = self.data.write();
        let size = data.len() as u64;

        if offset > size {
            return Err(StorageError::WritePastEnd { offset, size });
        }

        let offset = offset as usize;
        let end = offset + bytes.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[offset..end].copy_from_slice(bytes);

        Ok(())
    }

    fn append(&self, bytes: &[u8]) -> StorageResult<u64> {
        let mut data = self.data.write();
        let offset = data.len() as u64;
        data.extend_from_slice(bytes);
        Ok(offset)
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }

    fn truncate(&self, new_size: u64) -> StorageResult<()> {
        let mut data = self.data.write();
        let size = data.len() as u64;

        if new_size > size {
            return Err(StorageError::TruncateBeyondEnd { new_size, size });
        }

        data.truncate(new_size as usize);
        Ok(())
    }

    fn sync(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_append_and_read() {
        let backend = InMemoryBackend::new();

        let offset = backend.append(b"hello").unwrap();
        assert_eq!(offset, 0);
        backend.append(b" world").unwrap();

        assert_eq!(&backend.read_at(0, 11).unwrap(), b"hello world");
    }

    #[test]
    fn memory_overwrite_and_extend() {
        let backend = InMemoryBackend::new();
        backend.append(b"hello world").unwrap();

        backend.write_at(0, b"HELLO").unwrap();
        assert_eq!(&backend.read_at(0, 11).unwrap(), b"HELLO world");

        backend.write_at(6, b"everyone").unwrap();
        assert_eq!(backend.size().unwrap(), 14);
        assert_eq!(&backend.read_at(0, 14).unwrap(), b"HELLO everyone");
    }

    #[test]
    fn memory_write_past_end_fails() {
        let backend = InMemoryBackend::new();
        backend.append(b"xy").unwrap();

        assert!(matches!(
            backend.write_at(3, b"z"),
            Err(StorageError::WritePastEnd { .. })
        ));
    }

    #[test]
    fn memory_read_past_end_fails() {
        let backend = InMemoryBackend::new();
        backend.append(b"abc").unwrap();

        assert!(matches!(
            backend.read_at(2, 5),
            Err(StorageError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn memory_truncate() {
        let backend = InMemoryBackend::new();
        backend.append(b"hello world").unwrap();

        backend.truncate(5).unwrap();
        assert_eq!(backend.size().unwrap(), 5);
        assert_eq!(backend.data(), b"hello");

        assert!(matches!(
            backend.truncate(6),
            Err(StorageError::TruncateBeyondEnd { .. })
        ));
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        assert_eq!(backend.size().unwrap(), 3);
        assert_eq!(backend.read_at(1, 2).unwrap(), vec![2, 3]);
    }

    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Append(Vec<u8>),
        WriteAt(u64, Vec<u8>),
        Truncate(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            proptest::collection::vec(any::<u8>(), 0..32).prop_map(Op::Append),
            (0u64..256, proptest::collection::vec(any::<u8>(), 0..32))
                .prop_map(|(o, b)| Op::WriteAt(o, b)),
            (0u64..256).prop_map(Op::Truncate),
        ]
    }

    proptest! {
        /// The backend behaves like a plain byte vector: a write is
        /// accepted exactly when the model accepts it, and the stored
        /// bytes always equal the model afterward.
        #[test]
        fn backend_matches_byte_vector_model(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let backend = InMemoryBackend::new();
            let mut model: Vec<u8> = Vec::new();

            for op in ops {
                match op {
                    Op::Append(bytes) => {
                        let offset = backend.append(&bytes).unwrap();
                        prop_assert_eq!(offset, model.len() as u64);
                        model.extend_from_slice(&bytes);
                    }
                    Op::WriteAt(offset, bytes) => {
                        let result = backend.write_at(offset, &bytes);
                        if offset as usize <= model.len() {
                            result.unwrap();
                            let end = offset as usize + bytes.len();
                            if end > model.len() {
                                model.resize(end, 0);
                            }
                            model[offset as usize..end].copy_from_slice(&bytes);
                        } else {
                            prop_assert!(
                                matches!(result, Err(StorageError::WritePastEnd { .. })),
                                "expected WritePastEnd, got {:?}",
                                result
                            );
                        }
                    }
                    Op::Truncate(new_size) => {
                        let result = backend.truncate(new_size);
                        if new_size as usize <= model.len() {
                            result.unwrap();
                            model.truncate(new_size as usize);
                        } else {
                            prop_assert!(
                                matches!(result, Err(StorageError::TruncateBeyondEnd { .. })),
                                "expected TruncateBeyondEnd, got {:?}",
                                result
                            );
                        }
                    }
                }
                prop_assert_eq!(backend.size().unwrap(), model.len() as u64);
                prop_assert_eq!(backend.data(), model.clone());
            }
        }
    }
}
