//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// Wraps a single file opened for reading and writing. Data survives
/// process restarts. The file handle and its cached size live behind one
/// mutex so positional reads, in-place rewrites, and appends never observe
/// each other half-done.
///
/// # Durability
///
/// Writes go to the OS page cache; [`StorageBackend::sync`] calls
/// `File::sync_all()` to push data and metadata to disk. The record store
/// above provides no crash atomicity either way.
///
/// # Example
///
/// ```no_run
/// use folio_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("accounts.db")).unwrap();
/// let offset = backend.append(b"record bytes").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    file: File,
    size: u64,
}

impl FileBackend {
    /// Opens or creates a file backend at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner { file, size }),
        })
    }

    /// Opens or creates a file backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut inner = self.inner.lock();

        let end = offset.saturating_add(len as u64);
        if offset > inner.size || end > inner.size {
            return Err(StorageError::ReadPastEnd {
                offset,
                len,
                size: inner.size,
            });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        inner.file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len];
        inner.file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let mut inner = self.inner.lock();

        if offset > inner.size {
            return Err(StorageError::WritePastEnd {
                offset,
                size: inner.size,
            });
        }

        if data.is_empty() {
            return Ok(());
        }

        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(data)?;

        let end = offset + data.len() as u64;
        if end > inner.size {
            inner.size = end;
        }

        Ok(())
    }

    fn append(&self, data: &[u8]) -> StorageResult<u64> {
        let mut inner = self.inner.lock();

        let offset = inner.size;
        if data.is_empty() {
            return Ok(offset);
        }

        inner.file.seek(SeekFrom::End(0))?;
        inner.file.write_all(data)?;
        inner.size += data.len() as u64;

        Ok(offset)
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.inner.lock().size)
    }

    fn truncate(&self, new_size: u64) -> StorageResult<()> {
        let mut inner = self.inner.lock();

        if new_size > inner.size {
            return Err(StorageError::TruncateBeyondEnd {
                new_size,
                size: inner.size,
            });
        }

        inner.file.set_len(new_size)?;
        inner.size = new_size;

        Ok(())
    }

    fn sync(&self) -> StorageResult<()> {
        let inner = self.inner.lock();
        inner.file.sync_all()?;
        Ok(())
    }
}
