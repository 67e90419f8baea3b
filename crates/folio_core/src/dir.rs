//! Service data directory management.
//!
//! File system layout:
//!
//! ```text
//! <root>/
//! ├─ LOCK              # Advisory lock for single-process access
//! ├─ accounts.db       # Account records
//! ├─ accounts.size     # Account count header
//! ├─ articles/         # One file per article, named by id
//! ├─ comments/         # One file per discussion, `<article-id>.dat`
//! ├─ users/            # `<account>/notifs/<id>` notification files
//! ├─ logs/             # `events_YYYY-MM-DD.dat` audit logs
//! └─ static/           # Files served at the site root
//! ```
//!
//! The LOCK file keeps two service processes from mutating the same data
//! directory at once.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const STATIC_DIR: &str = "static";

/// Holds the root path and the exclusive directory lock.
///
/// Only one `ServiceDir` instance can exist per directory at a time; the
/// lock releases when the instance drops.
#[derive(Debug)]
pub struct ServiceDir {
    path: PathBuf,
    _lock_file: File,
}

impl ServiceDir {
    /// Opens or creates a service data directory, taking the lock.
    ///
    /// # Errors
    ///
    /// [`CoreError::DirectoryLocked`] when another process holds the
    /// lock.
    pub fn open(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(CoreError::invalid_operation(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(CoreError::DirectoryLocked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// The root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory served at the site root.
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.path.join(STATIC_DIR)
    }
}
