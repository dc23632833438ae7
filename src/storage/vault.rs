//! Filesystem vault store.
//!
//! Records are UTF-8 files inside per-type directories. Writes overwrite the
//! whole file in place: no temp-file rename, no file locking. Concurrent
//! writers in other processes are not coordinated with.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::traits::{has_extension, is_hidden, RecordStore};

/// Record store backed by a directory tree.
#[derive(Debug, Clone, Default)]
pub struct VaultStore;

impl VaultStore {
    /// Creates a filesystem store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RecordStore for VaultStore {
    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StorageError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(dir, e)),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(dir, e))?;
            let path = entry.path();
            if is_hidden(&path) || !has_extension(&path, extension) {
                continue;
            }
            let is_file = entry
                .file_type()
                .map_err(|e| StorageError::io(&path, e))?
                .is_file();
            if is_file {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }

    fn read(&self, location: &Path) -> Result<String, StorageError> {
        fs::read_to_string(location).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::RecordNotFound(location.to_path_buf()),
            _ => StorageError::io(location, e),
        })
    }

    fn write(&self, location: &Path, content: &str) -> Result<(), StorageError> {
        if !location.is_file() {
            return Err(StorageError::RecordNotFound(location.to_path_buf()));
        }
        fs::write(location, content).map_err(|e| StorageError::io(location, e))
    }
}
