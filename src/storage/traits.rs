//! Abstract record store contract.
//!
//! A store enumerates record locations inside a directory, reads their
//! content, and overwrites it. By using a trait, we enable:
//! - A filesystem vault for production
//! - An in-memory backend for tests and embedded use

use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Storage trait for record content.
///
/// # Safety Considerations
/// - Writes are whole-content overwrites; there is no cross-process locking
/// - Implementations must be safe to share between threads
pub trait RecordStore: Send + Sync {
    /// Lists records directly inside `dir` whose extension is `extension`.
    ///
    /// Hidden (dot-prefixed) entries are skipped. Results are sorted by path.
    /// A missing directory yields an empty list.
    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StorageError>;

    /// Reads a record's full content.
    fn read(&self, location: &Path) -> Result<String, StorageError>;

    /// Replaces a record's full content. The record must already exist.
    fn write(&self, location: &Path, content: &str) -> Result<(), StorageError>;
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map_or(true, |name| name.to_string_lossy().starts_with('.'))
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy() == extension)
}
