//! In-memory record store.
//!
//! This module provides a thread-safe in-memory implementation of the store
//! trait. It is intended for embedded usage, tests, and as a reference
//! implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StorageError;
use crate::storage::traits::{has_extension, is_hidden, RecordStore};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory record store keyed by location.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<PathBuf, String>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces a record.
    ///
    /// # Errors
    ///
    /// Fails only if the internal lock is poisoned.
    pub fn insert(
        &self,
        location: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("record.insert"))?;
        records.insert(location.into(), content.into());
        Ok(())
    }

    /// Removes a record, returning its content.
    ///
    /// # Errors
    ///
    /// Fails only if the internal lock is poisoned.
    pub fn remove(&self, location: &Path) -> Result<Option<String>, StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("record.remove"))?;
        Ok(records.remove(location))
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |r| r.len())
    }

    /// True if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryRecordStore {
    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("record.list"))?;
        Ok(records
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter(|path| !is_hidden(path) && has_extension(path, extension))
            .cloned()
            .collect())
    }

    fn read(&self, location: &Path) -> Result<String, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("record.read"))?;
        records
            .get(location)
            .cloned()
            .ok_or_else(|| StorageError::RecordNotFound(location.to_path_buf()))
    }

    fn write(&self, location: &Path, content: &str) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("record.write"))?;
        let slot = records
            .get_mut(location)
            .ok_or_else(|| StorageError::RecordNotFound(location.to_path_buf()))?;
        *slot = content.to_string();
        Ok(())
    }
}
