//! Error types for the entity registry.
//!
//! All errors are strongly typed using thiserror. The public lookup and
//! mutation surface favors availability (`Option`/`bool`), while the
//! `try_*` variants and the store layer expose these types directly.

use std::path::PathBuf;

use thiserror::Error;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Confidence value {value} is out of range (0.0, 1.0]")]
    ConfidenceOutOfRange {
        value: f32,
    },

    #[error("Threshold {value} is out of range [0.0, 1.0]")]
    ThresholdOutOfRange {
        value: f32,
    },

    #[error("Entity name cannot be empty")]
    EmptyEntityName,

    #[error("Alias cannot be empty")]
    EmptyAlias,

    #[error("Unknown entity type '{value}'")]
    UnknownEntityType {
        value: String,
    },

    #[error("Invalid config field '{field}': {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },
}

/// Errors raised by a [`RecordStore`](crate::storage::RecordStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record exists at the location.
    #[error("Record not found: {}", .0.display())]
    RecordNotFound(PathBuf),

    /// Underlying filesystem failure.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while reading or rewriting a record's metadata block.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Malformed frontmatter: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a mapping, found {found}")]
    NotAMapping {
        found: &'static str,
    },

    #[error("Field '{field}' has an unsupported shape: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("Record has no frontmatter block to rewrite")]
    MissingBlock,
}

/// Top-level error type for the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Entity not found: '{name}' ({entity_type})")]
    EntityNotFound {
        name: String,
        entity_type: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl RegistryError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is a metadata error.
    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        matches!(self, Self::Metadata(_))
    }

    /// Returns true if the lookup target did not resolve.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EntityNotFound { .. } | Self::Storage(StorageError::RecordNotFound(_))
        )
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
