//! Registry configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::confidence::validate_threshold;
use crate::entity::EntityType;
use crate::error::ValidationError;

/// Where records live and how lookups are thresholded.
///
/// # Examples
///
/// ```
/// use entity_registry::{EntityType, RegistryConfig};
///
/// let config = RegistryConfig::new("/vault").with_dir(EntityType::Person, "contacts");
/// assert_eq!(config.type_dir(EntityType::Person), std::path::Path::new("/vault/contacts"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Vault root. Links are rendered relative to it.
    pub root: PathBuf,
    /// Directory of person records, relative to `root`.
    pub people_dir: String,
    /// Directory of organization records, relative to `root`.
    pub organizations_dir: String,
    /// Directory of concept records, relative to `root`.
    pub concepts_dir: String,
    /// Record file extension, without the dot.
    pub extension: String,
    /// Default lookup threshold for the fuzzy tier.
    pub min_confidence: f32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            people_dir: "people".to_string(),
            organizations_dir: "organizations".to_string(),
            concepts_dir: "concepts".to_string(),
            extension: "md".to_string(),
            min_confidence: 0.7,
        }
    }
}

impl RegistryConfig {
    /// Default layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Overrides the directory name for one entity type.
    #[must_use]
    pub fn with_dir(mut self, entity_type: EntityType, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        match entity_type {
            EntityType::Person => self.people_dir = dir,
            EntityType::Organization => self.organizations_dir = dir,
            EntityType::Concept => self.concepts_dir = dir,
        }
        self
    }

    /// Sets the record file extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the default fuzzy threshold.
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Directory name for an entity type.
    #[must_use]
    pub fn dir_for(&self, entity_type: EntityType) -> &str {
        match entity_type {
            EntityType::Person => &self.people_dir,
            EntityType::Organization => &self.organizations_dir,
            EntityType::Concept => &self.concepts_dir,
        }
    }

    /// Absolute directory for an entity type.
    #[must_use]
    pub fn type_dir(&self, entity_type: EntityType) -> PathBuf {
        self.root.join(self.dir_for(entity_type))
    }

    /// Path of the record with the given link path (relative, no extension).
    #[must_use]
    pub fn location_for(&self, link_path: &Path) -> PathBuf {
        let mut location = self.root.join(link_path);
        let file_name = location
            .file_name()
            .map(|n| format!("{}.{}", n.to_string_lossy(), self.extension));
        if let Some(file_name) = file_name {
            location.set_file_name(file_name);
        }
        location
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` for empty directory names or
    /// extension, and `ThresholdOutOfRange` for a threshold outside [0, 1].
    pub fn validate(self) -> Result<Self, ValidationError> {
        for entity_type in EntityType::ALL {
            let dir = self.dir_for(entity_type);
            if dir.trim().is_empty() {
                return Err(ValidationError::InvalidConfig {
                    field: format!("{}_dir", entity_type.plural()),
                    reason: "directory name cannot be empty".to_string(),
                });
            }
        }

        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(ValidationError::InvalidConfig {
                field: "extension".to_string(),
                reason: format!("expected a bare extension like \"md\", got {:?}", self.extension),
            });
        }

        validate_threshold(self.min_confidence)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vault_layout() {
        let config = RegistryConfig::new("/vault");
        assert_eq!(config.type_dir(EntityType::Person), PathBuf::from("/vault/people"));
        assert_eq!(
            config.type_dir(EntityType::Organization),
            PathBuf::from("/vault/organizations")
        );
        assert_eq!(config.type_dir(EntityType::Concept), PathBuf::from("/vault/concepts"));
        assert_eq!(config.extension, "md");
        assert!((config.min_confidence - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn validate_rejects_bad_fields() {
        assert!(RegistryConfig::new("/v").with_dir(EntityType::Concept, " ").validate().is_err());
        assert!(RegistryConfig::new("/v").with_extension(".md").validate().is_err());
        assert!(RegistryConfig::new("/v").with_extension("").validate().is_err());
        assert!(matches!(
            RegistryConfig::new("/v").with_min_confidence(1.5).validate(),
            Err(ValidationError::ThresholdOutOfRange { .. })
        ));
        assert!(RegistryConfig::new("/v").with_min_confidence(1.0).validate().is_ok());
    }

    #[test]
    fn location_for_appends_extension() {
        let config = RegistryConfig::new("/vault");
        assert_eq!(
            config.location_for(Path::new("people/Sarah Chen Jr.")),
            PathBuf::from("/vault/people/Sarah Chen Jr..md")
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"root": "/vault", "people_dir": "contacts"}"#).unwrap();
        assert_eq!(config.people_dir, "contacts");
        assert_eq!(config.concepts_dir, "concepts");
    }
}
