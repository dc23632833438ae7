//! Entity types and canonical records.
//!
//! A canonical record is the single authoritative profile a mention should
//! resolve to. Its name is the stem of its storage location; the registry
//! references that storage but never owns it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::confidence::{Confidence, MatchTier};
use crate::error::ValidationError;

/// Classification of entity types.
///
/// Records never change type after they are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A human person
    Person,
    /// A company, institution, or group
    Organization,
    /// An abstract concept or idea
    Concept,
}

impl EntityType {
    /// Search order used when a lookup carries no type hint.
    pub const ALL: [Self; 3] = [Self::Person, Self::Organization, Self::Concept];

    /// Plural label used in scan statistics and exports.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Person => "people",
            Self::Organization => "organizations",
            Self::Concept => "concepts",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Organization => write!(f, "organization"),
            Self::Concept => write!(f, "concept"),
        }
    }
}

impl FromStr for EntityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" | "people" => Ok(Self::Person),
            "organization" | "organizations" | "org" => Ok(Self::Organization),
            "concept" | "concepts" => Ok(Self::Concept),
            other => Err(ValidationError::UnknownEntityType {
                value: other.to_string(),
            }),
        }
    }
}

/// A canonical entity, or a lookup result derived from one.
///
/// Stored records always carry [`Confidence::EXACT`] and [`MatchTier::Exact`].
/// A lookup result is a copy with the confidence and tier of the match that
/// produced it.
///
/// # Examples
///
/// ```
/// use entity_registry::{EntityRecord, EntityType};
///
/// let record = EntityRecord::new("people/Sarah Chen.md", EntityType::Person);
/// assert_eq!(record.name, "Sarah Chen");
/// assert!(record.confidence.is_exact());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Canonical display name (storage stem).
    pub name: String,

    /// Where the record is persisted.
    pub location: PathBuf,

    /// Fixed at creation.
    pub entity_type: EntityType,

    /// Alternate names from the record's metadata, in file order.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Match strength; always 1.0 on a stored record.
    pub confidence: Confidence,

    /// Tier that produced this result.
    pub tier: MatchTier,
}

impl EntityRecord {
    /// Creates a canonical record whose name is the stem of `location`.
    #[must_use]
    pub fn new(location: impl Into<PathBuf>, entity_type: EntityType) -> Self {
        let location = location.into();
        let name = stem_of(&location);
        Self {
            name,
            location,
            entity_type,
            aliases: Vec::new(),
            confidence: Confidence::EXACT,
            tier: MatchTier::Exact,
        }
    }

    /// Sets the alias list.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Returns a copy of this record tagged as a lookup result.
    #[must_use]
    pub fn as_match(&self, tier: MatchTier, confidence: Confidence) -> Self {
        Self {
            confidence,
            tier,
            ..self.clone()
        }
    }
}

pub(crate) fn stem_of(location: &Path) -> String {
    location
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
