//! # Entity Registry
//!
//! Maps free-text mentions of people, organizations, and concepts onto the
//! canonical records already stored in a knowledge-base vault, so that
//! "Dr. Lisa Chang", "Lisa Chang", and "Chang" all resolve to one profile
//! instead of spawning duplicates.
//!
//! ## Core Concepts
//!
//! - **Canonical record**: the single authoritative profile a name resolves to
//! - **Normalized key**: a name lowercased with titles and suffixes stripped
//! - **Variant**: a derived lookup key (first/last, surname) that widens recall
//! - **Confidence**: strength of a match result, never a property of the record
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entity_registry::{EntityRegistry, EntityType};
//!
//! let registry = EntityRegistry::open("/path/to/vault")?;
//! registry.scan();
//!
//! if let Some(hit) = registry.find_person("Dr. Lisa Chang") {
//!     println!("{} ({}, {})", hit.name, hit.tier, hit.confidence);
//! }
//! let link = registry.get_link("Sarah Chen", Some(EntityType::Person));
//! registry.add_alias("Sarah Chen", "Sally", EntityType::Person);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod confidence;
pub mod config;
pub mod entity;
pub mod error;
pub mod frontmatter;
pub mod link;
pub mod registry;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use cache::{entity_exists, get_entity_link, RegistryCache};
pub use confidence::{Confidence, MatchTier};
pub use config::RegistryConfig;
pub use entity::{EntityIndex, EntityRecord, EntityType};
pub use error::{MetadataError, RegistryError, RegistryResult, StorageError, ValidationError};
pub use frontmatter::{Frontmatter, RecordDocument};
pub use link::EntityLink;
pub use registry::{AliasOutcome, EntityRegistry, ExportEntry, RegistryExport, ScanStats};
pub use storage::{InMemoryRecordStore, RecordStore, VaultStore};
