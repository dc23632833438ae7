//! The entity registry.
//!
//! Owns one [`EntityIndex`] per entity type plus a reverse map from record
//! location to canonical name, and is the only component that reads or
//! rewrites records for identity resolution.
//!
//! State sits behind an `RwLock`: lookups share a read lock and index swaps
//! take the write lock. `scan` and `add_alias` additionally hold a mutation
//! lock for their full duration, so a rescan never overwrites an alias written
//! while it was reading. Callers within one process may share a registry
//! across threads. Nothing coordinates with other processes writing the same
//! store.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::entity::{find_in_index, EntityIndex, EntityRecord, EntityType};
use crate::error::{MetadataError, RegistryError, RegistryResult, StorageError, ValidationError};
use crate::frontmatter::RecordDocument;
use crate::link::EntityLink;
use crate::storage::{RecordStore, VaultStore};

fn lock_err(context: &'static str) -> RegistryError {
    StorageError::BackendError(format!("poisoned lock: {context}")).into()
}

/// Per-type record counts from one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Person records indexed.
    pub people: usize,
    /// Organization records indexed.
    pub organizations: usize,
    /// Concept records indexed.
    pub concepts: usize,
    /// Records that could not be loaded and were left out of the index.
    pub skipped: usize,
    /// When the scan finished.
    pub scanned_at: DateTime<Utc>,
}

impl ScanStats {
    fn empty() -> Self {
        Self {
            people: 0,
            organizations: 0,
            concepts: 0,
            skipped: 0,
            scanned_at: Utc::now(),
        }
    }

    /// Indexed records of one type.
    #[must_use]
    pub const fn count(&self, entity_type: EntityType) -> usize {
        match entity_type {
            EntityType::Person => self.people,
            EntityType::Organization => self.organizations,
            EntityType::Concept => self.concepts,
        }
    }

    fn count_mut(&mut self, entity_type: EntityType) -> &mut usize {
        match entity_type {
            EntityType::Person => &mut self.people,
            EntityType::Organization => &mut self.organizations,
            EntityType::Concept => &mut self.concepts,
        }
    }

    /// Indexed records across all types.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.people + self.organizations + self.concepts
    }
}

/// Result of a successful alias mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOutcome {
    /// The alias was appended and the record rewritten.
    Added,
    /// The record already carried the alias; nothing was written.
    AlreadyPresent,
}

/// One index key in a diagnostic export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Canonical name of the record the key points at.
    pub name: String,
    /// Record location.
    pub path: PathBuf,
    /// Aliases carried by the record.
    pub aliases: Vec<String>,
}

/// Full index dump: type (plural) → key → entry.
pub type RegistryExport = BTreeMap<String, BTreeMap<String, ExportEntry>>;

#[derive(Debug, Default)]
struct RegistryState {
    people: EntityIndex,
    organizations: EntityIndex,
    concepts: EntityIndex,
    reverse: HashMap<PathBuf, String>,
    last_scan: Option<ScanStats>,
}

impl RegistryState {
    fn index(&self, entity_type: EntityType) -> &EntityIndex {
        match entity_type {
            EntityType::Person => &self.people,
            EntityType::Organization => &self.organizations,
            EntityType::Concept => &self.concepts,
        }
    }

    fn index_mut(&mut self, entity_type: EntityType) -> &mut EntityIndex {
        match entity_type {
            EntityType::Person => &mut self.people,
            EntityType::Organization => &mut self.organizations,
            EntityType::Concept => &mut self.concepts,
        }
    }

    fn register(&mut self, record: EntityRecord) {
        self.reverse.insert(record.location.clone(), record.name.clone());
        self.index_mut(record.entity_type).register(record);
    }

    fn find(
        &self,
        name: &str,
        entity_type: Option<EntityType>,
        min_confidence: f32,
    ) -> Option<EntityRecord> {
        match entity_type {
            Some(t) => find_in_index(name, self.index(t), min_confidence),
            None => EntityType::ALL
                .into_iter()
                .find_map(|t| find_in_index(name, self.index(t), min_confidence)),
        }
    }
}

/// Registry of all known entities in a record store.
///
/// # Examples
///
/// ```
/// use entity_registry::{EntityRegistry, EntityType, InMemoryRecordStore, RegistryConfig};
///
/// let store = InMemoryRecordStore::new();
/// store.insert("/vault/people/Lisa Chang.md", "---\naliases: [LC]\n---\n").unwrap();
///
/// let registry = EntityRegistry::new(RegistryConfig::new("/vault"), store).unwrap();
/// registry.scan();
///
/// let hit = registry.find_person("Dr. Lisa Chang").unwrap();
/// assert_eq!(hit.name, "Lisa Chang");
/// assert_eq!(
///     registry.get_link("LC", Some(EntityType::Person)).unwrap().to_string(),
///     "[[people/Lisa Chang]]"
/// );
/// ```
#[derive(Debug)]
pub struct EntityRegistry<S: RecordStore = VaultStore> {
    config: RegistryConfig,
    store: S,
    state: RwLock<RegistryState>,
    mutation: Mutex<()>,
}

impl EntityRegistry<VaultStore> {
    /// Registry over a filesystem vault with the default layout. Not scanned.
    ///
    /// # Errors
    ///
    /// Fails if the default configuration does not validate.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ValidationError> {
        Self::new(RegistryConfig::new(root), VaultStore::new())
    }
}

impl<S: RecordStore> EntityRegistry<S> {
    /// Creates an empty registry. Call [`scan`](Self::scan) to populate it.
    ///
    /// # Errors
    ///
    /// Returns the first configuration validation failure.
    pub fn new(config: RegistryConfig, store: S) -> Result<Self, ValidationError> {
        Ok(Self {
            config: config.validate()?,
            store,
            state: RwLock::new(RegistryState::default()),
            mutation: Mutex::new(()),
        })
    }

    /// Validated configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Backing record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuilds every index from the store and returns per-type counts.
    ///
    /// Records that fail to load are skipped and logged; the scan itself never
    /// fails. See [`try_scan`](Self::try_scan) for the strict variant.
    pub fn scan(&self) -> ScanStats {
        self.try_scan().unwrap_or_else(|e| {
            warn!(error = %e, "scan failed; keeping previous index");
            ScanStats::empty()
        })
    }

    /// Rebuilds every index from the store.
    ///
    /// The new state is built off to the side and swapped in once complete;
    /// the previous index stays readable until then. Alias mutations wait for
    /// the scan to finish.
    ///
    /// # Errors
    ///
    /// Fails only if a registry lock is poisoned.
    pub fn try_scan(&self) -> RegistryResult<ScanStats> {
        let _mutation = self.mutation.lock().map_err(|_| lock_err("registry.mutation"))?;
        let mut fresh = RegistryState::default();
        let mut stats = ScanStats::empty();

        for entity_type in EntityType::ALL {
            let dir = self.config.type_dir(entity_type);
            let locations = match self.store.list(&dir, &self.config.extension) {
                Ok(locations) => locations,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "cannot list records");
                    continue;
                }
            };

            for location in locations {
                match self.load_record(&location, entity_type) {
                    Ok(record) => {
                        debug!(
                            entity_type = %entity_type,
                            name = %record.name,
                            aliases = record.aliases.len(),
                            "indexed record"
                        );
                        fresh.register(record);
                        *stats.count_mut(entity_type) += 1;
                    }
                    Err(e) => {
                        warn!(path = %location.display(), error = %e, "skipping record");
                        stats.skipped += 1;
                    }
                }
            }
        }

        stats.scanned_at = Utc::now();
        fresh.last_scan = Some(stats.clone());

        let mut state = self.state.write().map_err(|_| lock_err("registry.scan"))?;
        *state = fresh;
        info!(
            people = stats.people,
            organizations = stats.organizations,
            concepts = stats.concepts,
            skipped = stats.skipped,
            "entity scan complete"
        );
        Ok(stats)
    }

    fn load_record(&self, location: &Path, entity_type: EntityType) -> RegistryResult<EntityRecord> {
        let content = self.store.read(location)?;
        let doc = RecordDocument::parse(&content)?;
        Ok(EntityRecord::new(location, entity_type).with_aliases(doc.aliases().to_vec()))
    }

    /// Counts from the most recent scan, if any.
    #[must_use]
    pub fn last_scan(&self) -> Option<ScanStats> {
        self.state.read().ok()?.last_scan.clone()
    }

    /// Finds an entity using the configured threshold.
    ///
    /// With no type hint, people are searched first, then organizations,
    /// then concepts; the first hit wins.
    #[must_use]
    pub fn find(&self, name: &str, entity_type: Option<EntityType>) -> Option<EntityRecord> {
        self.find_with(name, entity_type, self.config.min_confidence)
    }

    /// Finds an entity with an explicit fuzzy threshold.
    ///
    /// A threshold of `1.0` restricts the lookup to exact and variant keys.
    #[must_use]
    pub fn find_with(
        &self,
        name: &str,
        entity_type: Option<EntityType>,
        min_confidence: f32,
    ) -> Option<EntityRecord> {
        self.state.read().ok()?.find(name, entity_type, min_confidence)
    }

    /// Finds a person.
    #[must_use]
    pub fn find_person(&self, name: &str) -> Option<EntityRecord> {
        self.find(name, Some(EntityType::Person))
    }

    /// Finds an organization.
    #[must_use]
    pub fn find_organization(&self, name: &str) -> Option<EntityRecord> {
        self.find(name, Some(EntityType::Organization))
    }

    /// Finds a concept.
    #[must_use]
    pub fn find_concept(&self, name: &str) -> Option<EntityRecord> {
        self.find(name, Some(EntityType::Concept))
    }

    /// True if `name` resolves at the configured threshold.
    #[must_use]
    pub fn exists(&self, name: &str, entity_type: Option<EntityType>) -> bool {
        self.find(name, entity_type).is_some()
    }

    /// Link to the record `name` resolves to.
    #[must_use]
    pub fn get_link(&self, name: &str, entity_type: Option<EntityType>) -> Option<EntityLink> {
        let record = self.find(name, entity_type)?;
        EntityLink::from_location(&self.config.root, &record.location)
    }

    /// Maps a link back to the record that owns it.
    #[must_use]
    pub fn resolve_link(&self, link: &EntityLink) -> Option<EntityRecord> {
        let location = self.config.location_for(&link.as_relative_path());
        let state = self.state.read().ok()?;
        state.reverse.get(&location)?;
        EntityType::ALL
            .into_iter()
            .find_map(|t| state.index(t).record_at(&location).cloned())
    }

    /// Canonical name of the record stored at `location`.
    #[must_use]
    pub fn canonical_name_for(&self, location: &Path) -> Option<String> {
        self.state.read().ok()?.reverse.get(location).cloned()
    }

    /// Canonical names currently indexed for one type, sorted.
    #[must_use]
    pub fn get_all(&self, entity_type: EntityType) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.index(entity_type).canonical_names())
            .unwrap_or_default()
    }

    /// See [`get_all`](Self::get_all).
    #[must_use]
    pub fn get_all_people(&self) -> Vec<String> {
        self.get_all(EntityType::Person)
    }

    /// See [`get_all`](Self::get_all).
    #[must_use]
    pub fn get_all_organizations(&self) -> Vec<String> {
        self.get_all(EntityType::Organization)
    }

    /// See [`get_all`](Self::get_all).
    #[must_use]
    pub fn get_all_concepts(&self) -> Vec<String> {
        self.get_all(EntityType::Concept)
    }

    /// Adds `alias` to the record `name` resolves to.
    ///
    /// Returns true only if the alias was written. An alias the record already
    /// carries yields false with nothing written; failures are logged.
    pub fn add_alias(&self, name: &str, alias: &str, entity_type: EntityType) -> bool {
        match self.try_add_alias(name, alias, entity_type) {
            Ok(AliasOutcome::Added) => true,
            Ok(AliasOutcome::AlreadyPresent) => false,
            Err(e) => {
                warn!(name, alias, entity_type = %entity_type, error = %e, "add_alias failed");
                false
            }
        }
    }

    /// Adds `alias` to the record `name` resolves to, reporting the cause on failure.
    ///
    /// The record's metadata block is rewritten in place with the rest of its
    /// content untouched; only then is the in-memory index updated. The alias
    /// is stored exactly as given.
    /// The re-index is additive: keys left over from aliases removed by hand
    /// survive until the next [`scan`](Self::scan).
    ///
    /// # Errors
    ///
    /// - `ValidationError::EmptyEntityName` or `EmptyAlias` for blank input
    /// - `EntityNotFound` if `name` does not resolve
    /// - `MetadataError::MissingBlock` if the record has no metadata block
    /// - storage or metadata errors from reading, parsing, or writing the record
    pub fn try_add_alias(
        &self,
        name: &str,
        alias: &str,
        entity_type: EntityType,
    ) -> RegistryResult<AliasOutcome> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyEntityName.into());
        }
        if alias.trim().is_empty() {
            return Err(ValidationError::EmptyAlias.into());
        }

        let _mutation = self.mutation.lock().map_err(|_| lock_err("registry.mutation"))?;
        let target = self
            .state
            .read()
            .map_err(|_| lock_err("registry.add_alias"))?
            .find(name, Some(entity_type), self.config.min_confidence)
            .ok_or_else(|| RegistryError::EntityNotFound {
                name: name.to_string(),
                entity_type: entity_type.to_string(),
            })?;

        let content = self.store.read(&target.location)?;
        let mut doc = RecordDocument::parse(&content)?;
        if !doc.has_block() {
            return Err(MetadataError::MissingBlock.into());
        }
        if !doc.push_alias(alias) {
            debug!(entity = %target.name, alias, "alias already present");
            return Ok(AliasOutcome::AlreadyPresent);
        }

        let rendered = doc.render()?;
        self.store.write(&target.location, &rendered)?;

        let updated =
            EntityRecord::new(&target.location, entity_type).with_aliases(doc.aliases().to_vec());
        self.state
            .write()
            .map_err(|_| lock_err("registry.add_alias"))?
            .register(updated);
        info!(entity = %target.name, alias, entity_type = %entity_type, "alias added");
        Ok(AliasOutcome::Added)
    }

    /// Dumps every index key for diagnostics.
    #[must_use]
    pub fn export(&self) -> RegistryExport {
        let Ok(state) = self.state.read() else {
            return RegistryExport::new();
        };
        EntityType::ALL
            .into_iter()
            .map(|t| {
                let entries = state
                    .index(t)
                    .iter()
                    .map(|(key, record)| {
                        let entry = ExportEntry {
                            name: record.name.clone(),
                            path: record.location.clone(),
                            aliases: record.aliases.clone(),
                        };
                        (key.to_string(), entry)
                    })
                    .collect();
                (t.plural().to_string(), entries)
            })
            .collect()
    }

    /// [`export`](Self::export) as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails if serialization fails.
    pub fn to_json(&self) -> RegistryResult<String> {
        serde_json::to_string_pretty(&self.export()).map_err(|e| RegistryError::internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use crate::confidence::{Confidence, MatchTier};
    use crate::storage::InMemoryRecordStore;

    fn registry_with(records: &[(&str, &str)]) -> EntityRegistry<InMemoryRecordStore> {
        let store = InMemoryRecordStore::new();
        for (path, content) in records {
            store.insert(format!("/vault/{path}"), *content).unwrap();
        }
        let registry = EntityRegistry::new(RegistryConfig::new("/vault"), store).unwrap();
        registry.scan();
        registry
    }

    #[test]
    fn scan_counts_each_type_and_skips_bad_records() {
        let registry = registry_with(&[
            ("people/Sarah Chen.md", "# Sarah"),
            ("people/Lisa Chang.md", "---\naliases: Dr. Chang\n---\n"),
            ("people/Broken.md", "---\naliases: [unclosed\n---\n"),
            ("people/.draft.md", ""),
            ("organizations/Acme Corp.md", ""),
            ("concepts/Entropy.md", ""),
            ("concepts/readme.txt", ""),
        ]);

        let stats = registry.last_scan().unwrap();
        assert_eq!(stats.people, 2);
        assert_eq!(stats.organizations, 1);
        assert_eq!(stats.concepts, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.total(), 4);
        assert!(registry.find_person("Broken").is_none());
    }

    #[test]
    fn surname_resolves_uniquely() {
        let registry = registry_with(&[("people/Sarah Chen.md", ""), ("people/Lisa Chang.md", "")]);
        assert_eq!(registry.find("Chen", None).unwrap().name, "Sarah Chen");
    }

    #[test]
    fn shared_surname_goes_to_first_scanned() {
        // Scan order is sorted by path: David before Lisa.
        let registry =
            registry_with(&[("people/Lisa Chang.md", ""), ("people/David Chang.md", "")]);
        assert_eq!(registry.find_person("Chang").unwrap().name, "David Chang");
        assert_eq!(registry.find_person("Lisa Chang").unwrap().name, "Lisa Chang");
        assert_eq!(registry.find_person("David Chang").unwrap().name, "David Chang");
        assert_eq!(registry.find_person("Dr. Lisa Chang PhD").unwrap().name, "Lisa Chang");
    }

    #[test]
    fn untyped_find_prefers_people() {
        let registry = registry_with(&[
            ("organizations/Mercury.md", ""),
            ("concepts/Mercury.md", ""),
            ("people/Freddie Mercury.md", ""),
        ]);
        assert_eq!(registry.find("Mercury", None).unwrap().entity_type, EntityType::Person);
        assert_eq!(
            registry.find("Mercury", Some(EntityType::Concept)).unwrap().entity_type,
            EntityType::Concept
        );
    }

    #[test]
    fn aliases_from_metadata_are_indexed() {
        let registry = registry_with(&[(
            "organizations/International Business Machines.md",
            "---\naliases:\n  - IBM\n  - Big Blue\n---\n",
        )]);
        let hit = registry.find_organization("IBM").unwrap();
        assert_eq!(hit.name, "International Business Machines");
        assert_eq!(hit.tier, MatchTier::Exact);
        assert!(registry.exists("big blue", None));
        assert!(!registry.exists("IBM", Some(EntityType::Person)));
    }

    #[test]
    fn threshold_one_disables_fuzzy() {
        let registry = registry_with(&[("people/Chen Sarah.md", "")]);
        assert!(registry.find_with("sarah chen", None, 1.0).is_none());
        let fuzzy = registry.find("sarah chen", None).unwrap();
        assert_eq!(fuzzy.tier, MatchTier::Fuzzy);
    }

    #[test]
    fn get_all_deduplicates_names() {
        let registry = registry_with(&[
            ("people/Sarah Chen.md", "---\naliases: [Sally, S. Chen]\n---\n"),
            ("people/Lisa Chang.md", ""),
        ]);
        assert_eq!(registry.get_all_people(), vec!["Lisa Chang", "Sarah Chen"]);
        assert!(registry.get_all_organizations().is_empty());
        assert!(registry.get_all_concepts().is_empty());
    }

    #[test]
    fn links_round_trip() {
        let registry = registry_with(&[("people/Sarah Chen.md", "")]);
        assert!(registry.get_link("Zed", Some(EntityType::Person)).is_none());

        // A first name alone only reaches the record through containment.
        let partial = registry.find("Sarah", Some(EntityType::Person)).unwrap();
        assert_eq!(partial.tier, MatchTier::Fuzzy);
        assert_eq!(partial.confidence.value(), 0.8);

        let link = registry.get_link("Dr. Sarah Chen", None).unwrap();
        assert_eq!(link.to_string(), "[[people/Sarah Chen]]");

        let owner = registry.resolve_link(&link).unwrap();
        assert_eq!(owner.location, PathBuf::from("/vault/people/Sarah Chen.md"));
        assert_eq!(
            registry.canonical_name_for(&owner.location).as_deref(),
            Some("Sarah Chen")
        );
        assert!(registry.resolve_link(&EntityLink::parse("people/Nobody").unwrap()).is_none());
    }

    #[test]
    fn add_alias_rewrites_record_and_reindexes() {
        let registry = registry_with(&[(
            "people/Sarah Chen.md",
            "---\nrole: researcher\n---\n# Sarah Chen\n",
        )]);

        assert!(registry.add_alias("Sarah Chen", "Sally", EntityType::Person));

        let hit = registry.find("Sally", Some(EntityType::Person)).unwrap();
        assert_eq!(hit.name, "Sarah Chen");
        assert!(hit.confidence >= Confidence::VARIANT);
        assert_eq!(hit.aliases, vec!["Sally"]);

        let canonical = registry.find("Sarah Chen", None).unwrap();
        assert_eq!(canonical.tier, MatchTier::Exact);
        assert_eq!(canonical.location, hit.location);

        let content = registry
            .store()
            .read(Path::new("/vault/people/Sarah Chen.md"))
            .unwrap();
        assert!(content.contains("role: researcher"));
        assert!(content.contains("- Sally"));
        assert!(content.ends_with("---\n# Sarah Chen\n"));
    }

    #[test]
    fn add_alias_outcomes() {
        let registry = registry_with(&[("people/Sarah Chen.md", "---\naliases: Sally\n---\n")]);

        assert_eq!(
            registry.try_add_alias("Sarah Chen", "sally", EntityType::Person).unwrap(),
            AliasOutcome::AlreadyPresent
        );
        assert!(registry
            .try_add_alias("Sarah Chen", "  ", EntityType::Person)
            .unwrap_err()
            .is_validation());
        assert!(registry
            .try_add_alias("Nobody Known", "N", EntityType::Person)
            .unwrap_err()
            .is_not_found());
        assert!(!registry.add_alias("Sarah Chen", "Sally", EntityType::Person));
        assert!(!registry.add_alias("Sarah Chen", "Sal", EntityType::Organization));
        assert_eq!(
            registry.store().read(Path::new("/vault/people/Sarah Chen.md")).unwrap(),
            "---\naliases: Sally\n---\n"
        );
    }

    #[test]
    fn add_alias_requires_metadata_block() {
        let registry = registry_with(&[("people/Sarah Chen.md", "# Sarah Chen\n")]);

        let err = registry
            .try_add_alias("Sarah Chen", "Sally", EntityType::Person)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Metadata(MetadataError::MissingBlock)));
        assert!(!registry.add_alias("Sarah Chen", "Sally", EntityType::Person));
        assert_eq!(
            registry.store().read(Path::new("/vault/people/Sarah Chen.md")).unwrap(),
            "# Sarah Chen\n"
        );
        assert!(registry.find_with("Sally", None, 1.0).is_none());
    }

    #[test]
    fn add_alias_persists_alias_verbatim() {
        let registry = registry_with(&[("people/Sarah Chen.md", "---\n---\n")]);
        assert!(registry.add_alias("Sarah Chen", " Sal ", EntityType::Person));

        let content = registry
            .store()
            .read(Path::new("/vault/people/Sarah Chen.md"))
            .unwrap();
        let doc = RecordDocument::parse(&content).unwrap();
        assert_eq!(doc.aliases(), [" Sal "]);
        assert_eq!(registry.find_person("sal").unwrap().name, "Sarah Chen");
    }

    #[test]
    fn add_alias_fails_closed_on_malformed_metadata() {
        let registry = registry_with(&[("people/Sarah Chen.md", "")]);
        let path = Path::new("/vault/people/Sarah Chen.md");
        registry.store().write(path, "---\naliases: [oops\n---\n").unwrap();

        let err = registry
            .try_add_alias("Sarah Chen", "Sally", EntityType::Person)
            .unwrap_err();
        assert!(err.is_metadata());
        assert!(registry.find_with("Sally", None, 1.0).is_none());
        assert_eq!(registry.store().read(path).unwrap(), "---\naliases: [oops\n---\n");
    }

    #[test]
    fn stale_alias_keys_survive_until_rescan() {
        let registry = registry_with(&[("people/Sarah Chen.md", "---\n---\n")]);
        assert!(registry.add_alias("Sarah Chen", "Sally", EntityType::Person));

        // Alias removed by hand; an additive re-index keeps the old key.
        let path = Path::new("/vault/people/Sarah Chen.md");
        registry.store().write(path, "---\naliases: []\n---\n").unwrap();
        assert!(registry.add_alias("Sarah Chen", "Sal", EntityType::Person));
        assert!(registry.find_with("Sally", None, 1.0).is_some());

        registry.scan();
        assert!(registry.find_with("Sally", None, 1.0).is_none());
        assert!(registry.find_with("Sal", None, 1.0).is_some());
    }

    #[test]
    fn try_add_alias_rejects_blank_input() {
        let registry = registry_with(&[("people/Sarah Chen.md", "")]);
        let err = registry
            .try_add_alias("  ", "Sally", EntityType::Person)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::EmptyEntityName)
        ));
        let err = registry
            .try_add_alias("Sarah Chen", " ", EntityType::Person)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(ValidationError::EmptyAlias)));
        assert_eq!(registry.store().read(Path::new("/vault/people/Sarah Chen.md")).unwrap(), "");
    }

    /// Pauses the first read of `watch` after being armed so another thread
    /// can act while a scan is mid-flight.
    struct PausingStore {
        inner: InMemoryRecordStore,
        watch: PathBuf,
        reached: Mutex<Option<mpsc::Sender<()>>>,
    }

    impl PausingStore {
        fn arm(&self) -> mpsc::Receiver<()> {
            let (tx, rx) = mpsc::channel();
            *self.reached.lock().unwrap() = Some(tx);
            rx
        }
    }

    impl RecordStore for PausingStore {
        fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StorageError> {
            self.inner.list(dir, extension)
        }

        fn read(&self, location: &Path) -> Result<String, StorageError> {
            let content = self.inner.read(location)?;
            if location == self.watch {
                if let Some(tx) = self.reached.lock().unwrap().take() {
                    tx.send(()).unwrap();
                    thread::sleep(Duration::from_millis(100));
                }
            }
            Ok(content)
        }

        fn write(&self, location: &Path, content: &str) -> Result<(), StorageError> {
            self.inner.write(location, content)
        }
    }

    #[test]
    fn alias_added_during_scan_is_not_lost() {
        let watch = PathBuf::from("/vault/people/Sarah Chen.md");
        let inner = InMemoryRecordStore::new();
        inner.insert(watch.clone(), "---\nrole: x\n---\n").unwrap();
        let store = PausingStore {
            inner,
            watch: watch.clone(),
            reached: Mutex::new(None),
        };
        let registry = EntityRegistry::new(RegistryConfig::new("/vault"), store).unwrap();
        registry.scan();

        let reached = registry.store().arm();
        thread::scope(|s| {
            let scan = s.spawn(|| registry.scan());
            reached.recv().unwrap();
            assert!(registry.add_alias("Sarah Chen", "Sally", EntityType::Person));
            assert_eq!(scan.join().unwrap().people, 1);
        });

        assert!(registry.store().read(&watch).unwrap().contains("- Sally"));
        assert_eq!(registry.find_with("Sally", None, 1.0).unwrap().name, "Sarah Chen");
    }

    #[test]
    fn export_lists_every_key() {
        let registry = registry_with(&[("people/Sarah Chen.md", "---\naliases: Sally\n---\n")]);
        let export = registry.export();
        let people = &export["people"];
        assert_eq!(people["sarah chen"].name, "Sarah Chen");
        assert_eq!(people["chen"].path, PathBuf::from("/vault/people/Sarah Chen.md"));
        assert_eq!(people["sally"].aliases, vec!["Sally"]);
        assert!(export["organizations"].is_empty());

        let json = registry.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["people"]["sally"]["name"], "Sarah Chen");
    }

    #[test]
    fn rejects_invalid_config() {
        let config = RegistryConfig::new("/vault").with_min_confidence(2.0);
        assert!(EntityRegistry::new(config, InMemoryRecordStore::new()).is_err());
    }
}
