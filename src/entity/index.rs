//! Per-type key → record index.
//!
//! Records live in an arena; keys point at arena slots. Two insertion
//! primitives decide who owns a key:
//!
//! - [`EntityIndex::insert_overwrite`]: the freshest write wins. Used only for
//!   a record's normalized canonical key.
//! - [`EntityIndex::insert_if_absent`]: the first claimant keeps the key. Used
//!   for variants, aliases, and alias variants, so two different "Chang"s are
//!   never silently merged by a later scan.
//!
//! Keys keep insertion order so that fuzzy tie-breaking is deterministic.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::entity::normalize::{extract_variants, normalize};
use crate::entity::EntityRecord;

/// Handle to a record in an [`EntityIndex`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordSlot(usize);

/// Normalized-key → record mapping for one entity type.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    records: Vec<EntityRecord>,
    by_location: HashMap<PathBuf, RecordSlot>,
    keys: Vec<(String, RecordSlot)>,
    key_pos: HashMap<String, usize>,
}

impl EntityIndex {
    /// Create a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `record` in the arena, replacing any record at the same location.
    ///
    /// Replacing keeps the slot, so every key that already pointed at the old
    /// version now sees the new one.
    pub fn upsert_record(&mut self, record: EntityRecord) -> RecordSlot {
        if let Some(&slot) = self.by_location.get(&record.location) {
            self.records[slot.0] = record;
            return slot;
        }
        let slot = RecordSlot(self.records.len());
        self.by_location.insert(record.location.clone(), slot);
        self.records.push(record);
        slot
    }

    /// Points `key` at `slot` unconditionally.
    pub fn insert_overwrite(&mut self, key: impl Into<String>, slot: RecordSlot) {
        let key = key.into();
        match self.key_pos.get(&key) {
            Some(&pos) => self.keys[pos].1 = slot,
            None => {
                self.key_pos.insert(key.clone(), self.keys.len());
                self.keys.push((key, slot));
            }
        }
    }

    /// Points `key` at `slot` only if no record has claimed it yet.
    ///
    /// Returns true if the key was inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, slot: RecordSlot) -> bool {
        let key = key.into();
        if self.key_pos.contains_key(&key) {
            return false;
        }
        self.key_pos.insert(key.clone(), self.keys.len());
        self.keys.push((key, slot));
        true
    }

    /// Registers a record under its canonical key, variants, and aliases.
    ///
    /// Re-registering a record (same location) is additive: keys derived from
    /// aliases the record no longer carries are left in place until the index
    /// is rebuilt.
    pub fn register(&mut self, record: EntityRecord) -> RecordSlot {
        let canonical = normalize(&record.name);
        let variants = extract_variants(&record.name);
        let aliases = record.aliases.clone();
        let slot = self.upsert_record(record);

        if !canonical.is_empty() {
            self.insert_overwrite(canonical, slot);
        }
        for variant in variants {
            self.insert_if_absent(variant, slot);
        }
        for alias in &aliases {
            let alias_key = normalize(alias);
            if !alias_key.is_empty() {
                self.insert_if_absent(alias_key, slot);
            }
            for variant in extract_variants(alias) {
                self.insert_if_absent(variant, slot);
            }
        }
        slot
    }

    /// Looks up a key verbatim.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EntityRecord> {
        let &pos = self.key_pos.get(key)?;
        let slot = self.keys[pos].1;
        Some(&self.records[slot.0])
    }

    /// True if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_pos.contains_key(key)
    }

    /// Returns the record stored at `location`, if any.
    #[must_use]
    pub fn record_at(&self, location: &Path) -> Option<&EntityRecord> {
        self.by_location.get(location).map(|slot| &self.records[slot.0])
    }

    /// Iterates `(key, record)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.keys
            .iter()
            .map(|(key, slot)| (key.as_str(), &self.records[slot.0]))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct records held in the arena.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Canonical names reachable through at least one key, deduplicated and sorted.
    #[must_use]
    pub fn canonical_names(&self) -> Vec<String> {
        self.iter()
            .map(|(_, record)| record.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
