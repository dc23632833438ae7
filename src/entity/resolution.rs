//! Tiered lookup against a single [`EntityIndex`].
//!
//! Tiers are tried in order and the first hit wins:
//!
//! 1. exact: the normalized query is a key, the stored record is returned as is
//! 2. variant: a derived form of the query is a key, confidence 0.9
//! 3. fuzzy: best similarity strictly above the threshold (skipped at 1.0)

use tracing::debug;

use crate::confidence::{Confidence, MatchTier};
use crate::entity::index::EntityIndex;
use crate::entity::normalize::{extract_variants, normalize, similarity};
use crate::entity::EntityRecord;

/// Resolves `name` against `index`.
///
/// Nothing scoring at or below `min_confidence` can win the fuzzy tier; on a
/// tie the key inserted first wins.
#[must_use]
pub fn find_in_index(name: &str, index: &EntityIndex, min_confidence: f32) -> Option<EntityRecord> {
    if name.trim().is_empty() {
        return None;
    }

    let normalized = normalize(name);
    if let Some(record) = index.get(&normalized) {
        debug!(query = name, key = %normalized, entity = %record.name, "exact match");
        return Some(record.clone());
    }

    for variant in extract_variants(name) {
        if let Some(record) = index.get(&variant) {
            debug!(query = name, key = %variant, entity = %record.name, "variant match");
            return Some(record.as_match(MatchTier::Variant, Confidence::VARIANT));
        }
    }

    if min_confidence >= Confidence::MAX_VALUE {
        return None;
    }

    let mut best: Option<(&EntityRecord, f32)> = None;
    let mut best_score = min_confidence;
    for (key, record) in index.iter() {
        let score = similarity(name, key);
        if score > best_score {
            best_score = score;
            best = Some((record, score));
        }
    }

    let (record, score) = best?;
    let confidence = Confidence::new(score).ok()?;
    debug!(query = name, entity = %record.name, score, "fuzzy match");
    Some(record.as_match(MatchTier::Fuzzy, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::entity::EntityType;

    fn index_of(paths: &[&str]) -> EntityIndex {
        let mut index = EntityIndex::new();
        for path in paths {
            index.register(EntityRecord::new(*path, EntityType::Person));
        }
        index
    }

    #[test]
    fn exact_tier_returns_stored_record() {
        let index = index_of(&["people/Lisa Chang.md"]);
        let hit = find_in_index("Dr. Lisa Chang PhD", &index, 0.7).unwrap();
        assert_eq!(hit.name, "Lisa Chang");
        assert_eq!(hit.tier, MatchTier::Exact);
        assert!(hit.confidence.is_exact());
    }

    #[test]
    fn variant_tier_forces_point_nine() {
        let index = index_of(&["people/Sarah Chen.md", "people/Lisa Chang.md"]);
        let hit = find_in_index("Sarah Q. Chen", &index, 0.7).unwrap();
        assert_eq!(hit.name, "Sarah Chen");
        assert_eq!(hit.tier, MatchTier::Variant);
        assert_eq!(hit.confidence, Confidence::VARIANT);
    }

    #[test]
    fn surname_resolves_when_unambiguous() {
        let index = index_of(&["people/Sarah Chen.md", "people/Lisa Chang.md"]);
        assert_eq!(find_in_index("Chen", &index, 0.7).unwrap().name, "Sarah Chen");
        assert_eq!(find_in_index("Chang", &index, 0.7).unwrap().name, "Lisa Chang");
    }

    #[test]
    fn shared_surname_resolves_to_first_registered_in_either_order() {
        for (first, second) in [("Lisa", "David"), ("David", "Lisa")] {
            let first_path = format!("people/{first} Chang.md");
            let second_path = format!("people/{second} Chang.md");
            let index = index_of(&[first_path.as_str(), second_path.as_str()]);
            assert_eq!(
                find_in_index("Chang", &index, 0.7).unwrap().name,
                format!("{first} Chang")
            );
            for exact in ["Lisa Chang", "David Chang", "Dr. Lisa Chang PhD"] {
                let hit = find_in_index(exact, &index, 0.7).unwrap();
                assert_eq!(normalize(&hit.name), normalize(exact));
                assert_eq!(hit.tier, MatchTier::Exact);
            }
        }
    }

    #[test]
    fn fuzzy_tier_scores_word_overlap() {
        let index = index_of(&["people/Chen Sarah.md"]);
        let hit = find_in_index("sarah chen", &index, 0.7).unwrap();
        assert_eq!(hit.name, "Chen Sarah");
        assert_eq!(hit.tier, MatchTier::Fuzzy);
        assert_eq!(hit.confidence.value(), 1.0);
    }

    #[test]
    fn threshold_of_one_disables_fuzzy() {
        let index = index_of(&["people/Chen Sarah.md"]);
        assert!(find_in_index("sarah chen", &index, 1.0).is_none());
    }

    #[test]
    fn suffix_only_difference_is_still_exact() {
        let index = index_of(&["people/Sarah Chen Jr..md"]);
        let hit = find_in_index("sarah chen", &index, 1.0).unwrap();
        assert_eq!(hit.tier, MatchTier::Exact);
    }

    #[test]
    fn fuzzy_never_returns_at_or_below_threshold() {
        // {sarah, lee} vs {sarah, chen}: 1/3
        let index = index_of(&["people/Sarah Chen.md"]);
        assert!(find_in_index("Sarah Lee", &index, 0.7).is_none());
        let hit = find_in_index("Sarah Lee", &index, 0.3).unwrap();
        assert_eq!(hit.name, "Sarah Chen");
        assert!(hit.confidence.value() > 0.3);
    }

    #[test]
    fn blank_query_finds_nothing() {
        let index = index_of(&["people/Sarah Chen.md"]);
        assert!(find_in_index("", &index, 0.0).is_none());
        assert!(find_in_index("   ", &index, 0.0).is_none());
    }
}
