//! Name normalization, variant generation, and similarity scoring.
//!
//! Everything here is pure: no state, no I/O. Index construction and lookup
//! both go through these functions so that a key written at scan time is
//! reproducible from a query at lookup time.

use std::collections::HashSet;

/// Honorifics stripped from the front of a name.
const TITLES: &[&str] = &[
    "dr", "dr.", "mr", "mr.", "mrs", "mrs.", "ms", "ms.", "prof", "prof.", "professor", "sir",
    "dame", "rev", "rev.",
];

/// Generational and credential suffixes stripped from the end of a name.
const SUFFIXES: &[&str] = &[
    "jr", "jr.", "sr", "sr.", "ii", "iii", "iv", "v", "phd", "ph.d", "ph.d.", "md", "m.d",
    "m.d.", "esq", "esq.",
];

/// Score for a name that contains (or is contained by) the other.
pub const CONTAINMENT_SCORE: f32 = 0.8;

/// Reduces a name to its comparable key.
///
/// Lowercases, collapses whitespace, then repeatedly strips leading titles
/// and trailing suffixes.
///
/// # Examples
///
/// ```
/// use entity_registry::entity::normalize;
///
/// assert_eq!(normalize("  Dr.  Lisa   Chang PhD "), "lisa chang");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let all: Vec<&str> = lowered.split_whitespace().collect();
    let mut words = all.as_slice();

    while let [first, rest @ ..] = words {
        if !TITLES.contains(first) {
            break;
        }
        words = rest;
    }
    while let [rest @ .., last] = words {
        if !SUFFIXES.contains(last) {
            break;
        }
        words = rest;
    }

    words.join(" ")
}

/// Derives the lowercase lookup keys for a name.
///
/// Always yields the raw input and (if different) its normalized form. For
/// multi-word names it also yields "first last" and the surname alone. The
/// surname key is deliberately loose: it trades precision for recall.
///
/// # Examples
///
/// ```
/// use entity_registry::entity::extract_variants;
///
/// let variants = extract_variants("Dr. Lisa M. Chang");
/// assert_eq!(variants, vec!["dr. lisa m. chang", "lisa m. chang", "lisa chang", "chang"]);
/// ```
#[must_use]
pub fn extract_variants(name: &str) -> Vec<String> {
    let raw = name.to_lowercase();
    let normalized = normalize(name);

    let mut variants = Vec::with_capacity(4);
    push_unique(&mut variants, raw);
    push_unique(&mut variants, normalized.clone());

    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();
    if let [first, .., last] = words.as_slice() {
        push_unique(&mut variants, format!("{first} {last}"));
        push_unique(&mut variants, (*last).to_string());
    }

    variants
}

fn push_unique(out: &mut Vec<String>, variant: String) {
    if !variant.is_empty() && !out.contains(&variant) {
        out.push(variant);
    }
}

/// Scores how alike two names are, in `[0.0, 1.0]`.
///
/// Equal normalized forms score 1.0, containment scores
/// [`CONTAINMENT_SCORE`], anything else is the Jaccard index of the word
/// sets. A blank input always scores 0.0.
///
/// # Examples
///
/// ```
/// use entity_registry::entity::similarity;
///
/// assert_eq!(similarity("Dr. Lisa Chang", "lisa chang"), 1.0);
/// assert_eq!(similarity("Lisa Chang", "Lisa Chang Wu"), 0.8);
/// assert_eq!(similarity("", "Lisa"), 0.0);
/// ```
#[must_use]
pub fn similarity(a: &str, b: &str) -> f32 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }

    let n1 = normalize(a);
    let n2 = normalize(b);

    if n1 == n2 {
        return 1.0;
    }
    if n1.is_empty() || n2.is_empty() {
        return 0.0;
    }
    if n1.contains(n2.as_str()) || n2.contains(n1.as_str()) {
        return CONTAINMENT_SCORE;
    }

    let words1: HashSet<&str> = n1.split(' ').collect();
    let words2: HashSet<&str> = n2.split(' ').collect();

    let overlap = words1.intersection(&words2).count();
    let total = words1.union(&words2).count();
    if total == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let score = overlap as f32 / total as f32;
    score
}
