//! Stable cross-references to canonical records.
//!
//! A link is the record's location relative to the vault root with the
//! storage extension dropped, e.g. `people/Sarah Chen`. It renders in wiki
//! form (`[[people/Sarah Chen]]`) for writers that embed it in documents.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WIKI_LINK: OnceLock<Regex> = OnceLock::new();

fn wiki_link() -> &'static Regex {
    // [[target]], [[target|label]], [[target#heading]]
    WIKI_LINK.get_or_init(|| {
        Regex::new(r"^\[\[\s*([^\]|#]+?)\s*(?:[|#][^\]]*)?\]\]$").expect("static regex")
    })
}

/// Reference to a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityLink(String);

impl EntityLink {
    /// Builds the link for `location` under `root`.
    ///
    /// Returns `None` if `location` is not inside `root`.
    #[must_use]
    pub fn from_location(root: &Path, location: &Path) -> Option<Self> {
        let relative = location.strip_prefix(root).ok()?.with_extension("");
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(Self(parts.join("/")))
    }

    /// Parses a bare (`people/Sarah Chen`) or wiki-form link.
    ///
    /// Labels (`|...`) and heading anchors (`#...`) are discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_registry::EntityLink;
    ///
    /// let link = EntityLink::parse("[[people/Sarah Chen|Sarah]]").unwrap();
    /// assert_eq!(link.path(), "people/Sarah Chen");
    /// assert_eq!(link.to_string(), "[[people/Sarah Chen]]");
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(caps) = wiki_link().captures(input) {
            return Some(Self(caps[1].to_string()));
        }
        if input.is_empty() || input.contains("[[") || input.contains("]]") {
            return None;
        }
        Some(Self(input.trim_matches('/').to_string()))
    }

    /// Relative path without extension.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.0
    }

    /// The linked record's display name (last path segment).
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub(crate) fn as_relative_path(&self) -> PathBuf {
        self.0.split('/').collect()
    }
}

impl fmt::Display for EntityLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}]]", self.0)
    }
}
