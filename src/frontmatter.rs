//! Record metadata blocks.
//!
//! A record's content may open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! aliases:
//!   - Sally
//! role: researcher
//! ---
//! # Sarah Chen
//! ```
//!
//! Only `aliases` is interpreted. It may be written as a single string or a
//! list and is coerced to a list at load time. Every other field is carried
//! through a rewrite untouched.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::MetadataError;

const FENCE: &str = "---";
const ALIASES_KEY: &str = "aliases";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Parsed metadata block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    aliases: Vec<String>,
    fields: Mapping,
}

impl Frontmatter {
    /// Parses the YAML between the fences. An empty block yields no fields.
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML, a block that is not a mapping, or an `aliases`
    /// field that is neither a string nor a list of strings.
    pub fn parse(yaml: &str) -> Result<Self, MetadataError> {
        let fields = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Mapping::new(),
            Value::Mapping(m) => m,
            other => {
                return Err(MetadataError::NotAMapping {
                    found: value_kind(&other),
                })
            }
        };

        let aliases: Vec<String> = match fields.get(ALIASES_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => serde_yaml::from_value::<OneOrMany>(v.clone())
                .map_err(|e| MetadataError::InvalidField {
                    field: ALIASES_KEY,
                    reason: e.to_string(),
                })?
                .into(),
        };

        Ok(Self { aliases, fields })
    }

    /// Aliases in file order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Appends `alias` unless an alias equal ignoring ASCII case exists.
    ///
    /// Returns true if the alias was added.
    pub fn push_alias(&mut self, alias: &str) -> bool {
        if self.aliases.iter().any(|a| a.eq_ignore_ascii_case(alias)) {
            return false;
        }
        self.aliases.push(alias.to_string());
        true
    }

    /// Serializes the block body (without fences).
    ///
    /// `aliases` keeps its original position; if it was absent it is appended.
    ///
    /// # Errors
    ///
    /// Propagates YAML serialization failures.
    pub fn to_yaml(&self) -> Result<String, MetadataError> {
        let mut fields = self.fields.clone();
        let aliases = self.aliases.iter().cloned().map(Value::String).collect();
        fields.insert(Value::String(ALIASES_KEY.to_string()), Value::Sequence(aliases));
        Ok(serde_yaml::to_string(&fields)?)
    }
}

/// A record's content split into metadata and everything after it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDocument {
    frontmatter: Frontmatter,
    has_block: bool,
    rest: String,
}

impl RecordDocument {
    /// Splits and parses `content`.
    ///
    /// Content that does not open with a complete fenced block is treated as
    /// having no metadata.
    ///
    /// # Errors
    ///
    /// See [`Frontmatter::parse`].
    pub fn parse(content: &str) -> Result<Self, MetadataError> {
        match split_block(content) {
            Some((yaml, rest)) => Ok(Self {
                frontmatter: Frontmatter::parse(yaml)?,
                has_block: true,
                rest: rest.to_string(),
            }),
            None => Ok(Self {
                frontmatter: Frontmatter::default(),
                has_block: false,
                rest: content.to_string(),
            }),
        }
    }

    /// Parsed metadata; empty if the content had no block.
    #[must_use]
    pub fn frontmatter(&self) -> &Frontmatter {
        &self.frontmatter
    }

    /// See [`Frontmatter::aliases`].
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        self.frontmatter.aliases()
    }

    /// True if the content opened with a complete fenced block.
    #[must_use]
    pub const fn has_block(&self) -> bool {
        self.has_block
    }

    /// See [`Frontmatter::push_alias`].
    pub fn push_alias(&mut self, alias: &str) -> bool {
        self.frontmatter.push_alias(alias)
    }

    /// Renders the full content with a rewritten metadata block.
    ///
    /// Content after the closing fence is preserved byte for byte.
    ///
    /// # Errors
    ///
    /// `MetadataError::MissingBlock` if the content had no block to rewrite;
    /// otherwise see [`Frontmatter::to_yaml`].
    pub fn render(&self) -> Result<String, MetadataError> {
        if !self.has_block {
            return Err(MetadataError::MissingBlock);
        }
        let yaml = self.frontmatter.to_yaml()?;
        Ok(format!("{FENCE}\n{yaml}{FENCE}{}", self.rest))
    }
}

/// Returns `(yaml, rest)` where `rest` starts right after the closing fence.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let after_open = content.strip_prefix(FENCE)?;
    let close = after_open.find(FENCE)?;
    Some((&after_open[..close], &after_open[close + FENCE.len()..]))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
