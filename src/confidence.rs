//! Match confidence and the tier that produced it.
//!
//! Confidence here is a property of a lookup result, never of the stored
//! record. Canonical records always carry [`Confidence::EXACT`]; a lookup
//! that resolves through a derived key or a fuzzy comparison attaches a
//! lower value that reflects how strong the evidence was.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How a lookup result was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// The normalized query is itself an index key.
    Exact,

    /// A derived form of the query (first/last, surname) hit the index.
    Variant,

    /// Word-overlap or containment similarity above the threshold.
    Fuzzy,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Variant => write!(f, "variant"),
            Self::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Match strength in `(0.0, 1.0]`.
///
/// # Examples
///
/// ```
/// use entity_registry::Confidence;
///
/// let conf = Confidence::new(0.8).unwrap();
/// assert!(conf.is_high());
/// assert!(Confidence::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Confidence(f32);

impl Confidence {
    /// Ground truth: the stored record itself, or an exact normalized hit.
    pub const EXACT: Self = Self(1.0);

    /// Matched through a derived variant key.
    pub const VARIANT: Self = Self(0.9);

    /// Maximum valid confidence value.
    pub const MAX_VALUE: f32 = 1.0;

    /// Creates a new confidence with validation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ConfidenceOutOfRange` if the value is not in (0.0, 1.0].
    pub fn new(value: f32) -> Result<Self, ValidationError> {
        if value.is_nan() || value <= 0.0 || value > Self::MAX_VALUE {
            return Err(ValidationError::ConfidenceOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Raw score.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// True for the maximum score.
    #[must_use]
    pub fn is_exact(self) -> bool {
        self.0 >= Self::MAX_VALUE
    }

    /// High confidence (>= 0.8).
    #[must_use]
    pub fn is_high(self) -> bool {
        self.0 >= 0.8
    }

    /// Medium confidence (0.5 to 0.8).
    #[must_use]
    pub fn is_medium(self) -> bool {
        self.0 >= 0.5 && self.0 < 0.8
    }

    /// Low confidence (< 0.5).
    #[must_use]
    pub fn is_low(self) -> bool {
        self.0 < 0.5
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::EXACT
    }
}

impl TryFrom<f32> for Confidence {
    type Error = ValidationError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Validates a lookup threshold in `[0.0, 1.0]`.
///
/// A threshold of exactly `1.0` disables the fuzzy tier.
pub(crate) fn validate_threshold(value: f32) -> Result<f32, ValidationError> {
    if value.is_nan() || !(0.0..=Confidence::MAX_VALUE).contains(&value) {
        return Err(ValidationError::ThresholdOutOfRange { value });
    }
    Ok(value)
}
