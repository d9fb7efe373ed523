//! Curation verdicts attached to occurrences.
//!
//! The serialized form is a fixed string set where the empty string stands
//! for `NotAssigned`. Display colours are ANSI foreground codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding annotation strings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("Annotation name '{0}' does not exist")]
    Unknown(String),
}

/// Verdict for a single occurrence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Annotation {
    /// Not reviewed yet (the only legal initial value)
    #[default]
    NotAssigned,

    /// Rejected: the span is not a scientific name
    NotName,

    /// Accepted as found
    Accepted,

    /// Reclassified as a uninomial
    Uninomial,

    /// Reclassified as a genus
    Genus,

    /// Reclassified as a species
    Species,

    /// Low-confidence candidate waiting for an explicit decision
    Doubtful,
}

impl Annotation {
    /// Every variant, in serialization-table order
    pub const ALL: [Annotation; 7] = [
        Annotation::NotAssigned,
        Annotation::NotName,
        Annotation::Accepted,
        Annotation::Uninomial,
        Annotation::Genus,
        Annotation::Species,
        Annotation::Doubtful,
    ];

    /// Serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Annotation::NotAssigned => "",
            Annotation::NotName => "NotName",
            Annotation::Accepted => "Accepted",
            Annotation::Uninomial => "Uninomial",
            Annotation::Genus => "Genus",
            Annotation::Species => "Species",
            Annotation::Doubtful => "Doubtful",
        }
    }

    /// Human-readable label (never empty)
    pub fn label(&self) -> &'static str {
        match self {
            Annotation::NotAssigned => "NotAssigned",
            other => other.as_str(),
        }
    }

    /// ANSI foreground colour code
    pub fn color(&self) -> u8 {
        match self {
            Annotation::Accepted => 32,
            Annotation::NotName => 31,
            Annotation::Doubtful => 34,
            Annotation::Uninomial | Annotation::Genus | Annotation::Species => 35,
            Annotation::NotAssigned => 33,
        }
    }

    /// Check membership in a set of annotations
    pub fn is_in(&self, set: &[Annotation]) -> bool {
        set.contains(self)
    }

    /// True for binary accept/reject verdicts, the only ones that propagate
    pub fn is_binary_verdict(&self) -> bool {
        matches!(self, Annotation::NotName | Annotation::Accepted)
    }

    /// True for the finer reclassifications
    pub fn is_modification(&self) -> bool {
        matches!(
            self,
            Annotation::Uninomial | Annotation::Genus | Annotation::Species
        )
    }

    /// True when the operator still has to look at the occurrence
    pub fn is_undecided(&self) -> bool {
        matches!(self, Annotation::NotAssigned | Annotation::Doubtful)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Annotation {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older finder output spells the empty verdict out
        if s == "NotAssigned" {
            return Ok(Annotation::NotAssigned);
        }
        Annotation::ALL
            .iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| AnnotationError::Unknown(s.to_string()))
    }
}

impl TryFrom<String> for Annotation {
    type Error = AnnotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Annotation> for String {
    fn from(value: Annotation) -> Self {
        value.as_str().to_string()
    }
}
