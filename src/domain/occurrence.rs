//! Finder output records.
//!
//! These types mirror the JSON document produced by the external name
//! finder. Fields the curator does not interpret are carried through
//! untouched so a save never loses finder data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::annotation::Annotation;

/// One detected candidate span in the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Classification supplied by the finder (uninomial, binomial, ...)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Canonical name string, the duplicate-grouping key
    pub name: String,

    /// Confidence score; 0 means the finder did not score this candidate
    #[serde(rename = "odds", default)]
    pub score: f64,

    /// Character offset of the first character of the span
    #[serde(rename = "start")]
    pub offset_start: usize,

    /// Character offset one past the last character of the span
    #[serde(rename = "end")]
    pub offset_end: usize,

    /// Curation verdict
    #[serde(default)]
    pub annotation: Annotation,

    /// Finder fields the curator passes through
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Occurrence {
    /// Create an unreviewed occurrence
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        score: f64,
        offset_start: usize,
        offset_end: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            score,
            offset_start,
            offset_end,
            annotation: Annotation::NotAssigned,
            extra: Map::new(),
        }
    }

    /// Set the annotation (builder style, used by fixtures)
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Whether the finder produced a score for this candidate
    pub fn is_scored(&self) -> bool {
        self.score != 0.0
    }

    /// Whether the span fits inside a text of `text_len` characters
    pub fn span_fits(&self, text_len: usize) -> bool {
        self.offset_start < self.offset_end && self.offset_end <= text_len
    }
}

/// Finder run metadata; `current_name` doubles as the persisted cursor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinderMeta {
    /// Number of occurrences in `names`
    #[serde(default)]
    pub total_names: usize,

    /// Cursor position saved by the curator
    #[serde(default)]
    pub current_name: usize,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The complete finder document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinderOutput {
    #[serde(rename = "metadata", alias = "meta", default)]
    pub meta: FinderMeta,

    #[serde(default)]
    pub names: Vec<Occurrence>,
}

impl FinderOutput {
    /// Wrap a list of occurrences with fresh metadata
    pub fn from_occurrences(names: Vec<Occurrence>) -> Self {
        Self {
            meta: FinderMeta {
                total_names: names.len(),
                current_name: 0,
                extra: Map::new(),
            },
            names,
        }
    }
}
