//! Curation engine.
//!
//! This module contains:
//! - OccurrenceCollection: ordered occurrences, cursor, review edge
//! - Annotation state machine: verdicts and same-name propagation
//! - Stats: precision/recall and percentage breakdown
//! - Viewport: synchronized list and text windows
//! - CurationSession: the context object tying them together

pub mod annotate;
pub mod session;
pub mod stats;
pub mod store;
pub mod viewport;

// Re-export commonly used types
pub use annotate::{
    prepare_finder_output, set_annotation, set_annotation_with_edge, AnnotateError,
    CurationPolicy, Propagation, DEFAULT_AUTOSAVE_EVERY, DEFAULT_LOOKBACK,
};
pub use session::{Command, CurationSession, Outcome};
pub use stats::{Percentages, Stats, WordState};
pub use store::{OccurrenceCollection, StoreError};
pub use viewport::{Document, ListWindow, TextWindow, Viewport, ENTRY_LINES};
