//! Domain types for the curator.
//!
//! This module contains the core data structures:
//! - Annotation: curation verdicts and their string table
//! - Occurrence: finder output records
//! - RunMetadata: staleness record for a session

pub mod annotation;
pub mod metadata;
pub mod occurrence;

// Re-export commonly used types
pub use annotation::{Annotation, AnnotationError};
pub use metadata::{compute_checksum, format_timestamp, RunMetadata, TIMESTAMP_FORMAT, TOOL_VERSION};
pub use occurrence::{FinderMeta, FinderOutput, Occurrence};
