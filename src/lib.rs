//! curator - Interactive curation of scientific-name occurrences
//!
//! An operator walks through the name candidates an external finder located
//! in a text, accepting, rejecting or reclassifying each one. Verdicts on a
//! name propagate to its later occurrences, and the annotated result is
//! saved next to the input so a session can be resumed.
//!
//! # Modules
//!
//! - `adapters`: External name finder (subprocess)
//! - `config`: Layered configuration and session paths
//! - `domain`: Data structures (Annotation, Occurrence, RunMetadata)
//! - `engine`: Cursor, propagation, statistics, viewport, session
//! - `persist`: Session directory on disk
//! - `render`: Terminal frame
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Curate the names in a text
//! curator curate book.txt
//!
//! # Statistics of a saved session
//! curator stats book.txt_curator
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod persist;
pub mod render;

// Re-export main types at crate root for convenience
pub use domain::{Annotation, FinderOutput, Occurrence, RunMetadata};
pub use engine::{CurationPolicy, CurationSession, OccurrenceCollection, Stats};
pub use persist::SessionStore;
