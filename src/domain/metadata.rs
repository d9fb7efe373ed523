//! Run metadata stored next to a curation session.
//!
//! Used at session start to detect that the input text or the curator
//! itself changed since the annotations were written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Version of the engine that writes annotation data
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format of `save_timestamp` and of backup file prefixes
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One record per session on disk (meta.json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Hex SHA-256 of the raw input text
    pub text_checksum: String,

    /// Engine revision that produced the annotation data
    pub tool_version: String,

    /// Time of the last successful save
    pub save_timestamp: String,
}

impl RunMetadata {
    /// Create metadata for raw input bytes, stamped now
    pub fn new(raw_input: &[u8]) -> Self {
        Self {
            text_checksum: compute_checksum(raw_input),
            tool_version: TOOL_VERSION.to_string(),
            save_timestamp: format_timestamp(Utc::now()),
        }
    }

    /// Refresh the save timestamp
    pub fn touch(&mut self) {
        self.save_timestamp = format_timestamp(Utc::now());
    }
}

/// Hex SHA-256 of raw bytes
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Render a timestamp in the session file format
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
