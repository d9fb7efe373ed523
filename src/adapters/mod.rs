//! Adapter interfaces for the external name finder.
//!
//! The curator never scores candidates itself. A finder takes the text and
//! returns an ordered candidate list with offsets and confidence scores.

pub mod command;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::FinderOutput;

// Re-export the subprocess finder
pub use command::CommandFinder;

/// Trait for name-finding collaborators
#[async_trait]
pub trait NameFinder: Send + Sync {
    /// Human-readable finder name
    fn name(&self) -> &str;

    /// Find name candidates in `text`
    async fn find(&self, text: &str, timeout: Duration) -> Result<FinderOutput>;

    /// Check that the finder can be run
    async fn health_check(&self) -> Result<()>;
}
