//! Subprocess name finder.
//!
//! Spawns the configured finder binary, pipes the text to its stdin, and
//! decodes the JSON document it prints.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument};

use super::NameFinder;
use crate::domain::FinderOutput;

/// Finder backed by an external command
pub struct CommandFinder {
    /// Binary to run (default: "gnfinder")
    binary_path: String,

    /// Arguments passed before the text is piped in
    args: Vec<String>,
}

impl Default for CommandFinder {
    fn default() -> Self {
        Self::new("gnfinder", vec!["-f".to_string(), "compact".to_string()])
    }
}

impl CommandFinder {
    pub fn new(binary_path: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            args,
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    /// Feed `text` to the finder and collect its stdout.
    ///
    /// Stdin is written concurrently with reading the output, so a finder
    /// that answers while still reading cannot stall on a full pipe. The
    /// timeout covers the whole exchange; the child is killed when it fires.
    async fn run(&self, text: &str, run_timeout: Duration) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn finder '{}'", self.binary_path))?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(text.as_bytes()).await {
                    // The finder may stop reading early; its exit status decides
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                    other => other?,
                }
                // stdin dropped here: EOF for the finder
            }
            Ok::<_, std::io::Error>(())
        };

        let (fed, output) = timeout(run_timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .with_context(|| {
            format!("Finder '{}' timed out after {:?}", self.binary_path, run_timeout)
        })?;

        fed.context("Failed to write text to finder stdin")?;
        let output =
            output.with_context(|| format!("Failed to wait for finder '{}'", self.binary_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "Finder '{}' failed with exit code {}: {}",
                self.binary_path,
                exit_code,
                stderr.trim()
            );
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl NameFinder for CommandFinder {
    fn name(&self) -> &str {
        &self.binary_path
    }

    #[instrument(skip(self, text), fields(finder = %self.binary_path, chars = text.len()))]
    async fn find(&self, text: &str, timeout: Duration) -> Result<FinderOutput> {
        let stdout = self.run(text, timeout).await?;
        let output: FinderOutput =
            serde_json::from_slice(&stdout).context("Finder output is not a valid names document")?;
        debug!(found = output.names.len(), "Finder finished");
        Ok(output)
    }

    async fn health_check(&self) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("Failed to run finder '{}'", self.binary_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Finder health check failed: {}", stderr.trim());
        }

        Ok(())
    }
}
