//! File-based session store.
//!
//! A session directory holds the processed text, the finder output with
//! annotations, and a small metadata record. Every save rewrites whole
//! files through a temporary file in the same directory, so a crash leaves
//! either the old or the new content on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::paths::{self, INPUT_FILE, LOCK_FILE, META_FILE, NAMES_FILE, SESSION_FILES};
use crate::domain::{FinderOutput, RunMetadata};
use crate::engine::{OccurrenceCollection, StoreError};

/// Errors that can occur while reading or writing a session
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode session data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Session {0} is already open in another curator")]
    Locked(PathBuf),

    #[error("Invalid session data: {0}")]
    Invalid(#[from] StoreError),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Outcome of comparing stored metadata with the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// No earlier session data
    NoPrevious,

    /// Earlier data matches the input and the engine version
    Current(RunMetadata),

    /// The input text changed since the data was written
    ContentChanged(RunMetadata),

    /// The data was written by another engine version
    VersionChanged(RunMetadata),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Staleness::ContentChanged(_) | Staleness::VersionChanged(_)
        )
    }

    /// Operator-facing warning for stale data
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Staleness::ContentChanged(_) => Some("Your input file has changed."),
            Staleness::VersionChanged(_) => Some("Your curator is updated."),
            _ => None,
        }
    }

    /// The stored metadata, if any
    pub fn previous(&self) -> Option<&RunMetadata> {
        match self {
            Staleness::NoPrevious => None,
            Staleness::Current(m) | Staleness::ContentChanged(m) | Staleness::VersionChanged(m) => {
                Some(m)
            }
        }
    }
}

/// Decode a collection from a finder document on disk
fn load_collection(path: &Path) -> Result<OccurrenceCollection, PersistError> {
    let output = read_json::<FinderOutput>(path)?;
    Ok(OccurrenceCollection::new(output)?)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let bytes = fs::read(path).map_err(io_err(path))?;
    serde_json::from_slice(&bytes).map_err(|source| PersistError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &json)
}

/// Write through a temporary sibling file, then rename over the target
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    tmp.write_all(bytes).map_err(io_err(path))?;
    tmp.as_file().sync_all().map_err(io_err(path))?;
    tmp.persist(path).map_err(|e| PersistError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// A curation session directory
pub struct SessionStore {
    dir: PathBuf,
    input_path: PathBuf,
    names_path: PathBuf,
    meta_path: PathBuf,

    /// Held for the lifetime of the store once `lock` succeeds
    lock: Option<File>,
}

impl SessionStore {
    /// Open (creating if needed) a session directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        Ok(Self {
            input_path: dir.join(INPUT_FILE),
            names_path: dir.join(NAMES_FILE),
            meta_path: dir.join(META_FILE),
            dir,
            lock: None,
        })
    }

    /// Take the exclusive session lock; fails if another curator holds it
    pub fn lock(&mut self) -> Result<(), PersistError> {
        if self.lock.is_some() {
            return Ok(());
        }
        let lock_path = self.dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_err(&lock_path))?;
        file.try_lock_exclusive()
            .map_err(|_| PersistError::Locked(self.dir.clone()))?;
        self.lock = Some(file);
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn names_path(&self) -> &Path {
        &self.names_path
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    /// Whether text and names from an earlier run are present
    pub fn has_session(&self) -> bool {
        self.input_path.is_file() && self.names_path.is_file()
    }

    /// Load the annotated collection
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn load_collection(&self) -> Result<OccurrenceCollection, PersistError> {
        let coll = load_collection(&self.names_path)?;
        info!(
            total = coll.len(),
            current = coll.current_index(),
            "Loaded occurrences"
        );
        Ok(coll)
    }

    /// Load the processed text
    pub fn load_text(&self) -> Result<String, PersistError> {
        fs::read_to_string(&self.input_path).map_err(io_err(&self.input_path))
    }

    /// Load run metadata if it exists
    pub fn load_metadata(&self) -> Result<Option<RunMetadata>, PersistError> {
        if !self.meta_path.is_file() {
            return Ok(None);
        }
        read_json(&self.meta_path).map(Some)
    }

    pub fn save_text(&self, text: &str) -> Result<(), PersistError> {
        write_atomic(&self.input_path, text.as_bytes())
    }

    pub fn save_names(&self, output: &FinderOutput) -> Result<(), PersistError> {
        write_json(&self.names_path, output)
    }

    pub fn save_metadata(&self, meta: &RunMetadata) -> Result<(), PersistError> {
        write_json(&self.meta_path, meta)
    }

    /// Persist the collection and refresh the metadata timestamp
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub fn save(&self, output: &FinderOutput, meta: &mut RunMetadata) -> Result<(), PersistError> {
        self.save_names(output)?;
        meta.touch();
        self.save_metadata(meta)?;
        info!(current = output.meta.current_name, "Session saved");
        Ok(())
    }

    /// Compare stored metadata with the current input checksum and version.
    ///
    /// Without meta.json the stored text itself is checksummed, and its
    /// version is taken to be `version`.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn check_staleness(&self, checksum: &str, version: &str) -> Result<Staleness, PersistError> {
        if !self.has_session() {
            return Ok(Staleness::NoPrevious);
        }
        let previous = match self.load_metadata()? {
            Some(meta) => meta,
            None => {
                warn!("Session has no metadata, comparing stored text");
                let stored = fs::read(&self.input_path).map_err(io_err(&self.input_path))?;
                let mut meta = RunMetadata::new(&stored);
                meta.tool_version = version.to_string();
                meta
            }
        };

        let staleness = if previous.text_checksum != checksum {
            Staleness::ContentChanged(previous)
        } else if previous.tool_version != version {
            Staleness::VersionChanged(previous)
        } else {
            Staleness::Current(previous)
        };
        if staleness.is_stale() {
            warn!(?staleness, "Stored session does not match this run");
        }
        Ok(staleness)
    }

    /// Move existing session files aside under a timestamp prefix
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn backup_previous(&self, timestamp: &str) -> Result<Vec<PathBuf>, PersistError> {
        let mut moved = Vec::new();
        for file_name in SESSION_FILES {
            let from = self.dir.join(file_name);
            if !from.exists() {
                continue;
            }
            let to = self.dir.join(paths::backup_name(timestamp, file_name));
            fs::rename(&from, &to).map_err(io_err(&from))?;
            info!(from = %from.display(), to = %to.display(), "Backed up session file");
            moved.push(to);
        }
        Ok(moved)
    }
}
