//! Canonical session paths.
//!
//! Single source of truth - import this instead of hardcoding file names.
//!
//! ## Layout
//!
//! | Input | Session directory |
//! |-------|-------------------|
//! | `path/to/book.txt` | `path/to/book.txt_curator/` |
//! | stdin | `./curator_input/` |
//!
//! Every session directory holds the files below.

use std::path::{Path, PathBuf};

/// Text the occurrence offsets refer to
pub const INPUT_FILE: &str = "input.txt";

/// Finder output with annotations and the saved cursor
pub const NAMES_FILE: &str = "names.json";

/// Run metadata used for staleness detection
pub const META_FILE: &str = "meta.json";

/// Advisory lock held while a curator has the session open
pub const LOCK_FILE: &str = ".lock";

/// Session directory used when the text comes from stdin
pub const STDIN_SESSION_DIR: &str = "curator_input";

/// Suffix appended to an input file name to form its session directory
pub const SESSION_SUFFIX: &str = "_curator";

/// Files that make up a session, in backup order
pub const SESSION_FILES: [&str; 3] = [INPUT_FILE, NAMES_FILE, META_FILE];

/// Session directory for an input file, or for stdin when `None`
pub fn session_dir_for(input: Option<&Path>) -> PathBuf {
    match input {
        None => PathBuf::from(".").join(STDIN_SESSION_DIR),
        Some(path) => {
            let file_name = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "input".to_string());
            let dir_name = format!("{}{}", file_name, SESSION_SUFFIX);
            match path.parent() {
                Some(parent) => parent.join(dir_name),
                None => PathBuf::from(dir_name),
            }
        }
    }
}

/// Name under which a session file is backed up
pub fn backup_name(timestamp: &str, file_name: &str) -> String {
    format!("{}_{}", timestamp, file_name)
}
