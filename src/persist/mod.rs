//! Persistence gateway.
//!
//! Whole-record JSON files in a per-input session directory; see
//! `config::paths` for the layout.

pub mod session_store;

pub use session_store::{PersistError, SessionStore, Staleness};
