//! sitewatch store - filesystem state for watched targets
//!
//! Provides:
//! - The `latest.hash` record per state key
//! - Append-only history entries holding `snapshot.html` and `diff.txt`
//! - Atomic temp-then-rename writes

pub mod atomic;
pub mod errors;
pub mod history;
pub mod state_store;

// Re-export key types
pub use errors::Result;
pub use history::ENTRY_NAME_FORMAT;
pub use state_store::{HistoryEntry, StateStore};
