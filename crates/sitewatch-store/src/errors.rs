//! Error handling for sitewatch-store
//!
//! Wraps sitewatch-core ExError with store-specific helpers

use sitewatch_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a history conflict error (entry name taken or exhausted)
pub fn history_conflict(state_key: &str, entry: &str) -> ExError {
    ExError::new(ExErrorKind::HistoryConflict)
        .with_op("append_snapshot")
        .with_entity_id(state_key.to_string())
        .with_message(format!("History entry {} cannot be allocated", entry))
}

/// Create an invalid state key error
pub fn invalid_state_key(state_key: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("state_key_dir")
        .with_entity_id(state_key.to_string())
        .with_message("State key is not a single path segment")
}
