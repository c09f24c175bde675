//! Captured content of one target at one point in time

use crate::digest::content_hash;
use chrono::{DateTime, Utc};

/// One observed content capture
///
/// Immutable once built: the hash is computed from the bytes at
/// construction and the fields are only readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    content: Vec<u8>,
    content_hash: String,
    captured_at: DateTime<Utc>,
    is_error_state: bool,
}

impl Snapshot {
    pub fn new(content: Vec<u8>, is_error_state: bool, captured_at: DateTime<Utc>) -> Self {
        let content_hash = content_hash(&content);
        Self {
            content,
            content_hash,
            captured_at,
            is_error_state,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// True when the content is a synthetic description of a fetch failure
    pub fn is_error_state(&self) -> bool {
        self.is_error_state
    }
}
