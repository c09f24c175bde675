//! Filesystem state store
//!
//! Layout under the root:
//!
//! ```text
//! <root>/<state_key>/latest.hash
//! <root>/<state_key>/<entry>/snapshot.html
//! <root>/<state_key>/<entry>/diff.txt
//! ```
//!
//! `latest.hash` is the only mutable file. Entries are created once and
//! never rewritten or removed.

use crate::atomic::atomic_write;
use crate::errors::{history_conflict, invalid_state_key, io_error, Result};
use crate::history::next_entry_name;
use sitewatch_core::Snapshot;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const LATEST_HASH_FILE: &str = "latest.hash";
pub const SNAPSHOT_FILE: &str = "snapshot.html";
pub const DIFF_FILE: &str = "diff.txt";

/// A history entry created by [`StateStore::append_snapshot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state_key: String,
    pub name: String,
    pub dir: PathBuf,
}

impl HistoryEntry {
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    pub fn diff_path(&self) -> PathBuf {
        self.dir.join(DIFF_FILE)
    }
}

/// Per-target state rooted at the snapshot directory
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    /// Create a store at the given root directory
    ///
    /// Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding everything for one state key
    ///
    /// # Errors
    ///
    /// Rejects keys that are not a single normal path segment.
    pub fn key_dir(&self, state_key: &str) -> Result<PathBuf> {
        let valid = !state_key.is_empty()
            && state_key != "."
            && state_key != ".."
            && !state_key.contains(['/', '\\']);
        if !valid {
            return Err(invalid_state_key(state_key));
        }
        Ok(self.root.join(state_key))
    }

    /// Last recorded content hash; `None` if the target was never observed
    ///
    /// # Errors
    ///
    /// I/O failures other than the file being absent.
    pub fn read_latest_hash(&self, state_key: &str) -> Result<Option<String>> {
        let path = self.key_dir(state_key)?.join(LATEST_HASH_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => {
                let hash = text.trim();
                Ok((!hash.is_empty()).then(|| hash.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read_latest_hash", e).with_entity_id(state_key)),
        }
    }

    /// Overwrite the latest hash atomically
    ///
    /// # Errors
    ///
    /// I/O failures while writing or renaming.
    pub fn write_latest_hash(&self, state_key: &str, hash: &str) -> Result<()> {
        let path = self.key_dir(state_key)?.join(LATEST_HASH_FILE);
        atomic_write(&path, hash.as_bytes()).map_err(|e| e.with_entity_id(state_key))
    }

    /// Sorted names of all history entries for a key
    ///
    /// # Errors
    ///
    /// I/O failures other than the key directory being absent.
    pub fn list_entries(&self, state_key: &str) -> Result<Vec<String>> {
        let dir = self.key_dir(state_key)?;
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list_entries", e).with_entity_id(state_key)),
        };

        let mut names = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| io_error("list_entries", e).with_entity_id(state_key))?;
            let is_dir = item
                .file_type()
                .map_err(|e| io_error("list_entries", e).with_entity_id(state_key))?
                .is_dir();
            if !is_dir {
                continue;
            }
            if let Some(name) = item.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Create a new history entry and write the snapshot into it
    ///
    /// The entry name comes from the snapshot's capture time and always
    /// sorts after every existing entry of the key.
    ///
    /// # Errors
    ///
    /// `ERR_HISTORY_CONFLICT` if no fresh name can be allocated or the
    /// directory appeared concurrently, `ERR_IO` on write failures.
    pub fn append_snapshot(&self, state_key: &str, snapshot: &Snapshot) -> Result<HistoryEntry> {
        let key_dir = self.key_dir(state_key)?;
        fs::create_dir_all(&key_dir)
            .map_err(|e| io_error("append_snapshot", e).with_entity_id(state_key))?;

        let existing = self.list_entries(state_key)?;
        let name = next_entry_name(&existing, snapshot.captured_at())
            .ok_or_else(|| history_conflict(state_key, &snapshot.captured_at().to_rfc3339()))?;

        let dir = key_dir.join(&name);
        fs::create_dir(&dir).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => history_conflict(state_key, &name),
            _ => io_error("append_snapshot", e).with_entity_id(state_key),
        })?;

        let entry = HistoryEntry {
            state_key: state_key.to_string(),
            name,
            dir,
        };
        atomic_write(&entry.snapshot_path(), snapshot.content())
            .map_err(|e| e.with_entity_id(state_key))?;

        tracing::debug!(state_key, entry = %entry.name, "history entry created");
        Ok(entry)
    }

    /// Write the full diff text into an entry
    ///
    /// # Errors
    ///
    /// I/O failures while writing.
    pub fn write_diff(&self, entry: &HistoryEntry, diff_text: &str) -> Result<()> {
        atomic_write(&entry.diff_path(), diff_text.as_bytes())
            .map_err(|e| e.with_entity_id(entry.state_key.as_str()))
    }

    /// Snapshot bytes of the newest entry sorting before `excluding`
    ///
    /// Entries without a snapshot file are passed over. Returns `None`
    /// when no earlier entry holds a snapshot.
    ///
    /// # Errors
    ///
    /// I/O failures while listing or reading.
    pub fn most_recent_prior_snapshot(
        &self,
        state_key: &str,
        excluding: &str,
    ) -> Result<Option<Vec<u8>>> {
        let key_dir = self.key_dir(state_key)?;
        let entries = self.list_entries(state_key)?;

        for name in entries.iter().rev().filter(|n| n.as_str() < excluding) {
            let path = key_dir.join(name).join(SNAPSHOT_FILE);
            match fs::read(&path) {
                Ok(bytes) => return Ok(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(
                        io_error("read_prior_snapshot", e).with_entity_id(state_key)
                    )
                }
            }
        }
        Ok(None)
    }
}
