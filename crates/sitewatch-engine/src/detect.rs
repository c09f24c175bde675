//! Per-target change detection
//!
//! Each check walks `Fetching → Hashing → {Unchanged | Recording}`. Recording
//! appends a history entry, diffs it against the previous entry, writes the
//! diff and only then moves `latest.hash`. A failure anywhere in recording
//! leaves the old hash in place, so the next run sees the change again
//! instead of silently skipping it.

use crate::clock::{Clock, SystemClock};
use crate::fetch::Fetch;
use chrono::{DateTime, Utc};
use sitewatch_core::diff::{unified_diff, DiffReport, DisplayDiff};
use sitewatch_core::errors::ExError;
use sitewatch_core::{log_op_end, log_op_error, log_op_start, Settings, Snapshot, Target};
use sitewatch_store::{HistoryEntry, StateStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// A recorded change of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub label: String,
    pub canonical_url: String,
    pub state_key: String,
    pub entry: String,
    pub snapshot_path: PathBuf,
    /// Link to the snapshot: under `snapshot_base_url` when set, else the local path
    pub display_url: String,
    pub captured_at: DateTime<Utc>,
    pub content_hash: String,
    pub is_error_state: bool,
    pub diff: DisplayDiff,
}

/// Result of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Changed(ChangeRecord),
    Unchanged,
}

impl CheckOutcome {
    pub fn change(&self) -> Option<&ChangeRecord> {
        match self {
            CheckOutcome::Changed(record) => Some(record),
            CheckOutcome::Unchanged => None,
        }
    }
}

/// Fetches a target, compares it with stored state and records changes
pub struct ChangeDetector {
    fetcher: Arc<dyn Fetch>,
    store: StateStore,
    clock: Arc<dyn Clock>,
    snapshot_base_url: Option<String>,
    max_diff_lines: usize,
}

impl ChangeDetector {
    pub fn new(fetcher: Arc<dyn Fetch>, store: StateStore, settings: &Settings) -> Self {
        Self {
            fetcher,
            store,
            clock: Arc::new(SystemClock),
            snapshot_base_url: settings.snapshot_base_url.clone(),
            max_diff_lines: settings.max_diff_lines,
        }
    }

    /// Replace the capture-time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run one check of `target`
    ///
    /// # Errors
    ///
    /// Storage failures only. Fetch failures are recorded as error-state
    /// content and surface as an ordinary change.
    pub async fn check(&self, target: &Target) -> Result<CheckOutcome, ExError> {
        let start = Instant::now();
        let state_key = target.state_key();
        log_op_start!("check_target", state_key = %state_key, url = target.canonical_url());

        let result = self
            .check_key(target, &state_key)
            .await
            .map_err(|e| e.with_entity_id(state_key.as_str()));

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(CheckOutcome::Changed(record)) => {
                log_op_end!(
                    "check_target",
                    duration_ms = duration_ms,
                    state_key = %state_key,
                    changed = true,
                    entry = %record.entry
                );
            }
            Ok(CheckOutcome::Unchanged) => {
                log_op_end!(
                    "check_target",
                    duration_ms = duration_ms,
                    state_key = %state_key,
                    changed = false
                );
            }
            Err(err) => {
                log_op_error!(
                    "check_target",
                    *err,
                    duration_ms = duration_ms,
                    state_key = %state_key
                );
            }
        }
        result
    }

    async fn check_key(&self, target: &Target, state_key: &str) -> Result<CheckOutcome, ExError> {
        let fetched = self.fetcher.fetch(target).await;
        let captured_at = self.clock.now();
        if fetched.is_error_state {
            tracing::warn!(
                state_key,
                attempts = fetched.attempts,
                "target unreachable, recording error state"
            );
        }

        let snapshot = Snapshot::new(fetched.content, fetched.is_error_state, captured_at);
        let latest = self.store.read_latest_hash(state_key)?;
        if latest.as_deref() == Some(snapshot.content_hash()) {
            return Ok(CheckOutcome::Unchanged);
        }

        self.record(target, state_key, &snapshot, latest.is_some())
            .map(CheckOutcome::Changed)
    }

    fn record(
        &self,
        target: &Target,
        state_key: &str,
        snapshot: &Snapshot,
        has_baseline: bool,
    ) -> Result<ChangeRecord, ExError> {
        let entry = self.store.append_snapshot(state_key, snapshot)?;

        let report = if has_baseline {
            match self.store.most_recent_prior_snapshot(state_key, &entry.name)? {
                Some(prior) => DiffReport::Unified(unified_diff(&prior, snapshot.content())),
                None => DiffReport::NoBaseline,
            }
        } else {
            DiffReport::NoBaseline
        };

        self.store.write_diff(&entry, report.full_text())?;
        // Last: a crash before this line re-records the change next run
        self.store
            .write_latest_hash(state_key, snapshot.content_hash())?;

        tracing::info!(
            state_key,
            entry = %entry.name,
            is_error_state = snapshot.is_error_state(),
            "change recorded"
        );

        Ok(ChangeRecord {
            label: target.label().to_string(),
            canonical_url: target.canonical_url().to_string(),
            state_key: state_key.to_string(),
            display_url: self.display_url(&entry),
            snapshot_path: entry.snapshot_path(),
            entry: entry.name,
            captured_at: snapshot.captured_at(),
            content_hash: snapshot.content_hash().to_string(),
            is_error_state: snapshot.is_error_state(),
            diff: report.display(self.max_diff_lines),
        })
    }

    fn display_url(&self, entry: &HistoryEntry) -> String {
        match &self.snapshot_base_url {
            Some(base) => format!(
                "{}/{}/{}/snapshot.html",
                base.trim_end_matches('/'),
                entry.state_key,
                entry.name
            ),
            None => entry.snapshot_path().display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fetch::FetchOutcome;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct StaticFetch(&'static [u8]);

    #[async_trait]
    impl Fetch for StaticFetch {
        async fn fetch(&self, _target: &Target) -> FetchOutcome {
            FetchOutcome {
                content: self.0.to_vec(),
                is_error_state: false,
                attempts: 1,
            }
        }
    }

    fn detector(dir: &TempDir, base_url: Option<&str>) -> ChangeDetector {
        let settings = Settings {
            snapshot_base_url: base_url.map(str::to_string),
            ..Settings::default()
        };
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        ChangeDetector::new(
            Arc::new(StaticFetch(b"hello")),
            StateStore::new(dir.path()),
            &settings,
        )
        .with_clock(Arc::new(clock))
    }

    #[tokio::test]
    async fn test_display_url_uses_base_url() {
        let dir = TempDir::new().unwrap();
        let detector = detector(&dir, Some("https://github.com/o/r/blob/main/snapshots/"));
        let target = Target::direct(None, "https://example.com/page").unwrap();

        let outcome = detector.check(&target).await.unwrap();
        let record = outcome.change().unwrap();

        assert_eq!(
            record.display_url,
            "https://github.com/o/r/blob/main/snapshots/example.com_page/20240102_030405/snapshot.html"
        );
    }

    #[tokio::test]
    async fn test_display_url_falls_back_to_local_path() {
        let dir = TempDir::new().unwrap();
        let detector = detector(&dir, None);
        let target = Target::direct(None, "https://example.com/page").unwrap();

        let outcome = detector.check(&target).await.unwrap();
        let record = outcome.change().unwrap();

        assert_eq!(record.display_url, record.snapshot_path.display().to_string());
        assert!(record.snapshot_path.starts_with(dir.path()));
    }
}
