//! Run driver
//!
//! Checks every resolved target through a bounded worker pool, waits for
//! all of them, and returns the results in configuration order.

use crate::detect::{ChangeDetector, ChangeRecord, CheckOutcome};
use sitewatch_core::config::ResolvedTargets;
use sitewatch_core::errors::{ExError, ExErrorKind, WatchError};
use sitewatch_core::{log_op_end, log_op_start};
use sitewatch_core_types::RunId;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const NO_CHANGES_SUMMARY: &str = "No changes detected";

/// What happened to one target in a run
#[derive(Debug, Clone)]
pub enum TargetStatus {
    Changed(ChangeRecord),
    Unchanged,
    /// Storage failure or aborted worker; other targets are unaffected
    Failed(ExError),
}

#[derive(Debug, Clone)]
pub struct TargetResult {
    pub label: String,
    pub state_key: String,
    pub status: TargetStatus,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    /// Checked targets, in configuration order
    pub results: Vec<TargetResult>,
    /// Targets dropped at resolution
    pub skipped: Vec<WatchError>,
}

/// Signal handed to the orchestrator (commit step, CI output)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub changes_detected: bool,
    pub summary: String,
}

impl RunReport {
    pub fn changes(&self) -> Vec<ChangeRecord> {
        self.results
            .iter()
            .filter_map(|r| match &r.status {
                TargetStatus::Changed(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&TargetResult, &ExError)> {
        self.results.iter().filter_map(|r| match &r.status {
            TargetStatus::Failed(err) => Some((r, err)),
            _ => None,
        })
    }

    pub fn outcome(&self) -> RunOutcome {
        let labels: Vec<&str> = self
            .results
            .iter()
            .filter(|r| matches!(r.status, TargetStatus::Changed(_)))
            .map(|r| r.label.as_str())
            .collect();

        if labels.is_empty() {
            return RunOutcome {
                changes_detected: false,
                summary: NO_CHANGES_SUMMARY.to_string(),
            };
        }
        RunOutcome {
            changes_detected: true,
            summary: format!(
                "Detected changes in {} target(s): {}",
                labels.len(),
                labels.join(", ")
            ),
        }
    }
}

/// Check all targets with at most `concurrency` in flight
///
/// Resolved targets have pairwise distinct state keys, so workers never
/// touch the same directory.
pub async fn run_cycle(
    detector: Arc<ChangeDetector>,
    resolved: ResolvedTargets,
    concurrency: usize,
) -> RunReport {
    let start = Instant::now();
    let run_id = RunId::new();
    let targets = resolved.targets;
    log_op_start!(
        "run_cycle",
        run_id = %run_id,
        target_count = targets.len(),
        concurrency = concurrency
    );

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut workers = JoinSet::new();
    for (index, target) in targets.iter().cloned().enumerate() {
        let detector = Arc::clone(&detector);
        let semaphore = Arc::clone(&semaphore);
        workers.spawn(async move {
            let status = match semaphore.acquire_owned().await {
                Ok(_permit) => match detector.check(&target).await {
                    Ok(CheckOutcome::Changed(record)) => TargetStatus::Changed(record),
                    Ok(CheckOutcome::Unchanged) => TargetStatus::Unchanged,
                    Err(err) => TargetStatus::Failed(err),
                },
                Err(_) => TargetStatus::Failed(worker_aborted("worker pool closed")),
            };
            (index, status)
        });
    }

    let mut statuses: Vec<Option<TargetStatus>> = targets.iter().map(|_| None).collect();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((index, status)) => statuses[index] = Some(status),
            Err(e) => tracing::error!(run_id = %run_id, error = %e, "target worker aborted"),
        }
    }

    let results: Vec<TargetResult> = targets
        .iter()
        .zip(statuses)
        .map(|(target, status)| TargetResult {
            label: target.label().to_string(),
            state_key: target.state_key(),
            status: status.unwrap_or_else(|| TargetStatus::Failed(worker_aborted("worker panicked"))),
        })
        .collect();

    let report = RunReport {
        run_id,
        results,
        skipped: resolved.skipped,
    };
    log_op_end!(
        "run_cycle",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = %report.run_id,
        change_count = report.changes().len(),
        skipped_count = report.skipped.len()
    );
    report
}

fn worker_aborted(reason: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op("check_target")
        .with_message(reason.to_string())
}
