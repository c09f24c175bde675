//! Run command: one check cycle plus notification

use chrono::Utc;
use clap::Args;
use sitewatch_core::errors::{ExError, ExErrorKind};
use sitewatch_core::Config;
use sitewatch_engine::notify::{mail_transport, HttpWebhookSender};
use sitewatch_engine::{
    run_cycle, ChangeDetector, ContentFetcher, NotificationComposer, NotificationDispatcher,
    RunOutcome,
};
use sitewatch_store::StateStore;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Plain URL list, one per line; replaces the configured targets
    #[arg(long)]
    pub urls: Option<PathBuf>,

    /// Overrides settings.snapshot_dir
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    /// File receiving `changes_detected=` and `commit_message=` lines
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output_file: Option<PathBuf>,

    /// Record changes without sending notifications
    #[arg(long)]
    pub no_notify: bool,
}

/// # Errors
///
/// Only failures that prevent the run: missing or invalid configuration,
/// or an HTTP/mail client that cannot be built. Per-target and delivery
/// failures are reported and the run still succeeds.
pub async fn execute(args: RunArgs) -> Result<(), ExError> {
    if args.config.is_none() && args.urls.is_none() {
        return Err(ExError::new(ExErrorKind::InvalidConfig)
            .with_op("run")
            .with_message("either --config or --urls is required"));
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(urls) = &args.urls {
        config.targets = Config::load_url_list(urls)?;
    }
    if let Some(dir) = args.snapshot_dir {
        config.settings.snapshot_dir = dir;
    }

    let resolved = config.resolve_targets();
    let fetcher = Arc::new(ContentFetcher::new(&config.settings)?);
    let store = StateStore::new(&config.settings.snapshot_dir);
    let detector = Arc::new(ChangeDetector::new(fetcher, store, &config.settings));

    let report = run_cycle(detector, resolved, config.settings.concurrency).await;
    for skipped in &report.skipped {
        eprintln!("Skipped: {}", skipped);
    }
    for (result, err) in report.failures() {
        eprintln!("Failed: {}: {}", result.label, err);
    }

    let changes = report.changes();
    let composer = NotificationComposer::new(&config.notify);
    if let Some(notification) = composer.compose(&changes, Utc::now()) {
        println!("--- Change summary ---");
        println!("{}", notification.summary);

        if args.no_notify {
            println!("Notifications disabled (--no-notify)");
        } else {
            let dispatcher = NotificationDispatcher::new(
                Arc::new(HttpWebhookSender::new()?),
                mail_transport(&config.notify.mail_backend())?,
                config.settings.email_delay(),
            );
            let delivery = dispatcher.dispatch(&notification, &config.notify).await;
            println!(
                "Notifications: {} delivered, {} failed",
                delivery.succeeded(),
                delivery.failures().count()
            );
        }
    }

    let outcome = report.outcome();
    tracing::info!(
        run_id = %report.run_id,
        changes_detected = outcome.changes_detected,
        failed = report.failures().count(),
        "run finished"
    );
    println!("{}", outcome.summary);
    if let Some(path) = &args.output_file {
        if let Err(e) = write_outputs(path, &outcome) {
            tracing::warn!(path = %path.display(), error = %e, "step outputs not written");
            eprintln!("Warning: could not write outputs to {}: {}", path.display(), e);
        }
    }

    Ok(())
}

/// Append step outputs in the `key=value` line format CI runners read
fn write_outputs(path: &Path, outcome: &RunOutcome) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "changes_detected={}", outcome.changes_detected)?;
    // One line per key; a newline in a target name would start a new key
    writeln!(file, "commit_message={}", outcome.summary.replace('\n', " "))?;
    Ok(())
}
