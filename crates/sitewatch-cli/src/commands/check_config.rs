//! Configuration validation command

use clap::Args;
use sitewatch_core::errors::ExError;
use sitewatch_core::{Config, TargetKind};
use sitewatch_engine::notify::Recipients;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckConfigArgs {
    #[arg(long, default_value = "sitewatch.toml")]
    pub config: PathBuf,
}

pub fn execute(args: CheckConfigArgs) -> Result<(), ExError> {
    let config = Config::load(&args.config)?;
    let resolved = config.resolve_targets();

    println!("Configuration OK: {}", args.config.display());
    println!("  snapshot_dir: {}", config.settings.snapshot_dir.display());
    println!("  concurrency: {}", config.settings.concurrency);
    println!("Targets ({}):", resolved.targets.len());
    for target in &resolved.targets {
        let kind = match target.kind {
            TargetKind::DirectFetch { .. } => "url",
            TargetKind::CommandFetch { .. } => "command",
        };
        println!("  {} [{}] -> {}", target.label(), kind, target.state_key());
    }
    for skipped in &resolved.skipped {
        println!("  skipped: {}", skipped);
    }
    println!(
        "Notify: {} webhook(s), {} recipient(s)",
        config.notify.webhook_urls.len(),
        Recipients::from_config(&config.notify.recipients).len()
    );

    Ok(())
}
