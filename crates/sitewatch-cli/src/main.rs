//! sitewatch CLI
//!
//! Command-line interface for the website change watcher

use clap::{Parser, Subcommand, ValueEnum};
use sitewatch_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sitewatch")]
#[command(about = "sitewatch - Website change detection with snapshot history", long_about = None)]
struct Cli {
    /// Log output format (written to stderr; RUST_LOG overrides the level)
    #[arg(long, value_enum, global = true, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn profile(self) -> Profile {
        match self {
            LogFormat::Text => Profile::Development,
            LogFormat::Json => Profile::Production,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check every target once, record changes and notify
    Run(commands::run::RunArgs),
    /// Validate a configuration file and list its targets
    CheckConfig(commands::check_config::CheckConfigArgs),
    /// Print the state key for a URL
    StateKey(commands::state_key::StateKeyArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init(cli.log_format.profile());

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::CheckConfig(args) => commands::check_config::execute(args),
        Commands::StateKey(args) => commands::state_key::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
