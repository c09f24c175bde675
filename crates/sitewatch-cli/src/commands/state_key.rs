//! State key lookup

use clap::Args;
use sitewatch_core::errors::ExError;
use sitewatch_core::key_for;

#[derive(Debug, Args)]
pub struct StateKeyArgs {
    /// Canonical URL of a target
    pub url: String,
}

pub fn execute(args: StateKeyArgs) -> Result<(), ExError> {
    println!("{}", key_for(args.url.trim()));
    Ok(())
}
