//! Content acquisition with retry
//!
//! A fetch never fails from the caller's point of view. When every attempt
//! fails, the last failure is turned into a short synthetic text and
//! returned as content flagged `is_error_state`, so that an outage is
//! itself a state that can be hashed, stored and diffed.

pub mod command;
pub mod failure;
pub mod http;

use async_trait::async_trait;
use sitewatch_core::errors::ExError;
use sitewatch_core::{Settings, Target, TargetKind};
use std::time::Duration;

pub use failure::AttemptFailure;

/// Result of fetching one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub content: Vec<u8>,
    pub is_error_state: bool,
    /// Attempts made, including the successful one
    pub attempts: u32,
}

/// Acquires the current content of a target
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, target: &Target) -> FetchOutcome;
}

/// HTTP and command fetcher
pub struct ContentFetcher {
    client: reqwest::Client,
    retry_count: u32,
    retry_delay: Duration,
    command_timeout: Duration,
}

impl ContentFetcher {
    /// Build a fetcher from the run settings
    ///
    /// # Errors
    ///
    /// `ERR_INTERNAL` if the HTTP client cannot be constructed.
    pub fn new(settings: &Settings) -> Result<Self, ExError> {
        Ok(Self {
            client: http::build_client(settings)?,
            retry_count: settings.retry_count,
            retry_delay: settings.retry_delay(),
            command_timeout: settings.command_timeout(),
        })
    }

    /// Total attempts per fetch
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }

    async fn attempt(&self, target: &Target) -> Result<Vec<u8>, AttemptFailure> {
        match &target.kind {
            TargetKind::DirectFetch { url } => http::get(&self.client, url).await,
            TargetKind::CommandFetch { command } => {
                command::run(command, self.command_timeout).await
            }
        }
    }
}

#[async_trait]
impl Fetch for ContentFetcher {
    async fn fetch(&self, target: &Target) -> FetchOutcome {
        let max_attempts = self.max_attempts();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.attempt(target).await {
                Ok(content) => {
                    return FetchOutcome {
                        content,
                        is_error_state: false,
                        attempts,
                    }
                }
                Err(failure) => {
                    tracing::warn!(
                        url = target.canonical_url(),
                        attempt = attempts,
                        max_attempts,
                        error = %failure,
                        "fetch attempt failed"
                    );
                    if attempts >= max_attempts {
                        return FetchOutcome {
                            content: failure.describe(self.retry_count).into_bytes(),
                            is_error_state: true,
                            attempts,
                        };
                    }
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}
