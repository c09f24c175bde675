//! sitewatch core - change-detection domain kernel
//!
//! This crate provides the pieces of the watcher that carry no I/O:
//! - Target model with a closed fetch-kind enum and canonical URL resolution
//! - Content digests and filesystem-safe state keys
//! - Line-oriented unified diff engine with display truncation
//! - Configuration model and TOML loader
//! - Error and logging facilities shared by the other crates

pub use sitewatch_core_types as core_types;

pub mod config;
pub mod diff;
pub mod digest;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod state_key;
pub mod template;

// Re-export commonly used types
pub use config::{Config, MailBackend, NotifyConfig, Settings, SmtpSettings};
pub use diff::{unified_diff, DiffReport, DisplayDiff};
pub use digest::content_hash;
pub use errors::{ExError, ExErrorKind, Result, WatchError};
pub use model::{Snapshot, Target, TargetKind};
pub use state_key::key_for;
pub use template::WebhookTemplate;
