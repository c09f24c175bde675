//! Core types shared across sitewatch facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Correlation**: `RunId`, one per check cycle
//! - **Redaction**: `Sensitive<T>` for webhook URLs and other secrets
//! - **Schema**: field keys and event names used in structured logs

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RunId;
pub use sensitive::Sensitive;
