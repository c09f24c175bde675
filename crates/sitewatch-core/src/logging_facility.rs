//! Structured logging for sitewatch
//!
//! The binary calls [`init`] once with a [`Profile`]. Operations that have a
//! clear beginning and end (a target check, a run, a dispatch) log through
//! `log_op_start!`, `log_op_end!` and `log_op_error!` so that every such
//! event carries the same `component`, `op` and `event` fields.
//!
//! ```rust
//! use sitewatch_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Tests install [`init_test_capture`] instead and assert on the recorded
//! events.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
