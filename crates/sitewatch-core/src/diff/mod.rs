//! Snapshot diffing.
//!
//! Compares two captured bodies line by line and produces a unified diff
//! for the history trail and a possibly truncated rendering for
//! notifications.
//!
//! ## Entry point
//!
//! ```
//! use sitewatch_core::diff::{unified_diff, DiffReport};
//!
//! let report = DiffReport::Unified(unified_diff(b"A\n", b"B\n"));
//! assert!(report.full_text().contains("+B"));
//! let shown = report.display(50);
//! assert!(!shown.truncated);
//! ```
//!
//! ## Guarantees
//!
//! - Content is opaque: no HTML or JSON awareness, only lines.
//! - Invalid UTF-8 is decoded lossily on both sides.
//! - The persisted text is never truncated; only `display` truncates.

pub mod engine;
pub mod model;

pub use engine::{unified_diff, unified_diff_text};
pub use model::{DiffReport, DisplayDiff, NO_PRIOR_VERSION};
