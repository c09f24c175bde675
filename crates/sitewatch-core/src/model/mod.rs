//! Domain models for watched targets and captured content

pub mod snapshot;
pub mod target;

pub use snapshot::Snapshot;
pub use target::{Target, TargetKind};
