//! Rotate Core - snapshot rotation and retention engine
//!
//! This crate provides:
//! - Schedule parsing (`1d:7,1w:4,1m:12,1y:4`)
//! - Date-named snapshot directories
//! - Per-bucket snapshot inventory
//! - Calendar-aware due checks
//! - The rotation driver with retention pruning

pub mod copy;
pub mod due;
pub mod error;
pub mod format;
pub mod inventory;
pub mod rotate;
pub mod schedule;

// Re-export main types for convenience
pub use due::is_due;
pub use error::{PathRole, Result, RotateError};
pub use format::{SnapshotFormat, DEFAULT_FORMAT};
pub use inventory::{Inventory, SkippedEntry, Snapshot};
pub use rotate::{prune, BucketReport, PruneFailure, PruneOutcome, RotateOptions, RotationEvent, RotationReport, Rotator};
pub use schedule::{Frequency, RotationRule, Schedule, DEFAULT_SCHEDULE};
