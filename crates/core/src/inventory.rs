//! Snapshot inventory for one bucket directory

use crate::error::{Result, RotateError};
use crate::format::SnapshotFormat;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::warn;

/// An existing snapshot directory and the time encoded in its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub taken_at: NaiveDateTime,
}

/// Directory left out of the inventory because its name is not a snapshot name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
}

/// Snapshots found in a bucket, oldest first
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    snapshots: Vec<Snapshot>,
    skipped: Vec<SkippedEntry>,
}

impl Inventory {
    /// List the snapshot directories directly inside `bucket_dir`
    ///
    /// Non-directories are ignored. Directories whose names do not parse with
    /// `format` are recorded in [`Inventory::skipped`] and otherwise left alone.
    pub fn scan(bucket_dir: &Path, format: &SnapshotFormat) -> Result<Self> {
        let entries = std::fs::read_dir(bucket_dir)
            .map_err(|e| RotateError::io("Failed to list bucket", bucket_dir, e))?;

        let mut snapshots = Vec::new();
        let mut skipped = Vec::new();

        for entry in entries {
            let entry =
                entry.map_err(|e| RotateError::io("Failed to list bucket", bucket_dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| RotateError::io("Failed to stat", &entry.path(), e))?;

            if !file_type.is_dir() {
                continue;
            }

            let parsed = entry
                .file_name()
                .to_str()
                .and_then(|name| format.parse(name).map(|t| (name.to_string(), t)));

            match parsed {
                Some((name, taken_at)) => snapshots.push(Snapshot { name, taken_at }),
                None => {
                    let path = entry.path();
                    warn!(
                        "Ignoring directory with mismatched date format: {}",
                        path.display()
                    );
                    skipped.push(SkippedEntry { path });
                }
            }
        }

        Ok(Self::from_snapshots(snapshots, skipped))
    }

    /// Build an inventory from already-parsed snapshots
    pub fn from_snapshots(mut snapshots: Vec<Snapshot>, skipped: Vec<SkippedEntry>) -> Self {
        // Stable: equal times keep listing order
        snapshots.sort_by_key(|s| s.taken_at);
        Self { snapshots, skipped }
    }

    /// Snapshots sorted ascending by time
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Directories that were not recognized as snapshots
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// The newest snapshot, if any
    pub fn most_recent(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
