//! Rotation driver and retention pruning
//!
//! For every rule in the schedule, in order:
//! 1. Ensure `<target>/<label>/` exists
//! 2. Scan its snapshots
//! 3. Decide whether a snapshot is due
//! 4. Copy the source into `<target>/<label>/<date>/` when due
//! 5. Delete the oldest snapshots beyond the rule's retention
//!
//! Any filesystem failure other than a failed deletion aborts the run.
//! Buckets processed before the failure keep their changes.

use crate::copy;
use crate::due::is_due;
use crate::error::{PathRole, Result, RotateError};
use crate::format::SnapshotFormat;
use crate::inventory::{Inventory, Snapshot};
use crate::schedule::{RotationRule, Schedule};
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings for a rotation run
#[derive(Debug, Clone, Default)]
pub struct RotateOptions {
    pub schedule: Schedule,
    pub format: SnapshotFormat,
}

/// Outcome of a whole run, one entry per rule
#[derive(Debug, Clone, Default)]
pub struct RotationReport {
    pub buckets: Vec<BucketReport>,
}

impl RotationReport {
    /// Number of snapshots created across all buckets
    pub fn snapshots_created(&self) -> usize {
        self.buckets.iter().filter(|b| b.created.is_some()).count()
    }

    /// Number of snapshots deleted across all buckets
    pub fn snapshots_deleted(&self) -> usize {
        self.buckets.iter().map(|b| b.deleted.len()).sum()
    }

    /// Whether any bucket recorded a non-fatal problem
    pub fn has_warnings(&self) -> bool {
        self.buckets
            .iter()
            .any(|b| !b.skipped.is_empty() || !b.prune_failures.is_empty())
    }
}

/// Outcome for a single bucket
#[derive(Debug, Clone)]
pub struct BucketReport {
    pub label: String,
    pub bucket_dir: PathBuf,
    /// Snapshot directory written by this run
    pub created: Option<PathBuf>,
    /// Snapshot directories removed by pruning
    pub deleted: Vec<PathBuf>,
    /// Directories ignored because their names are not snapshot names
    pub skipped: Vec<PathBuf>,
    pub prune_failures: Vec<PruneFailure>,
}

/// A snapshot that pruning could not delete
#[derive(Debug, Clone)]
pub struct PruneFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of pruning one bucket
#[derive(Debug, Clone, Default)]
pub struct PruneOutcome {
    pub deleted: Vec<PathBuf>,
    pub failures: Vec<PruneFailure>,
}

/// A filesystem action, reported just before it happens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationEvent {
    Copying { from: PathBuf, to: PathBuf },
    Deleting { path: PathBuf },
    DeleteFailed { path: PathBuf, error: String },
}

/// Runs a schedule against a source and target
pub struct Rotator {
    options: RotateOptions,
}

impl Rotator {
    /// Create a rotator with the given options
    pub fn new(options: RotateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RotateOptions {
        &self.options
    }

    /// Rotate using the host's local clock
    pub fn run(&self, source: &Path, target: &Path) -> Result<RotationReport> {
        self.run_at(source, target, Local::now().naive_local())
    }

    /// Rotate using the host's local clock, reporting actions as they happen
    ///
    /// Events already delivered stay valid when a later bucket fails.
    pub fn run_with<F>(&self, source: &Path, target: &Path, on_event: F) -> Result<RotationReport>
    where
        F: FnMut(&RotationEvent),
    {
        self.run_at_with(source, target, Local::now().naive_local(), on_event)
    }

    /// Rotate as if the current time were `now`
    pub fn run_at(&self, source: &Path, target: &Path, now: NaiveDateTime) -> Result<RotationReport> {
        self.run_at_with(source, target, now, |_| {})
    }

    /// [`Rotator::run_at`] with an observer for each filesystem action
    pub fn run_at_with<F>(
        &self,
        source: &Path,
        target: &Path,
        now: NaiveDateTime,
        mut on_event: F,
    ) -> Result<RotationReport>
    where
        F: FnMut(&RotationEvent),
    {
        check_paths(source, target)?;

        let format = &self.options.format;
        let now = format.truncate(&now)?;
        let snapshot_name = format.format(&now)?;

        let mut report = RotationReport::default();
        for rule in self.options.schedule.rules() {
            let bucket =
                self.rotate_bucket(rule, source, target, now, &snapshot_name, &mut on_event)?;
            report.buckets.push(bucket);
        }

        Ok(report)
    }

    fn rotate_bucket(
        &self,
        rule: &RotationRule,
        source: &Path,
        target: &Path,
        now: NaiveDateTime,
        snapshot_name: &str,
        on_event: &mut dyn FnMut(&RotationEvent),
    ) -> Result<BucketReport> {
        let label = &rule.frequency.label;
        let bucket_dir = target.join(label);
        ensure_dir(&bucket_dir)?;

        let inventory = Inventory::scan(&bucket_dir, &self.options.format)?;
        let most_recent = inventory.most_recent().map(|s| s.taken_at);
        let due = is_due(now, &rule.frequency, most_recent);

        debug!(
            "Bucket {}: {} snapshots, most recent {:?}, due: {}",
            label,
            inventory.len(),
            most_recent,
            due
        );

        let created = if due {
            let snapshot_dir = bucket_dir.join(snapshot_name);
            on_event(&RotationEvent::Copying {
                from: source.to_path_buf(),
                to: snapshot_dir.clone(),
            });
            take_snapshot(source, &snapshot_dir)?;
            Some(snapshot_dir)
        } else {
            None
        };

        let outcome = if rule.retention == 0 {
            PruneOutcome::default()
        } else {
            let keep = if created.is_some() {
                usize::from(rule.retention - 1)
            } else {
                usize::from(rule.retention)
            };
            // A same-named snapshot was just overwritten, never prune it
            let candidates: Vec<Snapshot> = inventory
                .snapshots()
                .iter()
                .filter(|s| created.is_none() || s.name != snapshot_name)
                .cloned()
                .collect();
            prune_with(&bucket_dir, &candidates, keep, on_event)
        };

        Ok(BucketReport {
            label: label.clone(),
            bucket_dir,
            created,
            deleted: outcome.deleted,
            skipped: inventory.skipped().iter().map(|s| s.path.clone()).collect(),
            prune_failures: outcome.failures,
        })
    }
}

/// Delete all but the newest `keep` snapshots
///
/// `snapshots` must be sorted oldest first. Deletion is best effort: a
/// failure is recorded and the remaining deletions still run.
pub fn prune(bucket_dir: &Path, snapshots: &[Snapshot], keep: usize) -> PruneOutcome {
    prune_with(bucket_dir, snapshots, keep, &mut |_| {})
}

fn prune_with(
    bucket_dir: &Path,
    snapshots: &[Snapshot],
    keep: usize,
    on_event: &mut dyn FnMut(&RotationEvent),
) -> PruneOutcome {
    let mut outcome = PruneOutcome::default();
    let stale = snapshots.len().saturating_sub(keep);

    for snapshot in &snapshots[..stale] {
        let path = bucket_dir.join(&snapshot.name);
        info!("Deleting directory: {}", path.display());
        on_event(&RotationEvent::Deleting { path: path.clone() });

        match fs::remove_dir_all(&path) {
            Ok(()) => outcome.deleted.push(path),
            Err(e) => {
                warn!("Failed to delete {}: {}", path.display(), e);
                on_event(&RotationEvent::DeleteFailed {
                    path: path.clone(),
                    error: e.to_string(),
                });
                outcome.failures.push(PruneFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    outcome
}

/// Validate source and target before anything is touched
fn check_paths(source: &Path, target: &Path) -> Result<()> {
    if source == target {
        return Err(RotateError::InvalidArguments {
            source_path: source.to_path_buf(),
            target: target.to_path_buf(),
        });
    }

    let source_meta = fs::metadata(source).map_err(|_| RotateError::PathNotFound {
        role: PathRole::Source,
        path: source.to_path_buf(),
    })?;

    let target_meta = fs::metadata(target).map_err(|_| RotateError::PathNotFound {
        role: PathRole::Target,
        path: target.to_path_buf(),
    })?;

    if !target_meta.is_dir() {
        return Err(RotateError::NotADirectory {
            path: target.to_path_buf(),
        });
    }

    // Compared component-wise, so `foo` does not contain `foo2`
    if source_meta.is_dir() && target.starts_with(source) {
        return Err(RotateError::TargetInsideSource {
            source_path: source.to_path_buf(),
            target: target.to_path_buf(),
        });
    }

    Ok(())
}

fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!("Created bucket directory {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(RotateError::io("Failed to create bucket directory", path, e)),
    }
}

fn take_snapshot(source: &Path, snapshot_dir: &Path) -> Result<()> {
    let source_meta =
        fs::metadata(source).map_err(|e| RotateError::io("Failed to stat source", source, e))?;

    info!(
        "Copying from {} to {}",
        source.display(),
        snapshot_dir.display()
    );

    if source_meta.is_dir() {
        copy::copy_tree(source, snapshot_dir)
    } else {
        fs::create_dir_all(snapshot_dir)
            .map_err(|e| RotateError::io("Failed to create snapshot directory", snapshot_dir, e))?;
        copy::copy_file_into(source, snapshot_dir).map(|_| ())
    }
}
