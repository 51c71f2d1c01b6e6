//! Error types for rotation runs

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors raised while parsing a schedule or rotating snapshots
#[derive(Debug, Error)]
pub enum RotateError {
    /// A schedule token without exactly one `:` separator
    #[error("Colon delimiter not found in schedule token {token:?}")]
    MalformedToken { token: String },

    /// Frequency part is not `<integer><unit>`
    #[error("Frequency must be an integer followed by 'd', 'w', 'm', or 'y' (got {token:?})")]
    InvalidFrequency { token: String },

    /// Retention part is not an unsigned 16-bit integer
    #[error("Number of rotations to retain must be specified as an integer (got {token:?})")]
    InvalidRetention { token: String },

    /// Source and target resolve to the same path
    #[error("Target path {target:?} cannot be the same as the source path {source_path:?}")]
    InvalidArguments {
        source_path: PathBuf,
        target: PathBuf,
    },

    /// Target lies inside a source directory, so each copy would contain itself
    #[error("Target path {target:?} cannot be inside the source path {source_path:?}")]
    TargetInsideSource {
        source_path: PathBuf,
        target: PathBuf,
    },

    /// Source or target does not exist
    #[error("{role} path {path:?} does not exist")]
    PathNotFound { role: PathRole, path: PathBuf },

    /// Target exists but is not a directory
    #[error("Target path {path:?} must be a directory")]
    NotADirectory { path: PathBuf },

    /// Date format pattern cannot name and re-read snapshots
    #[error("Invalid date format {pattern:?}: {reason}")]
    InvalidDateFormat { pattern: String, reason: String },

    /// Filesystem failure during bucket creation, listing, or copying
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which command-line path a [`RotateError::PathNotFound`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Source,
    Target,
}

impl std::fmt::Display for PathRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathRole::Source => f.write_str("Source"),
            PathRole::Target => f.write_str("Target"),
        }
    }
}

impl RotateError {
    pub(crate) fn io(context: &'static str, path: &Path, source: io::Error) -> Self {
        RotateError::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for rotation operations
pub type Result<T> = std::result::Result<T, RotateError>;
