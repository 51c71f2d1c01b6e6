//! Path helpers for the command line

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Directory containing the running executable
///
/// Used as the default for both source and target when they are omitted.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let dir = exe
        .parent()
        .context("Executable path has no parent directory")?;
    absolute(dir)
}

/// Make `path` absolute against the current directory and fold `.`/`..`
///
/// Symlinks are not resolved.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path {}", path.display()))?;
    Ok(normalize(&path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
