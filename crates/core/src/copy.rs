//! Copying a source into a snapshot directory

use crate::error::{Result, RotateError};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively copy the directory `src` to `dst`
///
/// Directories are recreated, regular files are copied with their
/// permissions, and symlinks are recreated as links on Unix. Copying over an
/// earlier copy replaces entries whose kind changed or that are links.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            RotateError::io("Failed to read", &path, e.into())
        })?;

        let rel_path = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| {
                RotateError::io(
                    "Path outside of source",
                    entry.path(),
                    std::io::Error::other("not under source root"),
                )
            })?;
        let dest_path = dst.join(rel_path);
        let file_type = entry.file_type();

        clear_destination(&dest_path, file_type)?;

        if file_type.is_dir() {
            fs::create_dir_all(&dest_path)
                .map_err(|e| RotateError::io("Failed to create directory", &dest_path, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)
                .map_err(|e| RotateError::io("Failed to copy file", entry.path(), e))?;
        }
    }

    Ok(())
}

/// Remove whatever at `dest` would block a copy of an entry of `kind`
///
/// An existing directory is kept for a directory, an existing regular file
/// for a regular file. Links are always replaced so `fs::copy` never writes
/// through them.
fn clear_destination(dest: &Path, kind: fs::FileType) -> Result<()> {
    let existing = match fs::symlink_metadata(dest) {
        Ok(metadata) => metadata.file_type(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(RotateError::io("Failed to inspect", dest, e)),
    };

    let reusable = if kind.is_dir() {
        existing.is_dir()
    } else if kind.is_symlink() {
        false
    } else {
        existing.is_file()
    };
    if reusable {
        return Ok(());
    }

    let removed = if existing.is_dir() {
        fs::remove_dir_all(dest)
    } else {
        fs::remove_file(dest)
    };
    removed.map_err(|e| RotateError::io("Failed to replace", dest, e))
}

/// Copy the single file `src` into the existing directory `dir`
pub fn copy_file_into(src: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = src.file_name().ok_or_else(|| {
        RotateError::io(
            "Source has no file name",
            src,
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        )
    })?;
    let dest_path = dir.join(file_name);

    let kind = fs::metadata(src)
        .map_err(|e| RotateError::io("Failed to read", src, e))?
        .file_type();
    clear_destination(&dest_path, kind)?;
    fs::copy(src, &dest_path).map_err(|e| RotateError::io("Failed to copy file", src, e))?;

    Ok(dest_path)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target =
        fs::read_link(src).map_err(|e| RotateError::io("Failed to read symlink", src, e))?;
    std::os::unix::fs::symlink(&target, dst)
        .map_err(|e| RotateError::io("Failed to create symlink", dst, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    // Copy the link target's contents where links cannot be recreated
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| RotateError::io("Failed to copy file", src, e))
}
