//! Filesystem helpers that attach the offending path to every error.
//!
//! All writes overwrite in place and all directory creation is idempotent,
//! so a generation run can be repeated over its own output.

use std::fs;
use std::path::{Path, PathBuf};

use lessonforge_common::error::{ForgeError, Result};
use walkdir::WalkDir;

/// Creates `path` and any missing parents.
///
/// # Errors
///
/// Returns [`ForgeError::Io`] if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| ForgeError::io(path, e))
}

/// Writes `contents` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns [`ForgeError::Io`] if a directory or the file cannot be written.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    tracing::debug!(path = %path.display(), bytes = contents.len(), "writing file");
    fs::write(path, contents).map_err(|e| ForgeError::io(path, e))
}

/// Serializes `value` as two-space-indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`ForgeError::Serialization`] or [`ForgeError::Io`].
pub fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    write_text(path, &rendered)
}

/// Copies one file, overwriting the destination.
///
/// # Errors
///
/// Returns [`ForgeError::Io`] naming whichever side failed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    tracing::debug!(src = %src.display(), dst = %dst.display(), "copying file");
    let _ = fs::copy(src, dst).map_err(|e| ForgeError::io(src, e))?;
    Ok(())
}

/// Recursively copies `src` into `dst`, merging with existing content.
///
/// Files present in both are overwritten; files only in `dst` are kept.
/// Returns the destination paths of every copied file, in sorted walk order.
///
/// # Errors
///
/// Returns [`ForgeError::Io`] if the walk, a directory creation, or a copy fails.
pub fn copy_dir_merge(src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            ForgeError::io(path, e.into())
        })?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Lists files under `root` whose extension is `ext`, at any depth, sorted.
///
/// # Errors
///
/// Returns [`ForgeError::Io`] if the walk fails.
pub fn find_files_with_extension(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ForgeError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), ext) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Whether `path` ends in `.<ext>`.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}
