//! Local directory helpers.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{io_err, SyncError};

/// Copy every entry under `src` into `dst`, creating `dst` first.
///
/// Existing files in `dst` with the same relative path are overwritten.
/// Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize, SyncError> {
    std::fs::create_dir_all(dst).map_err(|e| io_err(dst, e))?;
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            io_err(path, e.into())
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| io_err(entry.path(), e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Leave `dir` existing and empty, whatever was there before.
pub fn reset_dir(dir: &Path) -> Result<(), SyncError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))
}

/// Immediate children of `dir`, sorted by name.
pub fn list_children(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut children = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| io_err(dir, e)))
        .collect::<Result<Vec<_>, _>>()?;
    children.sort();
    Ok(children)
}
