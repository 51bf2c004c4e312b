//! Recursive directory operations over a [`RemoteFs`].
//!
//! Creation and removal are best-effort: a segment that already exists or an
//! entry that is already gone is not a failure, and one undeletable entry
//! does not stop the rest of the sweep. Payload transfer is strict: any
//! failed upload or download aborts with an error.

use std::path::Path;

use crate::error::{local_err, RemoteError};
use crate::fs::RemoteFs;
use crate::probe;
use crate::remote_path::{self, join, normalize, primary};

/// Create `remote_dir` and every missing ancestor (`mkdir -p`).
///
/// Failures on individual segments are logged and ignored; a later operation
/// on the directory reports the real problem if it is still missing.
pub fn mkdir_all<F: RemoteFs + ?Sized>(fs: &F, remote_dir: &str) {
    let normalized = normalize(remote_dir);
    let mut cur = if normalized.starts_with('/') {
        "/".to_string()
    } else {
        String::new()
    };
    for seg in normalized.split('/').filter(|s| !s.is_empty()) {
        cur = join(&cur, seg);
        if fs.stat(&cur).is_ok() {
            continue;
        }
        if let Err(e) = fs.mkdir(&cur) {
            tracing::debug!("mkdir_all: ignoring failure at {cur}: {e}");
        }
    }
}

/// Delete everything inside `remote_dir`, leaving the directory itself.
///
/// Returns the number of entries that could not be removed. Only a failure
/// to list `remote_dir` itself is an error.
pub fn remove_recursive<F: RemoteFs + ?Sized>(
    fs: &F,
    remote_dir: &str,
) -> Result<usize, RemoteError> {
    let dir = normalize(remote_dir);
    let entries = fs.read_dir(&dir)?;
    let mut failed = 0;
    for entry in entries {
        let path = join(&dir, &entry.name);
        if entry.is_dir() {
            match remove_recursive(fs, &path) {
                Ok(n) => failed += n,
                Err(e) => {
                    tracing::warn!("cannot list {path}: {e}");
                    failed += 1;
                }
            }
            if let Err(e) = fs.remove_dir(&path) {
                tracing::warn!("cannot remove directory {path}: {e}");
                failed += 1;
            }
        } else if let Err(e) = fs.remove_file(&path) {
            tracing::warn!("cannot remove file {path}: {e}");
            failed += 1;
        }
    }
    Ok(failed)
}

/// Make sure `remote_dir` exists and is empty; return the path actually used.
///
/// An existing candidate is emptied in place. Otherwise the primary
/// candidate is created.
pub fn ensure_empty<F: RemoteFs + ?Sized>(fs: &F, remote_dir: &str) -> Result<String, RemoteError> {
    let probe = probe::exists(fs, remote_dir);
    let target = if probe.found {
        probe.resolved
    } else {
        let target = primary(remote_dir);
        tracing::info!("creating remote directory {target}");
        mkdir_all(fs, &target);
        target
    };
    let failed = remove_recursive(fs, &target)?;
    if failed > 0 {
        tracing::warn!("{failed} entr(ies) under {target} could not be removed");
    }
    Ok(target)
}

/// Upload the contents of `local_dir` into `remote_dir`.
///
/// `remote_dir` is resolved once: an existing candidate is reused, otherwise
/// the primary candidate is created. See [`upload_into`].
pub fn upload_dir<F: RemoteFs + ?Sized>(
    fs: &F,
    local_dir: &Path,
    remote_dir: &str,
) -> Result<(), RemoteError> {
    let probe = probe::exists(fs, remote_dir);
    let target = if probe.found {
        probe.resolved
    } else {
        primary(remote_dir)
    };
    upload_into(fs, local_dir, &target)
}

/// Upload the contents of `local_dir` into the already-resolved `remote_dir`.
///
/// The path is used exactly as given. The directory is created before any
/// child is written, and each subdirectory is fully uploaded before the next
/// sibling is visited.
pub fn upload_into<F: RemoteFs + ?Sized>(
    fs: &F,
    local_dir: &Path,
    remote_dir: &str,
) -> Result<(), RemoteError> {
    let entries = std::fs::read_dir(local_dir).map_err(|e| local_err(local_dir, e))?;
    mkdir_all(fs, remote_dir);
    for entry in entries {
        let entry = entry.map_err(|e| local_err(local_dir, e))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let remote_child = join(remote_dir, &name);
        let file_type = entry.file_type().map_err(|e| local_err(&path, e))?;
        if file_type.is_dir() {
            upload_into(fs, &path, &remote_child)?;
        } else {
            tracing::debug!("upload {} -> {remote_child}", path.display());
            fs.upload(&path, &remote_child)?;
        }
    }
    Ok(())
}

/// Download the contents of `remote_dir` into `local_dir`.
pub fn download_dir<F: RemoteFs + ?Sized>(
    fs: &F,
    remote_dir: &str,
    local_dir: &Path,
) -> Result<(), RemoteError> {
    std::fs::create_dir_all(local_dir).map_err(|e| local_err(local_dir, e))?;
    let dir = remote_path::normalize(remote_dir);
    for entry in fs.read_dir(&dir)? {
        let remote_child = join(&dir, &entry.name);
        let local_child = local_dir.join(&entry.name);
        if entry.is_dir() {
            download_dir(fs, &remote_child, &local_child)?;
        } else {
            tracing::debug!("download {remote_child} -> {}", local_child.display());
            fs.download(&remote_child, &local_child)?;
        }
    }
    Ok(())
}
