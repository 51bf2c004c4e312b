//! Timestamped safety snapshots.
//!
//! ## Layout
//!
//! ```text
//! <backup_root>/
//!   <game>_<YYYYMMDD_HHmmss>/
//!     local/           copy of the local save directory
//!     remote/          copy of the remote save directory (sync snapshots only)
//!     snapshot.json    manifest: timestamp, sources, notes
//! ```
//!
//! Every call allocates a fresh root. Snapshots are never rotated or
//! deleted here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use savesync_core::Game;
use savesync_remote::{probe, tree, RemoteFs};

use crate::error::{io_err, SyncError};
use crate::local_fs;

pub const SNAPSHOT_MANIFEST: &str = "snapshot.json";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One snapshot on disk. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub game: String,
    pub root: PathBuf,
    pub local: PathBuf,
    /// `None` for local-only snapshots.
    pub remote: Option<PathBuf>,
    pub timestamp: DateTime<Local>,
    pub local_files: usize,
    /// Remote path that was actually copied, when one existed.
    pub remote_source: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Snapshot only the local tree (the `backupLocal` direction).
///
/// A missing local directory is recorded as an empty `local/` plus a note.
pub fn snapshot_local(backup_root: &Path, game: &Game) -> Result<BackupSnapshot, SyncError> {
    let snapshot = begin(backup_root, game)?;
    finish(snapshot)
}

/// Snapshot the local tree and, when a session is given, the remote tree.
///
/// Fails with [`SyncError::Io`] before writing anything when the local
/// directory is missing or unreadable. A missing remote directory is
/// recorded as an empty `remote/` plus a note.
pub fn snapshot<F: RemoteFs + ?Sized>(
    backup_root: &Path,
    game: &Game,
    remote: Option<&F>,
) -> Result<BackupSnapshot, SyncError> {
    require_local_dir(&game.local_path)?;
    let mut snapshot = begin(backup_root, game)?;

    if let Some(fs) = remote {
        let remote_dir = game.remote_dir()?;
        let dest = snapshot.root.join("remote");
        std::fs::create_dir_all(&dest).map_err(|e| io_err(&dest, e))?;

        let probe = probe::exists(fs, &remote_dir);
        if probe.found {
            tree::download_dir(fs, &probe.resolved, &dest)?;
            tracing::info!("remote backup complete: {}", dest.display());
            snapshot.remote_source = Some(probe.resolved);
        } else {
            let mut note = format!("remote directory {remote_dir} does not exist; remote backup is empty");
            if let Some(e) = probe.last_error {
                note.push_str(&format!(" (last stat error: {e})"));
            }
            tracing::warn!("{note}");
            snapshot.notes.push(note);
        }
        snapshot.remote = Some(dest);
    }

    finish(snapshot)
}

/// Allocate the root and copy the local side.
fn begin(backup_root: &Path, game: &Game) -> Result<BackupSnapshot, SyncError> {
    let timestamp = Local::now();
    let root = allocate_root(backup_root, &game.name.0, &timestamp)?;
    let local = root.join("local");
    let mut notes = Vec::new();

    let local_files = if game.local_path.is_dir() {
        let n = local_fs::copy_tree(&game.local_path, &local)?;
        tracing::info!("local backup complete: {} ({n} files)", local.display());
        n
    } else {
        std::fs::create_dir_all(&local).map_err(|e| io_err(&local, e))?;
        let note = format!(
            "local directory {} does not exist; local backup is empty",
            game.local_path.display()
        );
        tracing::warn!("{note}");
        notes.push(note);
        0
    };

    Ok(BackupSnapshot {
        game: game.name.0.clone(),
        root,
        local,
        remote: None,
        timestamp,
        local_files,
        remote_source: None,
        notes,
    })
}

/// Fails with [`SyncError::Io`] unless `dir` is a readable directory.
pub(crate) fn require_local_dir(dir: &Path) -> Result<(), SyncError> {
    let meta = std::fs::metadata(dir).map_err(|e| io_err(dir, e))?;
    if !meta.is_dir() {
        return Err(io_err(
            dir,
            std::io::Error::other("not a directory"),
        ));
    }
    std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    Ok(())
}

fn finish(snapshot: BackupSnapshot) -> Result<BackupSnapshot, SyncError> {
    let path = snapshot.root.join(SNAPSHOT_MANIFEST);
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(&path, json).map_err(|e| io_err(&path, e))?;
    Ok(snapshot)
}

/// `<backup_root>/<game>_<timestamp>`, or `…_<timestamp>_<n>` if an earlier
/// snapshot in the same second already claimed the name.
fn allocate_root(
    backup_root: &Path,
    game_name: &str,
    timestamp: &DateTime<Local>,
) -> Result<PathBuf, SyncError> {
    std::fs::create_dir_all(backup_root).map_err(|e| io_err(backup_root, e))?;
    let base = format!(
        "{}_{}",
        sanitize_component(game_name),
        timestamp.format(TIMESTAMP_FORMAT)
    );
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            base.clone()
        } else {
            format!("{base}_{suffix}")
        };
        let candidate = backup_root.join(name);
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(io_err(&candidate, e)),
        }
    }
}

/// Replace characters that cannot appear in a directory name on common filesystems.
fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "game".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savesync_core::GameName;
    use savesync_remote::MemoryFs;
    use std::fs;
    use tempfile::TempDir;

    fn game(local: &Path, remote: &str) -> Game {
        Game {
            name: GameName::from("Hades"),
            local_path: local.to_path_buf(),
            remote_full_path: remote.to_string(),
        }
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_component("Baldur's Gate 3"), "Baldur's Gate 3");
        assert_eq!(sanitize_component("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_component("  "), "game");
    }

    #[test]
    fn root_name_uses_game_and_timestamp() {
        let tmp = TempDir::new().unwrap();
        let local = tmp.path().join("saves");
        fs::create_dir_all(&local).unwrap();
        fs::write(local.join("slot.sav"), b"1").unwrap();

        let snap = snapshot_local(&tmp.path().join("backups"), &game(&local, "")).unwrap();
        let name = snap.root.file_name().unwrap().to_string_lossy().into_owned();
        let expected = format!("Hades_{}", snap.timestamp.format(TIMESTAMP_FORMAT));
        assert!(name.starts_with(&expected), "{name} vs {expected}");
        assert_eq!(fs::read(snap.local.join("slot.sav")).unwrap(), b"1");
        assert!(snap.remote.is_none());
        assert!(snap.root.join(SNAPSHOT_MANIFEST).exists());
    }

    #[test]
    fn same_second_snapshots_never_collide() {
        let tmp = TempDir::new().unwrap();
        let backups = tmp.path().join("backups");
        let ts = Local::now();
        let a = allocate_root(&backups, "g", &ts).unwrap();
        let b = allocate_root(&backups, "g", &ts).unwrap();
        assert_ne!(a, b);
        assert!(b.to_string_lossy().ends_with("_1"));
    }

    #[test]
    fn missing_remote_dir_yields_empty_remote_and_note() {
        let tmp = TempDir::new().unwrap();
        let local = tmp.path().join("saves");
        fs::create_dir_all(&local).unwrap();
        let remote = MemoryFs::new();

        let snap = snapshot(&tmp.path().join("backups"), &game(&local, "/srv/hades"), Some(&remote))
            .unwrap();
        let remote_dir = snap.remote.clone().expect("remote subdir");
        assert!(remote_dir.is_dir());
        assert_eq!(fs::read_dir(&remote_dir).unwrap().count(), 0);
        assert!(snap.remote_source.is_none());
        assert!(snap.notes.iter().any(|n| n.contains("/srv/hades")));
    }

    #[test]
    fn remote_tree_is_copied_from_resolved_candidate() {
        let tmp = TempDir::new().unwrap();
        let local = tmp.path().join("saves");
        fs::create_dir_all(&local).unwrap();
        let remote = MemoryFs::new();
        remote.write_file("/C:/Saves/Hades/Profile1.sav", b"remote-profile");

        let snap = snapshot(
            &tmp.path().join("backups"),
            &game(&local, "C:\\Saves\\Hades"),
            Some(&remote),
        )
        .unwrap();
        assert_eq!(snap.remote_source.as_deref(), Some("/C:/Saves/Hades"));
        let copied = snap.remote.unwrap().join("Profile1.sav");
        assert_eq!(fs::read(copied).unwrap(), b"remote-profile");
    }

    #[test]
    fn missing_local_dir_is_noted_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let snap = snapshot_local(&tmp.path().join("backups"), &game(&tmp.path().join("gone"), ""))
            .unwrap();
        assert_eq!(snap.local_files, 0);
        assert!(snap.local.is_dir());
        assert_eq!(snap.notes.len(), 1);
    }

    #[test]
    fn transfer_snapshot_refuses_missing_local_dir() {
        let tmp = TempDir::new().unwrap();
        let backups = tmp.path().join("backups");
        let remote = MemoryFs::new();
        let err = snapshot(&backups, &game(&tmp.path().join("gone"), "/srv/hades"), Some(&remote))
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { ref path, .. } if path.ends_with("gone")), "got: {err}");
        assert!(!backups.exists(), "no snapshot root for a refused backup");
    }

    #[test]
    fn manifest_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let local = tmp.path().join("saves");
        fs::create_dir_all(&local).unwrap();
        let snap = snapshot_local(&tmp.path().join("backups"), &game(&local, "")).unwrap();
        let json = fs::read_to_string(snap.root.join(SNAPSHOT_MANIFEST)).unwrap();
        let loaded: BackupSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, snap);
    }
}
