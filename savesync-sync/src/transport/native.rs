//! Transfers over a single SFTP session.

use savesync_core::Game;
use savesync_remote::{probe, tree, Connect};

use crate::error::SyncError;
use crate::local_fs;
use crate::transport::{TransferOutcome, Transport, TransportKind};

/// Opens one session per transfer; it closes when the call returns.
pub struct NativeTransport<'a, C: Connect> {
    connector: &'a C,
}

impl<'a, C: Connect> NativeTransport<'a, C> {
    pub fn new(connector: &'a C) -> Self {
        Self { connector }
    }
}

impl<C: Connect> Transport for NativeTransport<'_, C> {
    fn kind(&self) -> TransportKind {
        TransportKind::Native
    }

    fn push(&self, game: &Game, remote_dir: &str) -> Result<TransferOutcome, SyncError> {
        // The remote is only cleared once the local side is known to be readable.
        local_fs::list_children(&game.local_path)?;
        let session = self.connector.connect()?;
        let target = tree::ensure_empty(&session, remote_dir)?;
        tracing::info!("uploading {} -> {target}", game.local_path.display());
        tree::upload_into(&session, &game.local_path, &target)?;
        Ok(TransferOutcome {
            resolved_remote: target,
            notes: Vec::new(),
        })
    }

    fn pull(&self, game: &Game, remote_dir: &str) -> Result<TransferOutcome, SyncError> {
        let session = self.connector.connect()?;
        let probe = probe::exists(&session, remote_dir);
        local_fs::reset_dir(&game.local_path)?;

        if !probe.found {
            let note = format!(
                "remote directory {remote_dir} does not exist; local directory was emptied and nothing was pulled"
            );
            tracing::warn!("{note}");
            return Ok(TransferOutcome {
                resolved_remote: probe.resolved,
                notes: vec![note],
            });
        }

        tracing::info!("downloading {} -> {}", probe.resolved, game.local_path.display());
        tree::download_dir(&session, &probe.resolved, &game.local_path)?;
        Ok(TransferOutcome {
            resolved_remote: probe.resolved,
            notes: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savesync_core::GameName;
    use savesync_remote::MemoryFs;
    use std::fs;
    use tempfile::TempDir;

    fn game(local: &std::path::Path) -> Game {
        Game {
            name: GameName::from("celeste"),
            local_path: local.to_path_buf(),
            remote_full_path: "/srv/celeste".into(),
        }
    }

    #[test]
    fn push_replaces_remote_contents() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("new.sav"), b"new").unwrap();
        let remote = MemoryFs::new();
        remote.write_file("/srv/celeste/stale.sav", b"old");

        let outcome = NativeTransport::new(&remote)
            .push(&game(tmp.path()), "/srv/celeste")
            .unwrap();
        assert_eq!(outcome.resolved_remote, "/srv/celeste");
        assert_eq!(remote.read_file("/srv/celeste/new.sav").as_deref(), Some(&b"new"[..]));
        assert!(remote.read_file("/srv/celeste/stale.sav").is_none());
    }

    #[test]
    fn push_fills_the_plain_candidate_it_emptied() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("new.sav"), b"new").unwrap();
        let remote = MemoryFs::new();
        remote.write_file("C:/saves/old.sav", b"old");

        let outcome = NativeTransport::new(&remote)
            .push(&game(tmp.path()), "C:/saves")
            .unwrap();
        assert_eq!(outcome.resolved_remote, "C:/saves");
        assert_eq!(remote.read_file("C:/saves/new.sav").as_deref(), Some(&b"new"[..]));
        assert!(remote.read_file("C:/saves/old.sav").is_none());
        assert!(!remote.is_dir("/C:/saves"), "payload went to the other spelling");
    }

    #[test]
    fn push_of_missing_local_dir_leaves_remote_alone() {
        let tmp = TempDir::new().unwrap();
        let remote = MemoryFs::new();
        remote.write_file("/srv/celeste/precious.sav", b"keep");

        let err = NativeTransport::new(&remote)
            .push(&game(&tmp.path().join("gone")), "/srv/celeste")
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
        assert_eq!(remote.read_file("/srv/celeste/precious.sav").as_deref(), Some(&b"keep"[..]));
        assert_eq!(remote.connections(), 0);
    }

    #[test]
    fn pull_replaces_local_contents() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("stale.sav"), b"old").unwrap();
        let remote = MemoryFs::new();
        remote.write_file("/srv/celeste/1/slot.sav", b"remote");

        NativeTransport::new(&remote)
            .pull(&game(tmp.path()), "/srv/celeste")
            .unwrap();
        assert!(!tmp.path().join("stale.sav").exists());
        assert_eq!(fs::read(tmp.path().join("1/slot.sav")).unwrap(), b"remote");
    }

    #[test]
    fn pull_of_missing_remote_empties_local_with_note() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("stale.sav"), b"old").unwrap();
        let remote = MemoryFs::new();

        let outcome = NativeTransport::new(&remote)
            .pull(&game(tmp.path()), "/srv/celeste")
            .unwrap();
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
        assert_eq!(outcome.notes.len(), 1);
    }
}
