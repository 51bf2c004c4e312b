//! End-to-end pipeline runs against an in-memory remote.

use std::fs;
use std::path::Path;

use savesync_core::{ConfigError, Direction, Game, GameName, RemoteConfig, TransferPreference};
use savesync_remote::MemoryFs;
use savesync_sync::{run, ScpTools, SyncEnv, SyncError, TransportKind};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn env(home: &Path) -> SyncEnv {
    SyncEnv {
        backup_root: home.join("backups"),
        remote: RemoteConfig::default(),
        preference: TransferPreference::Auto,
        tools: ScpTools::default(),
    }
}

fn game(local: &Path, remote: &str) -> Game {
    Game {
        name: GameName::from("Hades"),
        local_path: local.to_path_buf(),
        remote_full_path: remote.to_string(),
    }
}

fn local_saves(home: &Path) -> std::path::PathBuf {
    let dir = home.join("saves");
    fs::create_dir_all(dir.join("profiles")).unwrap();
    fs::write(dir.join("Profile1.sav"), b"local-1").unwrap();
    fs::write(dir.join("profiles/meta.json"), b"{}").unwrap();
    dir
}

#[test]
fn push_snapshots_both_sides_before_overwriting_remote() {
    init_logging();
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::new();
    remote.write_file("/srv/hades/Profile1.sav", b"remote-old");
    remote.write_file("/srv/hades/orphan.sav", b"orphan");

    let report = run(&env(home.path()), Some(&remote), &game(&local, "/srv/hades"), Direction::Push)
        .unwrap();

    // The snapshot holds what was there before the push.
    let snap = &report.snapshot;
    assert_eq!(fs::read(snap.local.join("Profile1.sav")).unwrap(), b"local-1");
    let remote_copy = snap.remote.as_ref().unwrap();
    assert_eq!(fs::read(remote_copy.join("Profile1.sav")).unwrap(), b"remote-old");
    assert_eq!(fs::read(remote_copy.join("orphan.sav")).unwrap(), b"orphan");

    // The remote now mirrors local exactly.
    assert_eq!(
        remote.read_file("/srv/hades/Profile1.sav").as_deref(),
        Some(&b"local-1"[..])
    );
    assert_eq!(remote.read_file("/srv/hades/profiles/meta.json").as_deref(), Some(&b"{}"[..]));
    assert!(remote.read_file("/srv/hades/orphan.sav").is_none());

    assert_eq!(report.transport, Some(TransportKind::Native));
    assert!(report.confirmation().contains("local -> remote"));
    assert!(snap.timestamp <= chrono::Local::now());
}

#[test]
fn pull_replaces_local_tree() {
    init_logging();
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::new();
    remote.write_file("/C:/Saves/Hades/Profile2.sav", b"remote-2");

    let report = run(
        &env(home.path()),
        Some(&remote),
        &game(&local, "C:\\Saves\\Hades"),
        Direction::Pull,
    )
    .unwrap();

    assert_eq!(report.resolved_remote.as_deref(), Some("/C:/Saves/Hades"));
    assert_eq!(fs::read(local.join("Profile2.sav")).unwrap(), b"remote-2");
    assert!(!local.join("Profile1.sav").exists());
    assert!(!local.join("profiles").exists());
    // Local content survives in the snapshot.
    assert!(report.snapshot.local.join("profiles/meta.json").exists());
}

#[test]
fn pull_of_missing_remote_empties_local_and_notes_it() {
    init_logging();
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::new();

    let report = run(&env(home.path()), Some(&remote), &game(&local, "/srv/absent"), Direction::Pull)
        .unwrap();

    assert!(local.is_dir());
    assert_eq!(fs::read_dir(&local).unwrap().count(), 0);
    assert!(report.notes.iter().any(|n| n.contains("nothing was pulled")));
    assert!(report.notes.iter().any(|n| n.contains("remote backup is empty")));
}

#[test]
fn unreachable_remote_fails_before_any_backup() {
    init_logging();
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::unreachable();

    let err = run(&env(home.path()), Some(&remote), &game(&local, "/srv/hades"), Direction::Push)
        .unwrap_err();

    assert!(matches!(err, SyncError::Connectivity(_)), "got: {err}");
    assert!(!home.path().join("backups").exists());
    assert_eq!(fs::read(local.join("Profile1.sav")).unwrap(), b"local-1");
}

#[test]
fn backup_local_never_touches_the_remote() {
    init_logging();
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::unreachable();

    let report = run(&env(home.path()), Some(&remote), &game(&local, ""), Direction::BackupLocal)
        .unwrap();

    assert_eq!(remote.connections(), 0);
    assert!(report.transport.is_none());
    assert!(report.snapshot.remote.is_none());
    assert_eq!(report.snapshot.local_files, 2);
}

#[test]
fn blank_remote_path_is_a_config_error_without_connecting() {
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::new();

    let err = run(&env(home.path()), Some(&remote), &game(&local, "  "), Direction::Pull)
        .unwrap_err();

    assert!(
        matches!(err, SyncError::Config(ConfigError::MissingRemotePath { .. })),
        "got: {err}"
    );
    assert_eq!(remote.connections(), 0);
}

#[test]
fn missing_connector_is_a_config_error() {
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());

    let err = run::<MemoryFs>(&env(home.path()), None, &game(&local, "/srv/hades"), Direction::Push)
        .unwrap_err();
    assert!(matches!(err, SyncError::Config(ConfigError::MissingRemote)));
}

#[test]
fn consecutive_runs_get_distinct_snapshots() {
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::new();
    let g = game(&local, "/srv/hades");

    let a = run(&env(home.path()), Some(&remote), &g, Direction::Push).unwrap();
    let b = run(&env(home.path()), Some(&remote), &g, Direction::Push).unwrap();
    assert_ne!(a.snapshot.root, b.snapshot.root);
    assert!(a.snapshot.root.exists() && b.snapshot.root.exists());
}

#[test]
fn push_with_missing_local_dir_fails_before_touching_remote() {
    init_logging();
    let home = TempDir::new().unwrap();
    let remote = MemoryFs::new();
    remote.write_file("/srv/hades/precious.sav", b"keep-me");

    let err = run(
        &env(home.path()),
        Some(&remote),
        &game(&home.path().join("gone"), "/srv/hades"),
        Direction::Push,
    )
    .unwrap_err();

    assert!(matches!(err, SyncError::Io { ref path, .. } if path.ends_with("gone")), "got: {err}");
    assert_eq!(
        remote.read_file("/srv/hades/precious.sav").as_deref(),
        Some(&b"keep-me"[..])
    );
    assert!(!home.path().join("backups").exists());
}

#[test]
fn pull_with_missing_local_dir_fails_at_backup() {
    let home = TempDir::new().unwrap();
    let remote = MemoryFs::new();
    remote.write_file("/srv/hades/Profile1.sav", b"remote");

    let err = run(
        &env(home.path()),
        Some(&remote),
        &game(&home.path().join("gone"), "/srv/hades"),
        Direction::Pull,
    )
    .unwrap_err();

    assert!(matches!(err, SyncError::Io { .. }), "got: {err}");
    assert!(!home.path().join("gone").exists());
}

#[test]
fn push_into_existing_plain_drive_path_stays_there() {
    init_logging();
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::new();
    remote.write_file("C:/saves/old.sav", b"old");

    let report = run(&env(home.path()), Some(&remote), &game(&local, "C:/saves"), Direction::Push)
        .unwrap();

    assert_eq!(report.resolved_remote.as_deref(), Some("C:/saves"));
    assert_eq!(remote.read_file("C:/saves/Profile1.sav").as_deref(), Some(&b"local-1"[..]));
    assert_eq!(remote.read_file("C:/saves/profiles/meta.json").as_deref(), Some(&b"{}"[..]));
    assert!(remote.read_file("C:/saves/old.sav").is_none());
    assert!(!remote.is_dir("/C:/saves"));
}

#[test]
fn forced_external_without_tools_falls_back_to_sftp() {
    let home = TempDir::new().unwrap();
    let local = local_saves(home.path());
    let remote = MemoryFs::new();
    let forced = SyncEnv {
        preference: TransferPreference::ForceExternal,
        ..env(home.path())
    };

    let report = run(&forced, Some(&remote), &game(&local, "/srv/hades"), Direction::Push).unwrap();

    assert_eq!(report.transport, Some(TransportKind::Native));
    assert_eq!(remote.read_file("/srv/hades/Profile1.sav").as_deref(), Some(&b"local-1"[..]));
}
