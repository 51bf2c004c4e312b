//! Sync pipeline: resolve → test connection → backup → select → transfer.
//!
//! Every push or pull is preceded by a snapshot of both sides. A connection
//! failure aborts before the snapshot, so nothing is written locally for an
//! unreachable host. There are no retries.

use std::fmt;
use std::path::PathBuf;

use savesync_core::{ConfigError, Direction, Game, RemoteConfig, TransferPreference};
use savesync_remote::{probe, Connect};

use crate::backup::{self, BackupSnapshot};
use crate::error::SyncError;
use crate::transport::external::ScpTools;
use crate::transport::{self, ExternalTransport, NativeTransport, Transport, TransportKind};

/// Pipeline step, used in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveRemotePath,
    TestConnection,
    Backup,
    SelectTransport,
    Transfer,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::ResolveRemotePath => "resolve",
            Stage::TestConnection => "connect",
            Stage::Backup => "backup",
            Stage::SelectTransport => "select",
            Stage::Transfer => "transfer",
        };
        f.write_str(s)
    }
}

/// Everything a run needs besides the game and direction.
///
/// SFTP sessions come from the connector passed to [`run`]; `remote` is
/// only read when an external tool is spawned. Both must describe the same
/// host, which is why the CLI builds them from one [`RemoteConfig`].
/// [`ExternalTransport::new`] is only reached after [`transport::select`]
/// has seen a tool, so a missing tool never fails a run here.
#[derive(Debug, Clone)]
pub struct SyncEnv {
    pub backup_root: PathBuf,
    /// Login for `pscp`/`scp`: user, host, port and (pscp only) password.
    pub remote: RemoteConfig,
    pub preference: TransferPreference,
    pub tools: ScpTools,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub game: String,
    pub direction: Direction,
    pub snapshot: BackupSnapshot,
    /// `None` for `backupLocal`.
    pub transport: Option<TransportKind>,
    pub resolved_remote: Option<String>,
    /// Diagnostics from the snapshot and the transfer.
    pub notes: Vec<String>,
}

impl SyncReport {
    /// One-line confirmation naming the direction.
    pub fn confirmation(&self) -> String {
        match self.transport {
            Some(kind) => format!(
                "{} synced ({}) via {kind}",
                self.game,
                self.direction.label()
            ),
            None => format!("{}: {}", self.game, self.direction.label()),
        }
    }
}

/// Run one direction for one game.
///
/// `connector` may be `None` only for [`Direction::BackupLocal`]; the other
/// directions fail with [`ConfigError::MissingRemote`] without one.
pub fn run<C: Connect>(
    env: &SyncEnv,
    connector: Option<&C>,
    game: &Game,
    direction: Direction,
) -> Result<SyncReport, SyncError> {
    tracing::info!("{} {} ({})", direction, game.name, direction.label());

    if direction == Direction::BackupLocal {
        tracing::info!("[{}] local snapshot only", Stage::Backup);
        let snapshot = backup::snapshot_local(&env.backup_root, game)?;
        tracing::info!("[{}] {}", Stage::Backup, snapshot.root.display());
        return Ok(SyncReport {
            game: game.name.0.clone(),
            direction,
            notes: snapshot.notes.clone(),
            snapshot,
            transport: None,
            resolved_remote: None,
        });
    }

    // -- resolve ------------------------------------------------------------
    let connector = connector.ok_or(ConfigError::MissingRemote)?;
    let remote_dir = game.remote_dir()?;
    tracing::info!("[{}] remote directory {remote_dir}", Stage::ResolveRemotePath);

    // -- connect ------------------------------------------------------------
    {
        tracing::info!("[{}] {}", Stage::TestConnection, connector.describe());
        let session = connector.connect().map_err(SyncError::Connectivity)?;
        let probe = probe::exists(&session, &remote_dir);
        if probe.found {
            tracing::info!("[{}] remote directory found at {}", Stage::TestConnection, probe.resolved);
        } else {
            tracing::info!("[{}] remote directory not present yet", Stage::TestConnection);
        }
    }

    // -- backup -------------------------------------------------------------
    let snapshot = {
        let session = connector.connect().map_err(SyncError::Connectivity)?;
        backup::snapshot(&env.backup_root, game, Some(&session))?
    };
    tracing::info!("[{}] {}", Stage::Backup, snapshot.root.display());

    // -- select -------------------------------------------------------------
    let kind = transport::select(env.preference, &env.tools);
    tracing::info!("[{}] {kind}", Stage::SelectTransport);

    // -- transfer -----------------------------------------------------------
    let outcome = match kind {
        TransportKind::Native => transfer(&NativeTransport::new(connector), game, &remote_dir, direction)?,
        TransportKind::External => {
            let external = ExternalTransport::new(connector, &env.remote, &env.tools)?;
            transfer(&external, game, &remote_dir, direction)?
        }
    };
    tracing::info!("[{}] done: {}", Stage::Transfer, outcome.resolved_remote);

    let mut notes = snapshot.notes.clone();
    notes.extend(outcome.notes);
    Ok(SyncReport {
        game: game.name.0.clone(),
        direction,
        snapshot,
        transport: Some(kind),
        resolved_remote: Some(outcome.resolved_remote),
        notes,
    })
}

fn transfer<T: Transport>(
    transport: &T,
    game: &Game,
    remote_dir: &str,
    direction: Direction,
) -> Result<transport::TransferOutcome, SyncError> {
    match direction {
        Direction::Push => transport.push(game, remote_dir),
        Direction::Pull => transport.pull(game, remote_dir),
        Direction::BackupLocal => Ok(transport::TransferOutcome::default()),
    }
}
