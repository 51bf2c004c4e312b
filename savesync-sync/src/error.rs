//! Error types for savesync-sync.

use std::path::PathBuf;

use thiserror::Error;

use savesync_core::ConfigError;
use savesync_remote::RemoteError;

/// Failures of the external copy tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Neither `pscp` nor `scp` is on `PATH`.
    #[error("neither pscp nor scp was found on PATH")]
    NotFound,

    /// The tool could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully. `code` is `None` when the
    /// process was killed by a signal.
    #[error("{program} exited with {}", exit_label(.code))]
    Exit { program: PathBuf, code: Option<i32> },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// All errors that can abort a sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or invalid configuration; fix it before retrying.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The remote host could not be reached or rejected the login.
    #[error("connection failed: {0}")]
    Connectivity(#[source] RemoteError),

    /// A remote operation failed while moving payload data.
    #[error("remote operation failed: {0}")]
    Remote(#[source] RemoteError),

    /// The external copy tool was missing or failed.
    #[error("external copy failed: {0}")]
    Tool(#[from] ToolError),

    /// The snapshot manifest could not be serialized.
    #[error("failed to encode snapshot manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A local filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<RemoteError> for SyncError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Local { path, source } => SyncError::Io { path, source },
            e if e.is_connectivity() => SyncError::Connectivity(e),
            e => SyncError::Remote(e),
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
