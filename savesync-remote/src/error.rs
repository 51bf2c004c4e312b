//! Error types for savesync-remote.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Remote filesystem operation, carried in errors for context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    Stat,
    ReadDir,
    Mkdir,
    RemoveFile,
    RemoveDir,
    Upload,
    Download,
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RemoteOp::Stat => "stat",
            RemoteOp::ReadDir => "readdir",
            RemoteOp::Mkdir => "mkdir",
            RemoteOp::RemoveFile => "unlink",
            RemoteOp::RemoveDir => "rmdir",
            RemoteOp::Upload => "upload",
            RemoteOp::Download => "download",
        };
        f.write_str(s)
    }
}

/// All errors that can arise from talking to the remote side.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// TCP connect failed or timed out on every resolved address.
    #[error("cannot reach {addr}: {source}")]
    Unreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// SSH session setup failed after the TCP connection was established.
    #[error("SSH handshake with {addr} failed: {source}")]
    Handshake {
        addr: String,
        #[source]
        source: ssh2::Error,
    },

    /// The server rejected the credentials.
    #[error("authentication as '{user}' failed")]
    Auth {
        user: String,
        #[source]
        source: Option<ssh2::Error>,
    },

    /// An SFTP request failed.
    #[error("remote {op} failed at {path}: {source}")]
    Sftp {
        op: RemoteOp,
        path: String,
        #[source]
        source: ssh2::Error,
    },

    /// A remote operation failed with an I/O error (stream copy, in-memory remote).
    #[error("remote {op} failed at {path}: {source}")]
    Io {
        op: RemoteOp,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing the local side of a transfer failed.
    #[error("local I/O error at {path}: {source}")]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// Failures that mean the host could not be reached or logged into.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            RemoteError::Unreachable { .. } | RemoteError::Handshake { .. } | RemoteError::Auth { .. }
        )
    }
}

pub(crate) fn sftp_err(op: RemoteOp, path: &str, source: ssh2::Error) -> RemoteError {
    RemoteError::Sftp {
        op,
        path: path.to_string(),
        source,
    }
}

pub(crate) fn remote_io_err(op: RemoteOp, path: &str, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        op,
        path: path.to_string(),
        source,
    }
}

pub(crate) fn local_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Local {
        path: path.into(),
        source,
    }
}
