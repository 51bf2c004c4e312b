//! Transfer strategies.
//!
//! Both strategies replace the destination tree's contents with the source
//! tree's contents. A failure may leave the destination partially new, never
//! a merge of old and new.

pub mod external;
pub mod native;

use std::fmt;

use savesync_core::{Game, TransferPreference};

use crate::error::SyncError;
use external::ScpTools;

pub use external::ExternalTransport;
pub use native::NativeTransport;

/// Which strategy carried out a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// SFTP session.
    Native,
    /// `pscp` / `scp` subprocess.
    External,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Native => write!(f, "sftp"),
            TransportKind::External => write!(f, "external scp"),
        }
    }
}

/// What a transfer did besides succeeding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Remote path the transfer actually touched.
    pub resolved_remote: String,
    pub notes: Vec<String>,
}

/// One way of replacing one side's tree with the other's.
pub trait Transport {
    fn kind(&self) -> TransportKind;

    /// Replace the remote tree with `game.local_path`.
    fn push(&self, game: &Game, remote_dir: &str) -> Result<TransferOutcome, SyncError>;

    /// Replace `game.local_path` with the remote tree.
    fn pull(&self, game: &Game, remote_dir: &str) -> Result<TransferOutcome, SyncError>;
}

/// External only when asked for and a tool is installed; native otherwise.
pub fn select(preference: TransferPreference, tools: &ScpTools) -> TransportKind {
    match preference {
        TransferPreference::ForceExternal if tools.any() => TransportKind::External,
        TransferPreference::ForceExternal => {
            tracing::warn!("scp transfer requested but neither pscp nor scp is installed; using sftp");
            TransportKind::Native
        }
        TransferPreference::Auto => TransportKind::Native,
    }
}
