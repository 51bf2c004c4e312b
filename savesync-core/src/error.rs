//! Error types for savesync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors: problems the caller must fix before retrying.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading or writing the config store.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A direction token outside the accepted set.
    #[error("unrecognized direction '{token}'; expected one of: push, pull, backupLocal")]
    UnknownDirection { token: String },

    /// The game has no remote path configured.
    #[error("game '{game}' has no remote path configured; set one with `savesync game set-remote`")]
    MissingRemotePath { game: String },

    /// Remote host or user is not configured.
    #[error("remote host is not configured; run `savesync remote set --host <HOST> --user <USER>`")]
    MissingRemote,

    /// No game with this name (case-insensitive).
    #[error("no game named '{name}'")]
    GameNotFound { name: String },

    /// A game with this name already exists (case-insensitive).
    #[error("a game named '{name}' already exists")]
    DuplicateGame { name: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
