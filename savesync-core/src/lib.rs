//! savesync core library: domain types, config store, errors.
//!
//! - [`types`]: games, remote credentials, directions, transfer preference
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / save of the YAML config document

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    Config, Direction, Game, GameName, RemoteConfig, TransferPreference, DEFAULT_SSH_PORT,
};
