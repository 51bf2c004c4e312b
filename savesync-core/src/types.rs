//! Domain types shared by every savesync crate.
//!
//! Local paths use `PathBuf`; remote paths stay `String` because they name
//! locations on another machine whose separator conventions are not ours.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a game entry. Lookups compare names case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameName(pub String);

impl GameName {
    /// Case-insensitive match against a user-supplied name.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for GameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for GameName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GameName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side overwrites which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Local overwrites remote.
    Push,
    /// Remote overwrites local.
    Pull,
    /// No transfer; snapshot the local tree only.
    BackupLocal,
}

impl Direction {
    /// Human-readable label used in confirmations.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Push => "local -> remote",
            Direction::Pull => "remote -> local",
            Direction::BackupLocal => "local backup only",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Push => write!(f, "push"),
            Direction::Pull => write!(f, "pull"),
            Direction::BackupLocal => write!(f, "backupLocal"),
        }
    }
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" | "upload" | "l2r" | "local2remote" => Ok(Direction::Push),
            "pull" | "download" | "r2l" | "remote2local" => Ok(Direction::Pull),
            "backuplocal" | "backup" | "localbackup" | "backup-only" | "backup_local" => {
                Ok(Direction::BackupLocal)
            }
            _ => Err(ConfigError::UnknownDirection {
                token: s.to_string(),
            }),
        }
    }
}

/// How transfers are carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransferPreference {
    /// Use the SFTP session.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    /// Shell out to `pscp`/`scp` when one is installed.
    #[serde(rename = "scp", alias = "external")]
    ForceExternal,
}

impl fmt::Display for TransferPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferPreference::Auto => write!(f, "auto"),
            TransferPreference::ForceExternal => write!(f, "scp"),
        }
    }
}

impl FromStr for TransferPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "sftp" => Ok(TransferPreference::Auto),
            "scp" | "pscp" | "external" => Ok(TransferPreference::ForceExternal),
            other => Err(format!(
                "unknown transfer preference '{other}'; expected: auto, scp"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A named pairing of one local directory and one remote directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub name: GameName,
    /// Absolute path of the local save directory.
    pub local_path: PathBuf,
    #[serde(default)]
    pub remote_full_path: String,
}

impl Game {
    /// The configured remote directory with backslashes turned into slashes.
    ///
    /// Fails with [`ConfigError::MissingRemotePath`] when the path is blank.
    pub fn remote_dir(&self) -> Result<String, ConfigError> {
        let cleaned = clean_remote_input(&self.remote_full_path);
        if cleaned.is_empty() {
            return Err(ConfigError::MissingRemotePath {
                game: self.name.0.clone(),
            });
        }
        Ok(cleaned)
    }
}

pub(crate) fn clean_remote_input(raw: &str) -> String {
    raw.trim().replace('\\', "/")
}

pub const DEFAULT_SSH_PORT: u16 = 22;

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// SSH endpoint and credentials. Opaque to the sync core.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl RemoteConfig {
    /// Port to dial; a stored `0` means the SSH default.
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_SSH_PORT
        } else {
            self.port
        }
    }

    /// Host and user are both set.
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && !self.user.trim().is_empty()
    }

    /// `user@host:port`, safe to log.
    pub fn describe(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.effective_port())
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Root of the on-disk configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub prefer_scp_tool: TransferPreference,
}

impl Config {
    /// Find a game by name, ignoring ASCII case.
    pub fn find_game(&self, name: &str) -> Result<&Game, ConfigError> {
        self.games
            .iter()
            .find(|g| g.name.matches(name))
            .ok_or_else(|| ConfigError::GameNotFound {
                name: name.to_string(),
            })
    }

    /// Register a new game. Names are unique ignoring case.
    pub fn add_game(&mut self, game: Game) -> Result<&Game, ConfigError> {
        if self.games.iter().any(|g| g.name.matches(&game.name.0)) {
            return Err(ConfigError::DuplicateGame { name: game.name.0 });
        }
        self.games.push(game);
        Ok(&self.games[self.games.len() - 1])
    }

    /// Fill in (or replace) a game's remote path.
    pub fn set_remote_path(&mut self, name: &str, raw: &str) -> Result<&Game, ConfigError> {
        let cleaned = clean_remote_input(raw);
        let game = self
            .games
            .iter_mut()
            .find(|g| g.name.matches(name))
            .ok_or_else(|| ConfigError::GameNotFound {
                name: name.to_string(),
            })?;
        if cleaned.is_empty() {
            return Err(ConfigError::MissingRemotePath {
                game: game.name.0.clone(),
            });
        }
        game.remote_full_path = cleaned;
        Ok(game)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn game(name: &str, remote: &str) -> Game {
        Game {
            name: GameName::from(name),
            local_path: PathBuf::from("/saves").join(name),
            remote_full_path: remote.to_string(),
        }
    }

    #[test]
    fn direction_display_is_canonical_token() {
        assert_eq!(Direction::Push.to_string(), "push");
        assert_eq!(Direction::BackupLocal.to_string(), "backupLocal");
        assert_eq!(Direction::Pull.label(), "remote -> local");
    }

    #[test]
    fn unknown_direction_names_valid_set() {
        let err = "sideways".parse::<Direction>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sideways"));
        assert!(msg.contains("push, pull, backupLocal"), "got: {msg}");
    }

    #[test]
    fn remote_port_zero_means_default() {
        let remote = RemoteConfig {
            host: "nas".into(),
            port: 0,
            user: "me".into(),
            password: "hunter2".into(),
        };
        assert_eq!(remote.effective_port(), 22);
        assert_eq!(remote.describe(), "me@nas:22");
    }

    #[test]
    fn remote_debug_masks_password() {
        let remote = RemoteConfig {
            host: "nas".into(),
            port: 2222,
            user: "me".into(),
            password: "hunter2".into(),
        };
        let dbg = format!("{remote:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn remote_dir_normalizes_backslashes() {
        let g = game("elden", "  C:\\Users\\me\\saves  ");
        assert_eq!(g.remote_dir().unwrap(), "C:/Users/me/saves");
    }

    #[test]
    fn blank_remote_dir_is_config_error() {
        let err = game("elden", "   ").remote_dir().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRemotePath { ref game } if game == "elden"));
    }

    #[test]
    fn find_game_ignores_case() {
        let mut cfg = Config::default();
        cfg.add_game(game("Hollow Knight", "/srv/hk")).unwrap();
        assert_eq!(cfg.find_game("hollow knight").unwrap().name.0, "Hollow Knight");
        assert!(matches!(
            cfg.find_game("celeste"),
            Err(ConfigError::GameNotFound { .. })
        ));
    }

    #[test]
    fn add_game_rejects_case_insensitive_duplicate() {
        let mut cfg = Config::default();
        cfg.add_game(game("Celeste", "/srv/celeste")).unwrap();
        let err = cfg.add_game(game("CELESTE", "/srv/other")).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateGame { .. }));
        assert_eq!(cfg.games.len(), 1);
    }

    #[test]
    fn set_remote_path_fills_missing_path() {
        let mut cfg = Config::default();
        cfg.add_game(game("celeste", "")).unwrap();
        let updated = cfg.set_remote_path("Celeste", "D:\\saves\\celeste").unwrap();
        assert_eq!(updated.remote_full_path, "D:/saves/celeste");
        assert!(cfg.set_remote_path("celeste", " ").is_err());
    }

    #[test]
    fn transfer_preference_serde_tokens() {
        let yaml = serde_yaml::to_string(&TransferPreference::ForceExternal).unwrap();
        assert_eq!(yaml.trim(), "scp");
        let parsed: TransferPreference = serde_yaml::from_str("external").unwrap();
        assert_eq!(parsed, TransferPreference::ForceExternal);
        assert_eq!(TransferPreference::default(), TransferPreference::Auto);
    }
}
