//! `savesync game list | add | set-remote`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use savesync_core::{config, Game, GameName};

/// Manage configured games.
#[derive(Subcommand, Debug)]
pub enum GameCommand {
    /// List configured games.
    List,

    /// Register a game's local save directory.
    Add(AddArgs),

    /// Set the remote save directory of a game.
    SetRemote {
        /// Game name (case-insensitive).
        name: String,
        /// Remote directory, e.g. `C:\Users\me\Saved Games\Hades`.
        path: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Unique game name.
    pub name: String,

    /// Local save directory; created if missing.
    pub local: PathBuf,

    /// Remote save directory.
    #[arg(long, value_name = "PATH")]
    pub remote_path: Option<String>,
}

#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "game")]
    name: String,
    #[tabled(rename = "local")]
    local: String,
    #[tabled(rename = "remote")]
    remote: String,
}

pub fn run(cmd: GameCommand) -> Result<()> {
    match cmd {
        GameCommand::List => list(),
        GameCommand::Add(args) => add(args),
        GameCommand::SetRemote { name, path } => set_remote(&name, &path),
    }
}

fn list() -> Result<()> {
    let cfg = config::load_at(&super::home()?).context("failed to load config")?;
    if cfg.games.is_empty() {
        println!("No games configured.");
        println!("Run: savesync game add <name> <local-dir>");
        return Ok(());
    }

    let rows = cfg.games.iter().map(|g| GameRow {
        name: g.name.0.clone(),
        local: g.local_path.display().to_string(),
        remote: if g.remote_full_path.is_empty() {
            "(not set)".to_string()
        } else {
            g.remote_full_path.clone()
        },
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn add(args: AddArgs) -> Result<()> {
    let home = super::home()?;
    let mut cfg = config::load_at(&home).context("failed to load config")?;

    std::fs::create_dir_all(&args.local)
        .with_context(|| format!("failed to create {}", args.local.display()))?;
    let local_path = args
        .local
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", args.local.display()))?;

    let game = Game {
        name: GameName::from(args.name.trim()),
        local_path,
        remote_full_path: String::new(),
    };
    let name = game.name.0.clone();
    cfg.add_game(game)?;
    if let Some(path) = args.remote_path.as_deref() {
        cfg.set_remote_path(&name, path)?;
    }
    config::save_at(&home, &cfg).context("failed to save config")?;

    let added = cfg.find_game(&name)?;
    println!("✓ Added '{}' ({})", added.name, added.local_path.display());
    if added.remote_full_path.is_empty() {
        println!("  remote path not set; run `savesync game set-remote {name} <path>`");
    }
    Ok(())
}

fn set_remote(name: &str, path: &str) -> Result<()> {
    let home = super::home()?;
    let mut cfg = config::load_at(&home).context("failed to load config")?;
    let game = cfg.set_remote_path(name, path)?;
    println!("✓ '{}' remote path: {}", game.name, game.remote_full_path);
    config::save_at(&home, &cfg).context("failed to save config")?;
    Ok(())
}
