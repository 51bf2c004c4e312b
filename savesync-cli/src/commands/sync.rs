//! `savesync sync`: back up both sides, then transfer.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use savesync_core::{config, Direction, TransferPreference};
use savesync_remote::SshConnector;
use savesync_sync::{pipeline, ScpTools, SyncEnv, SyncReport};

/// Arguments for `savesync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Configured game name (case-insensitive).
    pub game: String,

    /// push (local -> remote), pull (remote -> local) or backupLocal.
    pub direction: String,

    /// Set and save the game's remote directory before syncing.
    #[arg(long, value_name = "PATH")]
    pub remote_path: Option<String>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let direction: Direction = self.direction.parse()?;
        let home = super::home()?;
        let mut cfg = config::load_at(&home).context("failed to load config")?;

        if let Some(path) = self.remote_path.as_deref() {
            cfg.set_remote_path(&self.game, path)?;
            config::save_at(&home, &cfg).context("failed to save config")?;
        }
        let game = cfg
            .find_game(&self.game)
            .with_context(|| format!("unknown game '{}'; add it with `savesync game add`", self.game))?
            .clone();

        let env = SyncEnv {
            backup_root: config::backup_root_at(&home),
            remote: cfg.remote.clone(),
            preference: cfg.prefer_scp_tool,
            tools: match cfg.prefer_scp_tool {
                TransferPreference::ForceExternal => ScpTools::detect(),
                TransferPreference::Auto => ScpTools::default(),
            },
        };

        log::debug!("backup root: {}", env.backup_root.display());

        let connector = if direction == Direction::BackupLocal {
            None
        } else {
            if !cfg.remote.is_complete() {
                bail!("no remote host configured; run `savesync remote set --host <host> --user <user>`");
            }
            if game.remote_full_path.trim().is_empty() {
                bail!(
                    "game '{}' has no remote path; pass --remote-path or run `savesync game set-remote`",
                    game.name
                );
            }
            Some(SshConnector::new(cfg.remote.clone()))
        };

        let report = pipeline::run(&env, connector.as_ref(), &game, direction)
            .with_context(|| format!("{direction} failed for '{}'", game.name))?;
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    println!("{} {}", "✓".green(), report.confirmation());
    println!("  backup: {}", report.snapshot.root.display());
    if let Some(remote) = &report.resolved_remote {
        println!("  remote: {remote}");
    }
    for note in &report.notes {
        println!("  {} {note}", "!".yellow());
    }
}
