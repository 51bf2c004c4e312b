//! `savesync remote set | show | test`

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use savesync_core::{config, TransferPreference};
use savesync_remote::{probe, Connect, SshConnector};

/// Manage the SSH host.
#[derive(Subcommand, Debug)]
pub enum RemoteCommand {
    /// Update host, credentials or transfer preference. Omitted flags keep their value.
    Set(SetArgs),

    /// Print the remote settings with the password hidden.
    Show,

    /// Connect once and check every game's remote directory.
    Test,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[arg(long)]
    pub host: Option<String>,

    /// SSH port; 0 means 22.
    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub user: Option<String>,

    /// Stored in the config file (mode 0600). Empty means use the SSH agent.
    #[arg(long)]
    pub password: Option<String>,

    /// auto (sftp) or scp (pscp/scp when installed).
    #[arg(long, value_name = "auto|scp")]
    pub prefer: Option<TransferPreference>,
}

pub fn run(cmd: RemoteCommand) -> Result<()> {
    match cmd {
        RemoteCommand::Set(args) => set(args),
        RemoteCommand::Show => show(),
        RemoteCommand::Test => test(),
    }
}

fn set(args: SetArgs) -> Result<()> {
    let home = super::home()?;
    let mut cfg = config::load_at(&home).context("failed to load config")?;

    if let Some(host) = args.host {
        cfg.remote.host = host.trim().to_string();
    }
    if let Some(port) = args.port {
        cfg.remote.port = port;
    }
    if let Some(user) = args.user {
        cfg.remote.user = user.trim().to_string();
    }
    if let Some(password) = args.password {
        cfg.remote.password = password;
    }
    if let Some(prefer) = args.prefer {
        cfg.prefer_scp_tool = prefer;
    }
    config::save_at(&home, &cfg).context("failed to save config")?;

    println!("✓ Remote set to {}", cfg.remote.describe());
    Ok(())
}

fn show() -> Result<()> {
    let cfg = config::load_at(&super::home()?).context("failed to load config")?;
    let r = &cfg.remote;
    let or_unset = |s: &str| {
        if s.is_empty() {
            "(not set)".dimmed().to_string()
        } else {
            s.to_string()
        }
    };
    println!("host:     {}", or_unset(&r.host));
    println!("port:     {}", r.effective_port());
    println!("user:     {}", or_unset(&r.user));
    println!(
        "password: {}",
        if r.password.is_empty() {
            "(not set, using ssh agent)".dimmed().to_string()
        } else {
            "***".to_string()
        }
    );
    println!("transfer: {}", cfg.prefer_scp_tool);
    Ok(())
}

fn test() -> Result<()> {
    let cfg = config::load_at(&super::home()?).context("failed to load config")?;
    if !cfg.remote.is_complete() {
        bail!("no remote host configured; run `savesync remote set --host <host> --user <user>`");
    }

    let connector = SshConnector::new(cfg.remote.clone());
    let session = connector
        .connect()
        .with_context(|| format!("cannot connect to {}", connector.describe()))?;
    println!("{} connected to {}", "✓".green(), connector.describe());

    for game in &cfg.games {
        let Ok(remote_dir) = game.remote_dir() else {
            println!("  {} {}: remote path not set", "-".dimmed(), game.name);
            continue;
        };
        let probe = probe::exists(&session, &remote_dir);
        if probe.found {
            println!("  {} {}: {}", "✓".green(), game.name, probe.resolved);
        } else {
            println!("  {} {}: {remote_dir} not found", "✗".red(), game.name);
        }
    }
    Ok(())
}
