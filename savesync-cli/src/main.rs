//! savesync: mirror game save directories between this machine and an SSH host.
//!
//! # Usage
//!
//! ```text
//! savesync sync <game> <push|pull|backupLocal> [--remote-path <path>]
//! savesync game list
//! savesync game add <name> <local-dir> [--remote-path <path>]
//! savesync game set-remote <name> <path>
//! savesync remote set [--host H] [--port N] [--user U] [--password P] [--prefer auto|scp]
//! savesync remote show
//! savesync remote test
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{game::GameCommand, remote::RemoteCommand, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "savesync",
    version,
    about = "Back up and mirror game save directories over SSH",
    long_about = None,
)]
struct Cli {
    /// Log every remote operation (same as RUST_LOG=debug).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Snapshot both sides, then copy one side over the other.
    Sync(SyncArgs),

    /// Manage configured games.
    Game {
        #[command(subcommand)]
        command: GameCommand,
    },

    /// Manage the SSH host.
    Remote {
        #[command(subcommand)]
        command: RemoteCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Game { command } => commands::game::run(command),
        Commands::Remote { command } => commands::remote::run(command),
    }
}
