mod commands;
mod input;
mod shutdown;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ranklock_core::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ranklock")]
#[command(about = "Half Sword rank checkpoint guard", version)]
struct Args {
    /// Configuration file (TOML); missing file falls back to defaults
    #[arg(short, long, default_value = "ranklock.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Attach to the game and guard rank/points (default)
    Watch,
    /// Take a manual save backup
    Backup,
    /// Restore a backup slot over the live saves
    Restore {
        /// Slot number (1 is the newest backup)
        #[arg(short, long, default_value_t = 2)]
        slot: u32,
    },
    /// Print the player's current rank and flags once
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ranklock=info".parse()?))
        .init();

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) => {
            if e.is_not_found() {
                info!("No config file at {:?}, using defaults", args.config);
            } else {
                warn!("Failed to load config: {}, using defaults", e);
            }
            Config::default()
        }
    };

    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => commands::watch::run(&config),
        Command::Backup => commands::saves::backup(&config),
        Command::Restore { slot } => commands::saves::restore(&config, slot),
        Command::Status => commands::status::run(&config),
    }
}
