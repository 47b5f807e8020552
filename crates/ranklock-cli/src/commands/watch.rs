//! Main watch mode: attach, verify version, guard the session.

use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;
use ranklock_core::{Config, Error, FileSaveBackup, MemoryReader, ProcessHandle, Ranklock};
use tracing::{info, warn};

use crate::input;
use crate::shutdown::ShutdownSignal;

pub fn run(config: &Config) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    info!("Ranklock {}", env!("CARGO_PKG_VERSION"));

    // Single attach attempt; the guard is pointless without a running game.
    let process = match ProcessHandle::find_and_open(&config.process_name, &config.module_name) {
        Ok(process) => process,
        Err(Error::ProcessNotFound(name)) => {
            println!(
                "{}",
                format!(
                    "WARNING: {name} is not running. Start the game, then restart this application."
                )
                .yellow()
            );
            println!("\nPress any key to quit.");
            input::wait_for_any_key();
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Attached to {} (pid {}, base {:#x})",
        config.process_name, process.pid, process.base_address
    );

    check_game_version(&process, &config.game_version);

    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&shutdown));
    println!("Guarding rank and points. Press Esc or q to quit.");

    let reader = MemoryReader::new(&process);
    let save = FileSaveBackup::new(&config.save_dir, &config.backup_dir, config.backup_slots);
    let guard = Ranklock::new(&reader, &save, config, process.base_address);

    let end = guard.run(|| process.is_alive(), |interval| shutdown.wait(interval))?;
    info!("Session ended: {end}");

    shutdown.trigger();
    Ok(())
}

/// Best-effort version compatibility check; a mismatch warns but never
/// blocks the session.
fn check_game_version(process: &ProcessHandle, expected: &str) {
    match process.file_version() {
        Ok(Some(version)) if version == expected => {
            info!("Game version {} matches", version);
        }
        Ok(Some(version)) => {
            println!(
                "{}",
                format!(
                    "WARNING: this tool targets game version {expected}, found {version}. \
                     Offsets may be wrong."
                )
                .yellow()
            );
        }
        Ok(None) => {
            warn!("Game executable carries no version resource");
        }
        Err(e) => {
            warn!("Failed to check game version: {}", e);
        }
    }
}
