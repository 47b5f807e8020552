//! Manual backup and restore of save slots.

use anyhow::{Context, Result};
use ranklock_core::{Config, FileSaveBackup, SaveBackup};
use tracing::info;

pub fn backup(config: &Config) -> Result<()> {
    let service = FileSaveBackup::new(&config.save_dir, &config.backup_dir, config.backup_slots);
    service
        .backup()
        .with_context(|| format!("backing up saves from {:?}", config.save_dir))?;

    info!("Backed up saves to slot 1 under {:?}", config.backup_dir);
    Ok(())
}

pub fn restore(config: &Config, slot: u32) -> Result<()> {
    if slot == 0 || slot > config.backup_slots {
        anyhow::bail!(
            "slot must be between 1 and {} (got {})",
            config.backup_slots,
            slot
        );
    }

    let service = FileSaveBackup::new(&config.save_dir, &config.backup_dir, config.backup_slots);
    service
        .restore(slot)
        .with_context(|| format!("restoring slot {slot}"))?;

    info!("Restored slot {} over {:?}", slot, config.save_dir);
    Ok(())
}
