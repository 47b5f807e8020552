//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::memory::layout::timing;

/// Point losses inside this window are treated as a give-up the guard
/// corrects in place, rather than a legitimate loss. The exact boundary is
/// game policy, not something the memory layer can infer, so it stays
/// configurable.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PointLossWindow {
    pub min: i32,
    pub max: i32,
}

impl Default for PointLossWindow {
    fn default() -> Self {
        Self { min: 1, max: 2 }
    }
}

impl PointLossWindow {
    pub fn contains(&self, loss: i32) -> bool {
        loss >= self.min && loss <= self.max
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable name used for process discovery.
    pub process_name: String,
    /// Main module name used for base address resolution.
    pub module_name: String,
    /// Known-good game version; a mismatch warns but does not abort.
    pub game_version: String,

    /// Interval between scheduler ticks, in milliseconds.
    pub poll_interval_ms: u64,

    /// Directory the game writes its saves to.
    pub save_dir: PathBuf,
    /// Directory backup slots are kept under.
    pub backup_dir: PathBuf,
    /// Number of rotating backup slots.
    pub backup_slots: u32,
    /// Slot restored when a rank regression is detected.
    pub restore_slot: u32,

    /// Skip checkpointing rank gains made inside the abyss.
    pub guard_abyss: bool,
    /// Also watch current points (gauntlet mode give-up correction).
    pub watch_points: bool,
    pub point_loss: PointLossWindow,
}

impl Default for Config {
    fn default() -> Self {
        let local = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            process_name: "HalfSwordUE5-Win64-Shipping".to_string(),
            module_name: "HalfSwordUE5-Win64-Shipping.exe".to_string(),
            game_version: "5.4.4.0".to_string(),
            poll_interval_ms: timing::DEFAULT_POLL_INTERVAL_MS,
            save_dir: local.join("HalfSwordUE5").join("Saved").join("SaveGames"),
            backup_dir: local.join("Ranklock").join("backups"),
            backup_slots: 3,
            restore_slot: 2,
            guard_abyss: true,
            watch_points: true,
            point_loss: PointLossWindow::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Unset keys fall back to
    /// defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be non-zero".to_string()));
        }
        if self.backup_slots == 0 {
            return Err(Error::Config("backup_slots must be non-zero".to_string()));
        }
        if self.restore_slot == 0 || self.restore_slot > self.backup_slots {
            return Err(Error::Config(format!(
                "restore_slot must be between 1 and backup_slots ({})",
                self.backup_slots
            )));
        }
        if self.point_loss.min > self.point_loss.max {
            return Err(Error::Config(
                "point_loss.min must not exceed point_loss.max".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
