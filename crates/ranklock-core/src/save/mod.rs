//! Save-file backup slots with rotation and restore.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Boundary the event handlers call through. Implementations are expected to
/// be idempotent enough that a repeated backup or restore is harmless.
pub trait SaveBackup {
    fn backup(&self) -> Result<()>;

    fn restore(&self, slot: u32) -> Result<()>;
}

/// Per-slot metadata written next to the copied saves.
#[derive(Debug, Serialize, Deserialize)]
pub struct SlotManifest {
    pub created_at: DateTime<Local>,
    pub files: Vec<String>,
}

const MANIFEST_FILE: &str = "manifest.json";
const SAVE_EXTENSION: &str = "sav";

/// Filesystem-backed [`SaveBackup`].
///
/// `backup()` rotates the numbered slot directories (slot 1 is the newest,
/// each existing slot shifts one down, the oldest falls off) and then copies
/// the live `*.sav` files into slot 1. `restore(n)` copies slot `n` back
/// over the live saves. Restoring slot 2 therefore reverts past the backup
/// the game may have just overwritten.
pub struct FileSaveBackup {
    save_dir: PathBuf,
    backup_dir: PathBuf,
    slots: u32,
}

impl FileSaveBackup {
    pub fn new(save_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>, slots: u32) -> Self {
        Self {
            save_dir: save_dir.into(),
            backup_dir: backup_dir.into(),
            slots: slots.max(1),
        }
    }

    pub fn slot_dir(&self, slot: u32) -> PathBuf {
        self.backup_dir.join(format!("slot{slot}"))
    }

    fn rotate_slots(&self) -> Result<()> {
        for slot in (1..self.slots).rev() {
            let from = self.slot_dir(slot);
            if !from.exists() {
                continue;
            }
            let to = self.slot_dir(slot + 1);
            if to.exists() {
                fs::remove_dir_all(&to)?;
            }
            fs::rename(&from, &to)?;
        }
        Ok(())
    }

    fn copy_saves(from: &Path, to: &Path) -> Result<Vec<String>> {
        fs::create_dir_all(to)?;

        let mut copied = Vec::new();
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXTENSION) {
                continue;
            }
            let name = entry.file_name();
            fs::copy(&path, to.join(&name))?;
            copied.push(name.to_string_lossy().to_string());
        }
        copied.sort();
        Ok(copied)
    }
}

impl SaveBackup for FileSaveBackup {
    fn backup(&self) -> Result<()> {
        self.rotate_slots()?;

        let slot1 = self.slot_dir(1);
        let files = Self::copy_saves(&self.save_dir, &slot1)?;

        let manifest = SlotManifest {
            created_at: Local::now(),
            files,
        };
        fs::write(
            slot1.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        debug!(
            "Backed up {} save file(s) to {}",
            manifest.files.len(),
            slot1.display()
        );
        Ok(())
    }

    fn restore(&self, slot: u32) -> Result<()> {
        let slot_dir = self.slot_dir(slot);
        let mut restored = 0usize;

        for entry in fs::read_dir(&slot_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXTENSION) {
                continue;
            }
            fs::create_dir_all(&self.save_dir)?;
            fs::copy(&path, self.save_dir.join(entry.file_name()))?;
            restored += 1;
        }

        debug!("Restored {} save file(s) from slot {}", restored, slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_save(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    fn read_save(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn backup_copies_sav_files_and_writes_manifest() {
        let tmp = TempDir::new().unwrap();
        let saves = tmp.path().join("saves");
        let backups = tmp.path().join("backups");
        write_save(&saves, "Progress.sav", "rank5");
        write_save(&saves, "Equipment.sav", "sword");
        write_save(&saves, "notes.txt", "ignored");

        let service = FileSaveBackup::new(&saves, &backups, 3);
        service.backup().unwrap();

        let slot1 = service.slot_dir(1);
        assert_eq!(read_save(&slot1, "Progress.sav"), "rank5");
        assert_eq!(read_save(&slot1, "Equipment.sav"), "sword");
        assert!(!slot1.join("notes.txt").exists());

        let manifest: SlotManifest =
            serde_json::from_str(&fs::read_to_string(slot1.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest.files, vec!["Equipment.sav", "Progress.sav"]);
    }

    #[test]
    fn backup_rotates_slots() {
        let tmp = TempDir::new().unwrap();
        let saves = tmp.path().join("saves");
        let backups = tmp.path().join("backups");
        let service = FileSaveBackup::new(&saves, &backups, 3);

        for generation in ["first", "second", "third", "fourth"] {
            write_save(&saves, "Progress.sav", generation);
            service.backup().unwrap();
        }

        assert_eq!(read_save(&service.slot_dir(1), "Progress.sav"), "fourth");
        assert_eq!(read_save(&service.slot_dir(2), "Progress.sav"), "third");
        assert_eq!(read_save(&service.slot_dir(3), "Progress.sav"), "second");
        // "first" rotated off the end.
        assert!(!service.slot_dir(4).exists());
    }

    #[test]
    fn restore_copies_slot_back_over_live_saves() {
        let tmp = TempDir::new().unwrap();
        let saves = tmp.path().join("saves");
        let backups = tmp.path().join("backups");
        let service = FileSaveBackup::new(&saves, &backups, 3);

        write_save(&saves, "Progress.sav", "good");
        service.backup().unwrap();
        write_save(&saves, "Progress.sav", "good2");
        service.backup().unwrap();

        // The game wipes progress.
        write_save(&saves, "Progress.sav", "wiped");

        service.restore(2).unwrap();
        assert_eq!(read_save(&saves, "Progress.sav"), "good");
    }

    #[test]
    fn restore_missing_slot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let service = FileSaveBackup::new(
            tmp.path().join("saves"),
            tmp.path().join("backups"),
            3,
        );

        let err = service.restore(2).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn backup_of_missing_save_dir_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let service = FileSaveBackup::new(
            tmp.path().join("does-not-exist"),
            tmp.path().join("backups"),
            3,
        );

        assert!(service.backup().is_err());
    }
}
