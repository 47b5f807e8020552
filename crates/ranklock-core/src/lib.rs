//! # ranklock-core
//!
//! Core library for the Ranklock checkpoint guard.
//!
//! This crate provides:
//! - Windows process memory reading and writing
//! - Edge-triggered memory watchers driven by a sequential update scheduler
//! - Typed facades over the game's player and session state
//! - Save-file backup slots with rotation and restore

pub mod config;
pub mod error;
pub mod game;
pub mod memory;
pub mod offset;
pub mod ranklock;
pub mod save;

pub use config::{Config, PointLossWindow};
pub use error::{Error, Result};
pub use game::{GameState, Player};
pub use memory::{
    ChangeEvent, EventDisposition, MemoryReader, MemoryValue, MemoryWatcher, ProcessHandle,
    ReadMemory, UpdateScheduler, UpdateStatus, Updatable, WriteMemory,
};
pub use offset::{GameModeOffsets, PlayerOffsets, StateOffsets};
pub use ranklock::{Ranklock, SessionCheckpoint, SessionEnd};
pub use save::{FileSaveBackup, SaveBackup};
