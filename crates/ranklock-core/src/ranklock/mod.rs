//! Session controller for the checkpoint guard.
//!
//! Wires the rank and points watchers to their handlers, owns the session
//! checkpoint, and drives the scheduler loop until the target process exits,
//! every watcher detaches, or shutdown is requested.

mod handlers;

pub use handlers::{points_handler, rank_handler};

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::game::Player;
use crate::memory::{MemoryWatcher, ReadMemory, UpdateScheduler, WriteMemory};
use crate::offset::GameModeOffsets;
use crate::save::SaveBackup;

/// Last known-good rank/points snapshot.
///
/// Seeded once at session start after the initial backup; overwritten only
/// on confirmed forward progress. Shared by the handlers on the single
/// driving thread.
#[derive(Debug)]
pub struct SessionCheckpoint {
    rank: Cell<i32>,
    points: Cell<i32>,
}

impl SessionCheckpoint {
    pub fn new(rank: i32, points: i32) -> Self {
        Self {
            rank: Cell::new(rank),
            points: Cell::new(points),
        }
    }

    pub fn rank(&self) -> i32 {
        self.rank.get()
    }

    pub fn set_rank(&self, rank: i32) {
        self.rank.set(rank);
    }

    pub fn points(&self) -> i32 {
        self.points.get()
    }

    pub fn set_points(&self, points: i32) {
        self.points.set(points);
    }
}

/// Why a session loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionEnd {
    #[strum(serialize = "target process exited")]
    ProcessExited,
    #[strum(serialize = "all watchers detached")]
    AllWatchersDetached,
    #[strum(serialize = "shutdown requested")]
    ShutdownRequested,
}

/// One monitoring session against an attached process.
pub struct Ranklock<'a, R: ReadMemory + WriteMemory + ?Sized, S: SaveBackup + ?Sized> {
    mem: &'a R,
    save: &'a S,
    config: &'a Config,
    module_base: u64,
}

impl<'a, R: ReadMemory + WriteMemory + ?Sized, S: SaveBackup + ?Sized> Ranklock<'a, R, S> {
    pub fn new(mem: &'a R, save: &'a S, config: &'a Config, module_base: u64) -> Self {
        Self {
            mem,
            save,
            config,
            module_base,
        }
    }

    /// Run the session loop.
    ///
    /// `alive` is checked once per tick; `wait` blocks between ticks and
    /// returns `true` when shutdown was requested. Both cancellation paths
    /// are cooperative: nothing interrupts a poll mid-step.
    ///
    /// The initial backup and checkpoint seed are fatal on failure: a
    /// session that cannot protect its starting state must not run.
    pub fn run(
        &self,
        alive: impl Fn() -> bool,
        mut wait: impl FnMut(Duration) -> bool,
    ) -> Result<SessionEnd> {
        let player = Player::new(self.mem, self.module_base);

        self.save.backup()?;
        let checkpoint = Rc::new(SessionCheckpoint::new(player.rank()?, player.points()?));
        info!(
            "Session started: rank {}, points {}",
            checkpoint.rank(),
            checkpoint.points()
        );

        let offsets = GameModeOffsets::new(self.module_base);
        let mut scheduler = UpdateScheduler::new();

        let mut rank_watcher: MemoryWatcher<'_, i32, R> =
            MemoryWatcher::new("Rank", self.mem, offsets.available_rank())?;
        rank_watcher.on_change(rank_handler(
            player,
            self.save,
            Rc::clone(&checkpoint),
            self.config.guard_abyss,
            self.config.restore_slot,
        ));
        scheduler.register(rank_watcher);

        if self.config.watch_points {
            let mut points_watcher: MemoryWatcher<'_, i32, R> =
                MemoryWatcher::new("Points", self.mem, offsets.current_points())?;
            points_watcher.on_change(points_handler(
                player,
                self.save,
                Rc::clone(&checkpoint),
                self.config.point_loss,
            ));
            scheduler.register(points_watcher);
        }

        loop {
            if !alive() {
                return Ok(SessionEnd::ProcessExited);
            }

            if scheduler.tick() == 0 {
                return Ok(SessionEnd::AllWatchersDetached);
            }

            if wait(self.config.poll_interval()) {
                return Ok(SessionEnd::ShutdownRequested);
            }
        }
    }
}
