//! Typed view over the player object in target memory.

use crate::error::Result;
use crate::memory::{ReadMemory, WriteMemory};
use crate::offset::PlayerOffsets;

/// Read/write facade over the player's fields.
///
/// Not pollable itself; event handlers use it to read auxiliary state and
/// write corrective values. Every accessor is one delegated memory
/// operation, so two reads in the same tick may observe the target
/// mid-update. Callers decide on magnitude and direction of change, never
/// on cross-field consistency.
pub struct Player<'a, R: ?Sized> {
    mem: &'a R,
    offsets: PlayerOffsets,
}

impl<R: ?Sized> Clone for Player<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for Player<'_, R> {}

impl<'a, R: ReadMemory + WriteMemory + ?Sized> Player<'a, R> {
    pub fn new(mem: &'a R, module_base: u64) -> Self {
        Self {
            mem,
            offsets: PlayerOffsets::new(module_base),
        }
    }

    pub fn rank(&self) -> Result<i32> {
        self.mem.read_i32(self.offsets.rank())
    }

    pub fn set_rank(&self, rank: i32) -> Result<()> {
        self.mem.write_i32(self.offsets.rank(), rank)
    }

    pub fn points(&self) -> Result<i32> {
        self.mem.read_i32(self.offsets.points())
    }

    pub fn set_points(&self, points: i32) -> Result<()> {
        self.mem.write_i32(self.offsets.points(), points)
    }

    pub fn is_dead(&self) -> Result<bool> {
        self.mem.read_bool(self.offsets.is_dead())
    }

    /// Whether the player is inside the abyss, where rank gains are not
    /// checkpointed.
    pub fn is_in_abyss(&self) -> Result<bool> {
        self.mem.read_bool(self.offsets.is_in_abyss())
    }

    pub fn gauntlet_mode_enabled(&self) -> Result<bool> {
        self.mem.read_bool(self.offsets.gauntlet_mode())
    }
}
