//! Pure resolvers from a module base address to absolute field addresses.
//!
//! One resolver per game-object type. Addresses are computed once at attach
//! time and never change afterwards; relocation of the main module at
//! runtime is out of scope.

use crate::memory::layout;

/// Addresses of the game-mode fields the watchers poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameModeOffsets {
    base: u64,
}

impl GameModeOffsets {
    pub fn new(module_base: u64) -> Self {
        Self { base: module_base }
    }

    pub fn available_rank(&self) -> u64 {
        self.base + layout::game_mode::AVAILABLE_RANK
    }

    pub fn current_points(&self) -> u64 {
        self.base + layout::game_mode::CURRENT_POINTS
    }
}

/// Addresses of the player object fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerOffsets {
    base: u64,
}

impl PlayerOffsets {
    pub fn new(module_base: u64) -> Self {
        Self { base: module_base }
    }

    pub fn rank(&self) -> u64 {
        self.base + layout::player::RANK
    }

    pub fn points(&self) -> u64 {
        self.base + layout::player::POINTS
    }

    pub fn is_dead(&self) -> u64 {
        self.base + layout::player::IS_DEAD
    }

    pub fn is_in_abyss(&self) -> u64 {
        self.base + layout::player::IS_IN_ABYSS
    }

    pub fn gauntlet_mode(&self) -> u64 {
        self.base + layout::player::GAUNTLET_MODE
    }
}

/// Addresses of the session state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateOffsets {
    base: u64,
}

impl StateOffsets {
    pub fn new(module_base: u64) -> Self {
        Self { base: module_base }
    }

    pub fn in_session(&self) -> u64 {
        self.base + layout::state::IN_SESSION
    }
}
