//! Memory layout constants for the supported game build.
//!
//! All offsets are relative to the base address of the main executable
//! module and were recovered for Half Sword UE5 5.4.4.0. They are expected
//! to break on other builds; the version check at attach time warns about
//! that but does not refuse to run.

/// Offsets into the game-mode object (the values the watchers poll).
pub mod game_mode {
    /// Highest rank the player has unlocked.
    pub const AVAILABLE_RANK: u64 = 0x08E3_5C70;
    /// Progress points within the current rank.
    pub const CURRENT_POINTS: u64 = 0x08E3_5C74;
}

/// Offsets into the player object.
pub mod player {
    pub const RANK: u64 = 0x08E4_11D0;
    pub const POINTS: u64 = 0x08E4_11D4;
    pub const IS_DEAD: u64 = 0x08E4_1201;
    pub const IS_IN_ABYSS: u64 = 0x08E4_1202;
    pub const GAUNTLET_MODE: u64 = 0x08E4_1203;
}

/// Offsets into the session state object.
pub mod state {
    /// Non-zero while a run is in progress.
    pub const IN_SESSION: u64 = 0x08E3_5D10;
}

/// Timing constants for the watch loop.
pub mod timing {
    /// Default interval between scheduler ticks.
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
}
