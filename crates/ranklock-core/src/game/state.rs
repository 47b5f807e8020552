//! Typed view over the session state object in target memory.

use crate::error::Result;
use crate::memory::ReadMemory;
use crate::offset::StateOffsets;

/// Read-only facade over global session state.
pub struct GameState<'a, R: ?Sized> {
    mem: &'a R,
    offsets: StateOffsets,
}

impl<R: ?Sized> Clone for GameState<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for GameState<'_, R> {}

impl<'a, R: ReadMemory + ?Sized> GameState<'a, R> {
    pub fn new(mem: &'a R, module_base: u64) -> Self {
        Self {
            mem,
            offsets: StateOffsets::new(module_base),
        }
    }

    /// Whether a run is currently in progress.
    pub fn in_session(&self) -> Result<bool> {
        self.mem.read_bool(self.offsets.in_session())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::layout;
    use crate::memory::mock::MockMemoryBuilder;

    #[test]
    fn in_session_reads_flag() {
        let base = 0x4000_0000;
        let mem = MockMemoryBuilder::new()
            .with_u8(base + layout::state::IN_SESSION, 1)
            .build();

        let state = GameState::new(&mem, base);
        assert!(state.in_session().unwrap());
    }
}
