//! In-memory fake of a target process for tests.
//!
//! Byte-addressable, with interior mutability so tests can change the
//! "game's" memory between polls and simulate the target exiting.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::memory::reader::{ReadMemory, WriteMemory};

#[derive(Default)]
pub struct MockMemoryReader {
    bytes: RefCell<HashMap<u64, u8>>,
    detached: Cell<bool>,
    writes: RefCell<Vec<(u64, Vec<u8>)>>,
}

impl MockMemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bytes(&self, address: u64, data: &[u8]) {
        let mut bytes = self.bytes.borrow_mut();
        for (i, b) in data.iter().enumerate() {
            bytes.insert(address + i as u64, *b);
        }
    }

    pub fn set_i32(&self, address: u64, value: i32) {
        self.set_bytes(address, &value.to_le_bytes());
    }

    pub fn set_u8(&self, address: u64, value: u8) {
        self.set_bytes(address, &[value]);
    }

    /// Make every subsequent read and write fail, as if the target exited.
    pub fn detach(&self) {
        self.detached.set(true);
    }

    pub fn reattach(&self) {
        self.detached.set(false);
    }

    /// Every write performed through [`WriteMemory`], in order.
    pub fn writes(&self) -> Vec<(u64, Vec<u8>)> {
        self.writes.borrow().clone()
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        if self.detached.get() {
            return Err(Error::MemoryReadFailed {
                address,
                message: "target process has exited".to_string(),
            });
        }

        let bytes = self.bytes.borrow();
        (0..len as u64)
            .map(|i| {
                bytes.get(&(address + i)).copied().ok_or_else(|| Error::MemoryReadFailed {
                    address,
                    message: format!("unmapped byte at {:#x}", address + i),
                })
            })
            .collect()
    }
}

impl WriteMemory for MockMemoryReader {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        if self.detached.get() {
            return Err(Error::MemoryWriteFailed {
                address,
                message: "target process has exited".to_string(),
            });
        }

        self.set_bytes(address, data);
        self.writes.borrow_mut().push((address, data.to_vec()));
        Ok(())
    }
}

/// Builder for seeding mock memory.
#[derive(Default)]
pub struct MockMemoryBuilder {
    mem: MockMemoryReader,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(self, address: u64, data: &[u8]) -> Self {
        self.mem.set_bytes(address, data);
        self
    }

    pub fn with_i32(self, address: u64, value: i32) -> Self {
        self.mem.set_i32(address, value);
        self
    }

    pub fn with_u8(self, address: u64, value: u8) -> Self {
        self.mem.set_u8(address, value);
        self
    }

    pub fn build(self) -> MockMemoryReader {
        self.mem
    }
}
