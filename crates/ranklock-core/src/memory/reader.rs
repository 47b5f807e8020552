//! Typed reads and writes against a foreign process's address space.

use crate::error::{Error, Result};
use crate::memory::process::ProcessHandle;

/// Read access to raw process memory.
///
/// All typed reads go through [`ReadMemory::read_bytes`] with the exact width
/// of the requested type, so a single read never tears across the type
/// boundary. No cross-process synchronization is assumed: a read may observe
/// the target mid-update, and callers must tolerate occasional transient
/// values.
pub trait ReadMemory {
    /// Read `len` bytes starting at `address`.
    ///
    /// A short read (fewer bytes available than requested) is an error.
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>>;

    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u8(&self, address: u64) -> Result<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Ok(bytes[0])
    }

    fn read_bool(&self, address: u64) -> Result<bool> {
        Ok(self.read_u8(address)? != 0)
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Write access to raw process memory.
pub trait WriteMemory {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()>;

    fn write_i32(&self, address: u64, value: i32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }
}

/// A primitive value a watcher can poll from process memory.
pub trait MemoryValue: Copy + PartialEq + std::fmt::Display {
    fn read_from<R: ReadMemory + ?Sized>(reader: &R, address: u64) -> Result<Self>;
}

impl MemoryValue for i32 {
    fn read_from<R: ReadMemory + ?Sized>(reader: &R, address: u64) -> Result<Self> {
        reader.read_i32(address)
    }
}

impl MemoryValue for u32 {
    fn read_from<R: ReadMemory + ?Sized>(reader: &R, address: u64) -> Result<Self> {
        reader.read_u32(address)
    }
}

impl MemoryValue for u8 {
    fn read_from<R: ReadMemory + ?Sized>(reader: &R, address: u64) -> Result<Self> {
        reader.read_u8(address)
    }
}

/// Memory reader bound to an attached process.
pub struct MemoryReader<'a> {
    process: &'a ProcessHandle,
}

impl<'a> MemoryReader<'a> {
    pub fn new(process: &'a ProcessHandle) -> Self {
        Self { process }
    }

    pub fn process(&self) -> &ProcessHandle {
        self.process
    }
}

#[cfg(target_os = "windows")]
impl ReadMemory for MemoryReader<'_> {
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

        let mut buffer = vec![0u8; len];
        let mut bytes_read = 0usize;

        // SAFETY: the buffer outlives the call and is exactly `len` bytes;
        // the handle stays valid for the lifetime of the borrow.
        unsafe {
            ReadProcessMemory(
                self.process.raw_handle(),
                address as *const core::ffi::c_void,
                buffer.as_mut_ptr() as *mut core::ffi::c_void,
                len,
                Some(&mut bytes_read),
            )
            .map_err(|e| Error::MemoryReadFailed {
                address,
                message: e.message().to_string(),
            })?;
        }

        if bytes_read != len {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("short read: {bytes_read} of {len} bytes"),
            });
        }

        Ok(buffer)
    }
}

#[cfg(target_os = "windows")]
impl WriteMemory for MemoryReader<'_> {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        use windows::Win32::System::Diagnostics::Debug::WriteProcessMemory;

        let mut bytes_written = 0usize;

        // SAFETY: the data slice is valid for the call; the handle was opened
        // with VM_WRITE | VM_OPERATION.
        unsafe {
            WriteProcessMemory(
                self.process.raw_handle(),
                address as *const core::ffi::c_void,
                data.as_ptr() as *const core::ffi::c_void,
                data.len(),
                Some(&mut bytes_written),
            )
            .map_err(|e| Error::MemoryWriteFailed {
                address,
                message: e.message().to_string(),
            })?;
        }

        if bytes_written != data.len() {
            return Err(Error::MemoryWriteFailed {
                address,
                message: format!("short write: {} of {} bytes", bytes_written, data.len()),
            });
        }

        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
impl ReadMemory for MemoryReader<'_> {
    fn read_bytes(&self, _address: u64, _len: usize) -> Result<Vec<u8>> {
        Err(Error::UnsupportedPlatform("Process memory access"))
    }
}

#[cfg(not(target_os = "windows"))]
impl WriteMemory for MemoryReader<'_> {
    fn write_bytes(&self, _address: u64, _data: &[u8]) -> Result<()> {
        Err(Error::UnsupportedPlatform("Process memory access"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::mock::MockMemoryBuilder;

    #[test]
    fn typed_reads_are_little_endian() {
        let mem = MockMemoryBuilder::new()
            .with_bytes(0x100, &[0x78, 0x56, 0x34, 0x12])
            .build();

        assert_eq!(mem.read_i32(0x100).unwrap(), 0x1234_5678);
        assert_eq!(mem.read_u32(0x100).unwrap(), 0x1234_5678);
        assert_eq!(mem.read_u8(0x100).unwrap(), 0x78);
    }

    #[test]
    fn read_bool_is_nonzero() {
        let mem = MockMemoryBuilder::new()
            .with_bytes(0x10, &[0])
            .with_bytes(0x11, &[2])
            .build();

        assert!(!mem.read_bool(0x10).unwrap());
        assert!(mem.read_bool(0x11).unwrap());
    }

    #[test]
    fn unmapped_read_fails() {
        let mem = MockMemoryBuilder::new().build();
        let err = mem.read_i32(0xDEAD).unwrap_err();
        assert!(err.is_memory_error());
    }

    #[test]
    fn write_i32_round_trips() {
        let mem = MockMemoryBuilder::new().with_i32(0x200, 0).build();
        mem.write_i32(0x200, -42).unwrap();
        assert_eq!(mem.read_i32(0x200).unwrap(), -42);
    }

    #[test]
    fn memory_value_reads_through_trait() {
        let mem = MockMemoryBuilder::new().with_i32(0x40, 17).build();
        let value = <i32 as MemoryValue>::read_from(&mem, 0x40).unwrap();
        assert_eq!(value, 17);
    }
}
