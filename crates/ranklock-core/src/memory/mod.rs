pub mod layout;
mod process;
mod reader;
mod scheduler;
mod watcher;

// Mock memory for testing (always available so downstream crates can unit-test
// watcher and facade logic without a live process)
#[doc(hidden)]
pub mod mock;

pub use process::*;
pub use reader::{MemoryReader, MemoryValue, ReadMemory, WriteMemory};
pub use scheduler::{UpdateScheduler, UpdateStatus, Updatable};
pub use watcher::{ChangeEvent, EventDisposition, MemoryWatcher};

#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
