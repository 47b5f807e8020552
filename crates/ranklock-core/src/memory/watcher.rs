//! Edge-triggered polling watcher over a single memory address.

use tracing::{debug, trace};

use crate::error::Result;
use crate::memory::reader::{MemoryValue, ReadMemory};
use crate::memory::scheduler::{UpdateStatus, Updatable};

/// A single observed value transition.
///
/// Handlers classify direction themselves by comparing `new` against `old`;
/// the watcher only does edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent<T> {
    pub old: T,
    pub new: T,
}

/// What a handler made of a delivered change.
///
/// `Suppressed` marks the transition as externally corrected: the handler
/// wrote the value back (or otherwise neutralized it) and downstream
/// consumers should not treat this change as real. It never stops the
/// watcher's baseline from advancing to the polled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EventDisposition {
    Accepted,
    Suppressed,
}

type Handler<'a, T> = Box<dyn FnMut(&ChangeEvent<T>) -> EventDisposition + 'a>;

/// Polls one address per tick and dispatches a [`ChangeEvent`] to its
/// handlers whenever the value differs from the previous poll.
///
/// The first read happens at construction and establishes the baseline, so
/// no event is possible for the initial value. A failed read detaches the
/// watcher permanently; further polls are silent no-ops.
pub struct MemoryWatcher<'a, T, R: ReadMemory + ?Sized> {
    label: String,
    address: u64,
    reader: &'a R,
    last: T,
    handlers: Vec<Handler<'a, T>>,
    detached: bool,
}

impl<'a, T: MemoryValue, R: ReadMemory + ?Sized> MemoryWatcher<'a, T, R> {
    pub fn new(label: impl Into<String>, reader: &'a R, address: u64) -> Result<Self> {
        let label = label.into();
        let last = T::read_from(reader, address)?;
        trace!("{}: watcher initialized at {:#x} with {}", label, address, last);

        Ok(Self {
            label,
            address,
            reader,
            last,
            handlers: Vec::new(),
            detached: false,
        })
    }

    /// Register a change handler. Handlers run synchronously in registration
    /// order during the poll step.
    pub fn on_change(&mut self, handler: impl FnMut(&ChangeEvent<T>) -> EventDisposition + 'a) {
        self.handlers.push(Box::new(handler));
    }

    /// The baseline: the value observed by the most recent successful poll.
    pub fn last_value(&self) -> T {
        self.last
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl<T: MemoryValue, R: ReadMemory + ?Sized> Updatable for MemoryWatcher<'_, T, R> {
    fn update(&mut self) -> UpdateStatus {
        if self.detached {
            return UpdateStatus::Detached;
        }

        let new = match T::read_from(self.reader, self.address) {
            Ok(value) => value,
            Err(e) => {
                debug!("{}: read failed at {:#x}, detaching: {}", self.label, self.address, e);
                self.detached = true;
                return UpdateStatus::Detached;
            }
        };

        if new != self.last {
            let event = ChangeEvent { old: self.last, new };
            let mut suppressed = false;
            for handler in &mut self.handlers {
                if handler(&event) == EventDisposition::Suppressed {
                    suppressed = true;
                }
            }

            if suppressed {
                debug!(
                    "{}: change {} -> {} corrected by handler",
                    self.label, event.old, event.new
                );
            } else {
                trace!("{}: change {} -> {}", self.label, event.old, event.new);
            }
        }

        // The baseline advances exactly once per tick, suppressed or not.
        self.last = new;
        UpdateStatus::Active
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::memory::mock::MockMemoryBuilder;

    #[test]
    fn no_event_without_change() {
        let mem = MockMemoryBuilder::new().with_i32(0x10, 5).build();
        let events = RefCell::new(Vec::new());
        let mut watcher: MemoryWatcher<'_, i32, _> =
            MemoryWatcher::new("Rank", &mem, 0x10).unwrap();

        watcher.on_change(|e| {
            events.borrow_mut().push(*e);
            EventDisposition::Accepted
        });

        for _ in 0..5 {
            assert_eq!(watcher.update(), UpdateStatus::Active);
        }
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn one_event_per_distinct_value() {
        let mem = MockMemoryBuilder::new().with_i32(0x10, 5).build();
        let events = RefCell::new(Vec::new());
        let mut watcher: MemoryWatcher<'_, i32, _> =
            MemoryWatcher::new("Rank", &mem, 0x10).unwrap();

        watcher.on_change(|e| {
            events.borrow_mut().push((e.old, e.new));
            EventDisposition::Accepted
        });

        // 5 5 6 6 6 5 5: two edges
        for value in [5, 5, 6, 6, 6, 5, 5] {
            mem.set_i32(0x10, value);
            watcher.update();
        }

        assert_eq!(*events.borrow(), vec![(5, 6), (6, 5)]);
    }

    #[test]
    fn baseline_tracks_every_poll() {
        let mem = MockMemoryBuilder::new().with_i32(0x10, 1).build();
        let mut watcher: MemoryWatcher<'_, i32, _> =
            MemoryWatcher::new("Points", &mem, 0x10).unwrap();

        for value in [1, 3, 3, 7] {
            mem.set_i32(0x10, value);
            watcher.update();
            assert_eq!(watcher.last_value(), value);
        }
    }

    #[test]
    fn suppression_does_not_block_baseline() {
        let mem = MockMemoryBuilder::new().with_i32(0x10, 10).build();
        let deliveries = RefCell::new(0u32);
        let mut watcher: MemoryWatcher<'_, i32, _> =
            MemoryWatcher::new("Points", &mem, 0x10).unwrap();

        watcher.on_change(|_| {
            *deliveries.borrow_mut() += 1;
            EventDisposition::Suppressed
        });

        mem.set_i32(0x10, 8);
        watcher.update();
        assert_eq!(watcher.last_value(), 8);
        assert_eq!(*deliveries.borrow(), 1);

        // Same value again: no further delivery after a suppressed event.
        watcher.update();
        assert_eq!(*deliveries.borrow(), 1);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mem = MockMemoryBuilder::new().with_i32(0x10, 0).build();
        let order = RefCell::new(Vec::new());
        let mut watcher: MemoryWatcher<'_, i32, _> =
            MemoryWatcher::new("Rank", &mem, 0x10).unwrap();

        watcher.on_change(|_| {
            order.borrow_mut().push("first");
            EventDisposition::Accepted
        });
        watcher.on_change(|_| {
            order.borrow_mut().push("second");
            EventDisposition::Accepted
        });

        mem.set_i32(0x10, 1);
        watcher.update();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn read_failure_detaches_permanently() {
        let mem = MockMemoryBuilder::new().with_i32(0x10, 5).build();
        let events = RefCell::new(0u32);
        let mut watcher: MemoryWatcher<'_, i32, _> =
            MemoryWatcher::new("Rank", &mem, 0x10).unwrap();

        watcher.on_change(|_| {
            *events.borrow_mut() += 1;
            EventDisposition::Accepted
        });

        mem.detach();
        assert_eq!(watcher.update(), UpdateStatus::Detached);
        assert!(watcher.is_detached());

        // Reads recovering does not reattach; detached is terminal.
        mem.reattach();
        mem.set_i32(0x10, 9);
        assert_eq!(watcher.update(), UpdateStatus::Detached);
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn construction_fails_on_unreadable_address() {
        let mem = MockMemoryBuilder::new().build();
        let result: Result<MemoryWatcher<'_, i32, _>> = MemoryWatcher::new("Rank", &mem, 0x10);
        assert!(result.is_err());
    }

    #[test]
    fn event_discarded_without_handlers() {
        let mem = MockMemoryBuilder::new().with_i32(0x10, 1).build();
        let mut watcher: MemoryWatcher<'_, i32, _> =
            MemoryWatcher::new("Rank", &mem, 0x10).unwrap();

        mem.set_i32(0x10, 2);
        assert_eq!(watcher.update(), UpdateStatus::Active);
        assert_eq!(watcher.last_value(), 2);
    }
}
