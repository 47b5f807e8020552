//! Sequential tick driver for pollable units.

use tracing::warn;

/// Status reported by a pollable unit after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum UpdateStatus {
    Active,
    /// Terminal: the unit's target is gone and it will produce no further
    /// events.
    Detached,
}

/// A unit the scheduler can poll once per tick.
pub trait Updatable {
    fn update(&mut self) -> UpdateStatus;

    fn label(&self) -> &str;
}

/// Drives registered units once per tick, in registration order, on a single
/// thread.
///
/// A unit transitioning to [`UpdateStatus::Detached`] is logged once and
/// skipped from then on; it never halts the scheduler or the other units.
/// The bounded sleep between ticks belongs to the driving loop, not here.
pub struct UpdateScheduler<'a> {
    units: Vec<Box<dyn Updatable + 'a>>,
    statuses: Vec<UpdateStatus>,
}

impl<'a> UpdateScheduler<'a> {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            statuses: Vec::new(),
        }
    }

    /// Register a unit. Registration after the first tick is allowed;
    /// removal is not supported.
    pub fn register(&mut self, unit: impl Updatable + 'a) {
        self.units.push(Box::new(unit));
        self.statuses.push(UpdateStatus::Active);
    }

    /// Poll every registered unit once. Returns the number of units still
    /// active after this tick.
    pub fn tick(&mut self) -> usize {
        for (unit, status) in self.units.iter_mut().zip(self.statuses.iter_mut()) {
            if *status == UpdateStatus::Detached {
                continue;
            }

            let next = unit.update();
            if next == UpdateStatus::Detached {
                warn!("{}: stopped producing events", unit.label());
            }
            *status = next;
        }

        self.active_units()
    }

    pub fn active_units(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| **s == UpdateStatus::Active)
            .count()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for UpdateScheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Unit {
        label: String,
        ticks: Rc<RefCell<Vec<String>>>,
        fail_after: Option<u32>,
        seen: u32,
    }

    impl Unit {
        fn new(label: &str, ticks: Rc<RefCell<Vec<String>>>, fail_after: Option<u32>) -> Self {
            Self {
                label: label.to_string(),
                ticks,
                fail_after,
                seen: 0,
            }
        }
    }

    impl Updatable for Unit {
        fn update(&mut self) -> UpdateStatus {
            self.seen += 1;
            if let Some(limit) = self.fail_after
                && self.seen > limit
            {
                return UpdateStatus::Detached;
            }
            self.ticks.borrow_mut().push(self.label.clone());
            UpdateStatus::Active
        }

        fn label(&self) -> &str {
            &self.label
        }
    }

    #[test]
    fn ticks_in_registration_order() {
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = UpdateScheduler::new();
        scheduler.register(Unit::new("a", Rc::clone(&ticks), None));
        scheduler.register(Unit::new("b", Rc::clone(&ticks), None));

        scheduler.tick();
        assert_eq!(*ticks.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn detached_unit_does_not_stop_the_rest() {
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = UpdateScheduler::new();
        scheduler.register(Unit::new("a", Rc::clone(&ticks), Some(1)));
        scheduler.register(Unit::new("b", Rc::clone(&ticks), None));

        assert_eq!(scheduler.tick(), 2);
        assert_eq!(scheduler.tick(), 1);
        scheduler.tick();

        // "a" ticked once, "b" every time.
        let seen = ticks.borrow();
        assert_eq!(seen.iter().filter(|l| *l == "a").count(), 1);
        assert_eq!(seen.iter().filter(|l| *l == "b").count(), 3);
    }

    #[test]
    fn register_after_start() {
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = UpdateScheduler::new();
        scheduler.register(Unit::new("a", Rc::clone(&ticks), None));
        scheduler.tick();

        scheduler.register(Unit::new("b", Rc::clone(&ticks), None));
        scheduler.tick();

        assert_eq!(*ticks.borrow(), vec!["a", "a", "b"]);
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn empty_scheduler_ticks() {
        let mut scheduler = UpdateScheduler::new();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.tick(), 0);
    }
}
