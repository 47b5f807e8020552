use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Cooperative shutdown signal with interruptible waits.
///
/// The watch loop sleeps on this between ticks; a triggered shutdown wakes
/// it immediately instead of letting the tick interval run out.
pub struct ShutdownSignal {
    shutdown: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            shutdown: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    /// Trigger the shutdown signal, waking all waiting threads.
    pub fn trigger(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Wait for `duration` or until shutdown is triggered.
    ///
    /// Returns `true` if shutdown was triggered, `false` on a normal timeout.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }

        let guard = self.mutex.lock().unwrap();
        match self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_shutdown())
        {
            Ok((_, timeout_result)) => !timeout_result.timed_out(),
            // Mutex poisoned, treat as shutdown
            Err(_) => true,
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_initial_state() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[test]
    fn test_wait_timeout() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        let interrupted = signal.wait(Duration::from_millis(50));

        assert!(!interrupted);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_wait_interrupted() {
        let signal = Arc::new(ShutdownSignal::new());
        let signal_clone = Arc::clone(&signal);

        let handle = thread::spawn(move || signal_clone.wait(Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(50));
        signal.trigger();

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_wait_already_shutdown() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
