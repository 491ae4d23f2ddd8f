//! Epoch counter with a condition variable.
//!
//! Producers bump the epoch after marking a change; the scheduler sleeps
//! until the epoch moves past the value it last saw or a timeout expires.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct Wakeup {
    epoch: Mutex<u64>,
    cv: Condvar,
}

impl Wakeup {
    /// Bumps the epoch and wakes every waiter. Never blocks for long and
    /// never panics.
    pub(crate) fn notify(&self) {
        {
            let mut epoch = self.epoch.lock().unwrap_or_else(PoisonError::into_inner);
            *epoch = epoch.wrapping_add(1);
        }
        self.cv.notify_all();
    }

    /// Current epoch.
    pub(crate) fn epoch(&self) -> u64 {
        *self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until the epoch differs from `seen` or `timeout` passes.
    ///
    /// Returns `false` when the lock was poisoned while waiting, which the
    /// caller treats as an interrupted wait.
    pub(crate) fn wait_past(&self, seen: u64, timeout: Duration) -> bool {
        let guard = match self.epoch.lock() {
            Ok(g) => g,
            Err(_) => return false,
        };
        self.cv
            .wait_timeout_while(guard, timeout, |epoch| *epoch == seen)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_times_out() {
        let w = Wakeup::default();
        let start = Instant::now();
        assert!(w.wait_past(w.epoch(), Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_stale_epoch_returns_immediately() {
        let w = Wakeup::default();
        let seen = w.epoch();
        w.notify();
        let start = Instant::now();
        assert!(w.wait_past(seen, Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_notify_wakes_waiter() {
        let w = Arc::new(Wakeup::default());
        let seen = w.epoch();
        let waiter = {
            let w = Arc::clone(&w);
            thread::spawn(move || {
                let start = Instant::now();
                w.wait_past(seen, Duration::from_secs(10));
                start.elapsed()
            })
        };
        thread::sleep(Duration::from_millis(20));
        w.notify();
        assert!(waiter.join().unwrap() < Duration::from_secs(5));
    }
}
