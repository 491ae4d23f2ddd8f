//! Debounce scheduler.
//!
//! One background thread checks every registered kind in registration
//! order and runs its handler once the kind has been quiet for its quiet
//! period. Handlers run on the scheduler thread, one at a time; a slow
//! handler delays the checks of every other kind.
//!
//! Between checks the thread sleeps on the watcher's wakeup for at most a
//! tenth of the shortest quiet period (1 ms floor), or less when a pending
//! kind will settle sooner.
//!
//! ```text
//! Running --stop()--> Stopped      (one way)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::error::{WatchError, WatchResult};
use crate::kind::ChangeKind;
use crate::watcher::ChangeWatcher;

/// Smallest sleep between checks.
pub const MIN_POLL: Duration = Duration::from_millis(1);

type Handler = Box<dyn FnMut() + Send>;

struct Registration {
    kind: ChangeKind,
    quiet: Duration,
    handler: Handler,
}

/// Builder for the scheduler thread.
pub struct DebounceScheduler {
    watcher: Arc<ChangeWatcher>,
    registrations: Vec<Registration>,
    thread_name: String,
}

impl DebounceScheduler {
    /// Starts a builder polling `watcher`.
    pub fn new(watcher: Arc<ChangeWatcher>) -> Self {
        Self {
            watcher,
            registrations: Vec::new(),
            thread_name: "voxmark-debounce".into(),
        }
    }

    /// Name of the spawned thread.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Runs `handler` once `kind` has been quiet for `quiet`.
    ///
    /// Validated by [`spawn`](Self::spawn).
    pub fn register(
        mut self,
        kind: ChangeKind,
        quiet: Duration,
        handler: impl FnMut() + Send + 'static,
    ) -> Self {
        self.registrations.push(Registration {
            kind,
            quiet,
            handler: Box::new(handler),
        });
        self
    }

    fn validate(&self) -> WatchResult<()> {
        if self.registrations.is_empty() {
            return Err(WatchError::NoHandlers);
        }
        let mut seen = [false; 3];
        for r in &self.registrations {
            if r.quiet.is_zero() {
                return Err(WatchError::InvalidQuietPeriod(r.kind));
            }
            if std::mem::replace(&mut seen[r.kind.index()], true) {
                return Err(WatchError::DuplicateKind(r.kind));
            }
        }
        Ok(())
    }

    /// Poll interval for a set of quiet periods.
    pub fn poll_interval(quiet_periods: impl IntoIterator<Item = Duration>) -> Duration {
        quiet_periods
            .into_iter()
            .min()
            .map_or(MIN_POLL, |q| (q / 10).max(MIN_POLL))
    }

    /// Validates registrations and starts the thread.
    pub fn spawn(self) -> WatchResult<SchedulerHandle> {
        self.validate()?;
        let control = Arc::new(Control::default());
        let poll = Self::poll_interval(self.registrations.iter().map(|r| r.quiet));
        let watcher = Arc::clone(&self.watcher);

        let worker = Worker {
            watcher: self.watcher,
            registrations: self.registrations,
            control: Arc::clone(&control),
            poll,
        };
        let thread = thread::Builder::new()
            .name(self.thread_name)
            .spawn(move || worker.run())?;
        info!(poll_ms = poll.as_secs_f64() * 1e3, "debounce scheduler started");

        Ok(SchedulerHandle {
            control,
            watcher,
            thread_id: thread.thread().id(),
            thread: Some(thread),
        })
    }
}

#[derive(Debug, Default)]
struct Control {
    stop: AtomicBool,
    paused: AtomicBool,
    fired: AtomicU64,
}

struct Worker {
    watcher: Arc<ChangeWatcher>,
    registrations: Vec<Registration>,
    control: Arc<Control>,
    poll: Duration,
}

impl Worker {
    fn stopping(&self) -> bool {
        self.control.stop.load(Ordering::SeqCst)
    }

    fn run(mut self) {
        loop {
            if self.stopping() {
                break;
            }
            let seen = self.watcher.wakeup().epoch();
            let paused = self.control.paused.load(Ordering::Acquire);

            if !paused && self.fire_settled() {
                continue;
            }
            if self.stopping() {
                break;
            }

            let wait = if paused { self.poll } else { self.next_wait() };
            trace!(wait_us = wait.as_micros() as u64, "scheduler idle");
            if !self.watcher.wakeup().wait_past(seen, wait) {
                warn!("scheduler wait interrupted, shutting down");
                break;
            }
        }
        debug!(fired = self.control.fired.load(Ordering::Relaxed), "debounce scheduler stopped");
    }

    /// Runs every settled handler once; returns whether any ran.
    fn fire_settled(&mut self) -> bool {
        let mut fired = false;
        for i in 0..self.registrations.len() {
            if self.stopping() {
                return fired;
            }
            let (kind, quiet) = (self.registrations[i].kind, self.registrations[i].quiet);
            if !self.watcher.consume_if_settled(kind, quiet) {
                continue;
            }
            debug!(%kind, "change settled, running handler");
            let handler = &mut self.registrations[i].handler;
            if panic::catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                error!(%kind, "change handler panicked");
            }
            self.control.fired.fetch_add(1, Ordering::Relaxed);
            fired = true;
        }
        fired
    }

    fn next_wait(&self) -> Duration {
        self.registrations
            .iter()
            .filter_map(|r| self.watcher.time_until_settled(r.kind, r.quiet))
            .fold(self.poll, Duration::min)
            .max(Duration::from_micros(100))
    }
}

/// Control over a running scheduler; stops and joins it on drop.
pub struct SchedulerHandle {
    control: Arc<Control>,
    watcher: Arc<ChangeWatcher>,
    thread_id: ThreadId,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("running", &self.is_running())
            .field("paused", &self.is_paused())
            .field("fired", &self.fired_count())
            .finish()
    }
}

impl SchedulerHandle {
    /// Watcher the scheduler polls.
    pub fn watcher(&self) -> &Arc<ChangeWatcher> {
        &self.watcher
    }

    /// Asks the loop to exit without waiting for it.
    pub fn request_stop(&self) {
        self.control.stop.store(true, Ordering::SeqCst);
        self.watcher.wakeup().notify();
    }

    /// Stops the loop and waits for it.
    ///
    /// After this returns no handler runs again. Called from inside a
    /// handler it only requests the stop, since the thread cannot join
    /// itself.
    pub fn stop(&mut self) -> WatchResult<()> {
        self.request_stop();
        if thread::current().id() == self.thread_id {
            return Ok(());
        }
        match self.thread.take() {
            Some(t) => t.join().map_err(|_| WatchError::Panicked),
            None => Ok(()),
        }
    }

    /// Returns `true` until a stop has been requested.
    pub fn is_running(&self) -> bool {
        !self.control.stop.load(Ordering::SeqCst)
    }

    /// Suspends or resumes handler invocations. Marks made while paused
    /// stay pending and fire after resuming.
    pub fn set_paused(&self, paused: bool) {
        self.control.paused.store(paused, Ordering::Release);
        if !paused {
            self.watcher.wakeup().notify();
        }
        debug!(paused, "debounce scheduler pause toggled");
    }

    /// Returns `true` while paused.
    pub fn is_paused(&self) -> bool {
        self.control.paused.load(Ordering::Acquire)
    }

    /// Handler invocations so far.
    pub fn fired_count(&self) -> u64 {
        self.control.fired.load(Ordering::Relaxed)
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!(error = %e, "debounce scheduler did not stop cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() {}

    #[test]
    fn test_poll_interval() {
        let ms = Duration::from_millis;
        assert_eq!(DebounceScheduler::poll_interval([ms(10), ms(200)]), ms(1));
        assert_eq!(DebounceScheduler::poll_interval([ms(300), ms(50)]), ms(5));
        assert_eq!(DebounceScheduler::poll_interval([ms(2)]), MIN_POLL);
        assert_eq!(DebounceScheduler::poll_interval([]), MIN_POLL);
    }

    #[test]
    fn test_validation() {
        let w = Arc::new(ChangeWatcher::new());
        let err = DebounceScheduler::new(Arc::clone(&w)).spawn().unwrap_err();
        assert!(matches!(err, WatchError::NoHandlers));

        let err = DebounceScheduler::new(Arc::clone(&w))
            .register(ChangeKind::View, Duration::ZERO, noop)
            .spawn()
            .unwrap_err();
        assert!(matches!(err, WatchError::InvalidQuietPeriod(ChangeKind::View)));

        let err = DebounceScheduler::new(w)
            .register(ChangeKind::Content, Duration::from_millis(5), noop)
            .register(ChangeKind::Content, Duration::from_millis(9), noop)
            .spawn()
            .unwrap_err();
        assert!(err.is_config_error());
    }
}
