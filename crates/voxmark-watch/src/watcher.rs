//! Coalescing change watcher.
//!
//! Every kind has one record: a pending flag, the time of the latest mark
//! and a mark counter. Marking overwrites; intermediate marks are lost on
//! purpose. The single consumer clears a record only once it has been
//! quiet for the requested period.
//!
//! ```rust
//! use std::time::Duration;
//! use voxmark_watch::{ChangeKind, ChangeWatcher};
//!
//! let w = ChangeWatcher::new();
//! w.mark_changed(ChangeKind::View);
//! assert!(!w.consume_if_settled(ChangeKind::View, Duration::from_secs(60)));
//! assert!(w.consume_if_settled(ChangeKind::View, Duration::ZERO));
//! assert!(!w.consume_if_settled(ChangeKind::View, Duration::ZERO));
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use voxmark_core::SpotId;

use crate::kind::ChangeKind;
use crate::wakeup::Wakeup;

/// Anything event producers can report changes to.
pub trait ChangeSink: Send + Sync {
    /// Records that something of `kind` changed just now. Must not block
    /// for long and must not panic.
    fn notify_change(&self, kind: ChangeKind);

    /// Records that spot `id` moved.
    fn notify_spot_moved(&self, id: SpotId) {
        let _ = id;
        self.notify_change(ChangeKind::SpotMoved);
    }
}

const NO_SPOT: u64 = u64::MAX;

#[derive(Debug, Default)]
struct Record {
    pending: AtomicBool,
    stamp: AtomicU64,
    seq: AtomicU64,
}

/// Many-producer, single-consumer coalescing mailbox of change kinds.
#[derive(Debug)]
pub struct ChangeWatcher {
    origin: Instant,
    records: [Record; 3],
    last_spot: AtomicU64,
    wakeup: Wakeup,
}

impl Default for ChangeWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeWatcher {
    /// Creates a watcher with nothing pending.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            records: Default::default(),
            last_spot: AtomicU64::new(NO_SPOT),
            wakeup: Wakeup::default(),
        }
    }

    fn now(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Marks `kind` pending as of now, replacing any earlier mark.
    pub fn mark_changed(&self, kind: ChangeKind) {
        let rec = &self.records[kind.index()];
        rec.stamp.store(self.now(), Ordering::Release);
        rec.seq.fetch_add(1, Ordering::AcqRel);
        rec.pending.store(true, Ordering::Release);
        self.wakeup.notify();
    }

    /// Remembers `id` as the latest moved spot and marks
    /// [`ChangeKind::SpotMoved`].
    pub fn mark_spot_moved(&self, id: SpotId) {
        self.last_spot.store(id, Ordering::Release);
        self.mark_changed(ChangeKind::SpotMoved);
    }

    /// Latest spot passed to [`mark_spot_moved`](Self::mark_spot_moved).
    pub fn last_moved_spot(&self) -> Option<SpotId> {
        match self.last_spot.load(Ordering::Acquire) {
            NO_SPOT => None,
            id => Some(id),
        }
    }

    /// Returns `true` if `kind` has an unconsumed mark.
    pub fn is_pending(&self, kind: ChangeKind) -> bool {
        self.records[kind.index()].pending.load(Ordering::Acquire)
    }

    /// Time left until a pending `kind` has been quiet for `quiet`.
    ///
    /// `None` when nothing is pending; zero when already settled.
    pub fn time_until_settled(&self, kind: ChangeKind, quiet: Duration) -> Option<Duration> {
        let rec = &self.records[kind.index()];
        if !rec.pending.load(Ordering::Acquire) {
            return None;
        }
        let elapsed = self.now().saturating_sub(rec.stamp.load(Ordering::Acquire));
        Some(quiet.saturating_sub(Duration::from_nanos(elapsed)))
    }

    /// Clears and reports a pending `kind` that has been quiet for `quiet`.
    ///
    /// Returns `false` without side effects if nothing is pending, the
    /// latest mark is too recent, or a producer marked concurrently. Only
    /// one thread may consume.
    pub fn consume_if_settled(&self, kind: ChangeKind, quiet: Duration) -> bool {
        let rec = &self.records[kind.index()];
        if !rec.pending.load(Ordering::Acquire) {
            return false;
        }
        let seq = rec.seq.load(Ordering::Acquire);
        let stamp = rec.stamp.load(Ordering::Acquire);
        let quiet = u64::try_from(quiet.as_nanos()).unwrap_or(u64::MAX);
        if self.now().saturating_sub(stamp) < quiet {
            return false;
        }
        if rec
            .pending
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if rec.seq.load(Ordering::Acquire) != seq {
            // Marked again after the stamp was read: not settled after all.
            rec.pending.store(true, Ordering::Release);
            return false;
        }
        true
    }

    pub(crate) fn wakeup(&self) -> &Wakeup {
        &self.wakeup
    }
}

impl ChangeSink for ChangeWatcher {
    fn notify_change(&self, kind: ChangeKind) {
        self.mark_changed(kind);
    }

    fn notify_spot_moved(&self, id: SpotId) {
        self.mark_spot_moved(id);
    }
}
