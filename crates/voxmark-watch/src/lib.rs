//! # voxmark-watch
//!
//! Collapses storms of viewer events into bounded work.
//!
//! Producers on any thread call [`ChangeSink::notify_change`]; the
//! [`ChangeWatcher`] keeps only "kind K changed, latest at time T". A
//! [`DebounceScheduler`] thread fires each registered handler at most once
//! per settled burst.
//!
//! ```text
//! producers ──notify_change──> ChangeWatcher ──consume_if_settled──> scheduler ──> handler
//!     (many threads)              (atomics)                          (one thread)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use voxmark_watch::{ChangeKind, ChangeSink, ChangeWatcher, DebounceScheduler};
//!
//! let watcher = Arc::new(ChangeWatcher::new());
//! let runs = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&runs);
//! let mut handle = DebounceScheduler::new(Arc::clone(&watcher))
//!     .register(ChangeKind::Content, Duration::from_millis(50), move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .spawn()
//!     .unwrap();
//!
//! for _ in 0..100 {
//!     watcher.notify_change(ChangeKind::Content);
//! }
//! std::thread::sleep(Duration::from_millis(300));
//! handle.stop().unwrap();
//! assert_eq!(runs.load(Ordering::SeqCst), 1);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod kind;
pub mod scheduler;
pub mod watcher;
mod wakeup;

pub use error::{WatchError, WatchResult};
pub use kind::ChangeKind;
pub use scheduler::{DebounceScheduler, SchedulerHandle};
pub use watcher::{ChangeSink, ChangeWatcher};
