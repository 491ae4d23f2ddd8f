//! Scheduler errors.

use thiserror::Error;

use crate::kind::ChangeKind;

/// Result alias for scheduler operations.
pub type WatchResult<T> = std::result::Result<T, WatchError>;

/// Errors raised while configuring or running the debounce scheduler.
#[derive(Debug, Error)]
pub enum WatchError {
    /// A quiet period of zero would fire on every poll.
    #[error("quiet period for `{0}` must be > 0")]
    InvalidQuietPeriod(ChangeKind),

    /// Each kind can have one handler.
    #[error("handler for `{0}` registered twice")]
    DuplicateKind(ChangeKind),

    /// Nothing to schedule.
    #[error("no handlers registered")]
    NoHandlers,

    /// The OS refused to start the scheduler thread.
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The scheduler thread panicked outside a handler.
    #[error("scheduler thread panicked")]
    Panicked,
}

impl WatchError {
    /// Returns `true` for errors caught before the thread starts.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuietPeriod(_) | Self::DuplicateKind(_) | Self::NoHandlers
        )
    }
}
