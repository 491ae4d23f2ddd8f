//! Error types for the viewer bridge.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised while configuring or driving a [`Bridge`](crate::Bridge).
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O error reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// A config value is outside its valid domain.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Compositing pipeline error.
    #[error(transparent)]
    Core(#[from] voxmark_core::Error),

    /// Scheduler error.
    #[error(transparent)]
    Watch(#[from] voxmark_watch::WatchError),

    /// The bridge was closed.
    #[error("bridge is closed")]
    Closed,
}

impl BridgeError {
    /// Creates an [`BridgeError::InvalidConfig`] error.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors caused by bad configuration.
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::InvalidConfig { .. } | Self::ConfigNotFound { .. } | Self::Yaml(_) => true,
            Self::Core(e) => e.is_config_error(),
            Self::Watch(e) => e.is_config_error(),
            _ => false,
        }
    }
}
