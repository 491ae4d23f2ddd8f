//! Error types for voxmark operations.
//!
//! The [`Error`] enum covers the failure modes of the compositing pipeline:
//!
//! - **Configuration errors**: bad transfer parameters, mismatched or empty
//!   volume dimensions, non-positive axis scales. These are returned at
//!   construction or parameter-set time and are never silently coerced.
//! - **Transient data errors**: the source volume or the spot list for a time
//!   index could not be obtained. Callers log these and skip the refresh.
//! - **Bounds errors**: direct voxel access outside the volume.
//!
//! # Usage
//!
//! ```rust
//! use voxmark_core::{Error, Result};
//!
//! fn check_clamp(clamp_top: f32) -> Result<()> {
//!     if clamp_top <= 0.0 {
//!         return Err(Error::invalid_parameter("clamp_top", "must be > 0"));
//!     }
//!     Ok(())
//! }
//! assert!(check_clamp(0.0).is_err());
//! ```

use thiserror::Error;

use crate::volume::Dims;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or compositing voxel volumes.
#[derive(Debug, Error)]
pub enum Error {
    /// Voxel coordinates are outside volume bounds.
    #[error("voxel ({x}, {y}, {z}) out of bounds for volume {}x{}x{}", dims[0], dims[1], dims[2])]
    OutOfBounds {
        /// X index
        x: usize,
        /// Y index
        y: usize,
        /// Z index
        z: usize,
        /// Volume dimensions
        dims: Dims,
    },

    /// Two volumes that must share a shape do not.
    #[error(
        "dimension mismatch: {}x{}x{} vs {}x{}x{}",
        a[0], a[1], a[2], b[0], b[1], b[2]
    )]
    DimensionMismatch {
        /// First shape
        a: Dims,
        /// Second shape
        b: Dims,
    },

    /// Volume dimensions are zero or overflow the address space.
    #[error("invalid dimensions {}x{}x{}: {reason}", dims[0], dims[1], dims[2])]
    InvalidDimensions {
        /// Requested dimensions
        dims: Dims,
        /// Why they were rejected
        reason: String,
    },

    /// A buffer length does not match the dimensions it is paired with.
    #[error("buffer holds {got} samples, dimensions require {expected}")]
    BufferLength {
        /// Samples required by the dimensions
        expected: usize,
        /// Samples supplied
        got: usize,
    },

    /// A tunable parameter is outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Source volume for a time index could not be obtained.
    #[error("source volume unavailable for time {time} at level {level}: {reason}")]
    SourceUnavailable {
        /// Requested time index
        time: usize,
        /// Requested resolution level
        level: usize,
        /// Collaborator supplied reason
        reason: String,
    },

    /// Spot list for a time index could not be obtained.
    #[error("spots unavailable for time {time}: {reason}")]
    SpotsUnavailable {
        /// Requested time index
        time: usize,
        /// Collaborator supplied reason
        reason: String,
    },

    /// Requested resolution level does not exist in the source.
    #[error("resolution level {level} not available (source has {available})")]
    UnknownLevel {
        /// Requested level
        level: usize,
        /// Number of levels the source offers
        available: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: usize, y: usize, z: usize, dims: Dims) -> Self {
        Self::OutOfBounds { x, y, z, dims }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: Dims, b: Dims) -> Self {
        Self::DimensionMismatch { a, b }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(dims: Dims, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            dims,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::SourceUnavailable`] error.
    #[inline]
    pub fn source_unavailable(time: usize, level: usize, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            time,
            level,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::SpotsUnavailable`] error.
    #[inline]
    pub fn spots_unavailable(time: usize, reason: impl Into<String>) -> Self {
        Self::SpotsUnavailable {
            time,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` for errors caused by bad configuration.
    ///
    /// These must surface to whoever set the configuration.
    #[inline]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::InvalidDimensions { .. }
                | Self::BufferLength { .. }
                | Self::InvalidParameter { .. }
                | Self::UnknownLevel { .. }
        )
    }

    /// Returns `true` when data for a time index was temporarily unavailable.
    ///
    /// A refresh hitting one of these is skipped and the previous buffers stay.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::SpotsUnavailable { .. }
        )
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}
