//! # voxmark-core
//!
//! Core types for painting annotated spots into dense voxel volumes.
//!
//! This crate provides the foundational types used throughout the voxmark workspace:
//!
//! - [`VoxelVolume`] - Dense 3D scalar array addressed by `(x, y, z)`
//! - [`VoxelBox`] - Inclusive integer region of a volume
//! - [`Spot`], [`Rgb`] - Annotated point objects with radius and color
//! - [`Channel`] - One of the three output channel buffers
//! - [`Error`], [`Result`] - Unified error handling
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. All other voxmark crates depend on it:
//!
//! ```text
//! voxmark-core (this crate)
//!    ^
//!    |
//!    +-- voxmark-math (axis scale, coordinate mapping, camera sync)
//!    +-- voxmark-transfer (intensity transfer function)
//!    +-- voxmark-ops (baseline reset, spot compositing, refresh)
//!    +-- voxmark-bridge (viewer orchestration)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channel;
pub mod error;
pub mod region;
pub mod spot;
pub mod volume;

pub use channel::Channel;
pub use error::{Error, Result};
pub use region::VoxelBox;
pub use spot::{Rgb, Spot, SpotId};
pub use volume::{Dims, VoxelVolume};

/// Prelude module for convenient imports.
///
/// ```
/// use voxmark_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::channel::Channel;
    pub use crate::error::{Error, Result};
    pub use crate::region::VoxelBox;
    pub use crate::spot::{Rgb, Spot, SpotId};
    pub use crate::volume::{Dims, VoxelVolume};
}
