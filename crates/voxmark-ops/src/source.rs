//! Collaborator seams: where volumes and spots come from, and where
//! channel updates go.

use std::sync::Arc;

use voxmark_core::{Channel, Dims, Result, Spot, VoxelVolume};
use voxmark_transfer::DisplayRange;

/// Provider of source volumes and visible spots.
///
/// Implementations are called from the scheduler thread and from whichever
/// thread requests an immediate refresh.
pub trait VolumeSource: Send + Sync {
    /// Number of resolution levels; level 0 is full resolution.
    fn num_levels(&self) -> usize;

    /// Dimensions of a resolution level.
    fn level_dims(&self, level: usize) -> Result<Dims>;

    /// Physical edge lengths of a full-resolution voxel.
    fn voxel_size(&self) -> [f32; 3];

    /// Number of time indices.
    fn num_timepoints(&self) -> usize;

    /// Source volume for a time index and level.
    ///
    /// Any failure here skips the refresh; the previous content stays.
    fn source_volume(&self, time: usize, level: usize) -> Result<Arc<VoxelVolume>>;

    /// Spots visible at a time index, in imprint order.
    ///
    /// Failure skips the refresh, like [`source_volume`](Self::source_volume).
    fn visible_spots(&self, time: usize) -> Result<Vec<Spot>>;
}

/// Receiver of fire-and-forget channel update notifications.
pub trait ChannelPublisher: Send + Sync {
    /// Asks the renderer to re-upload one channel buffer.
    fn publish_channel_update(&self, channel: Channel);

    /// Display range applied to all three channels.
    fn set_display_range(&self, _range: DisplayRange) {}
}
