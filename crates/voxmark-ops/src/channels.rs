//! Channel buffers shared between the refresh pass and the renderer.
//!
//! Each channel sits behind its own `RwLock`. A refresh pass takes all three
//! write locks (always red, green, blue) for baseline and compositing, drops
//! them, bumps the generation and only then publishes. A renderer that
//! uploads a channel holds a read lock, so it never sees a half-written
//! buffer; the generation tells it whether the three channels it uploaded
//! belong to the same pass.
//!
//! ```rust
//! use voxmark_core::Channel;
//! use voxmark_ops::SharedChannels;
//!
//! let ch = SharedChannels::new([8, 8, 8]).unwrap();
//! assert_eq!(ch.generation(), 0);
//! assert_eq!(ch.read(Channel::Green).dims(), [8, 8, 8]);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;
use voxmark_core::{Channel, Dims, Result, VoxelVolume};

/// The three same-shaped channel volumes.
#[derive(Debug)]
pub struct SharedChannels {
    channels: [RwLock<VoxelVolume>; 3],
    generation: AtomicU64,
}

/// Exclusive access to all three channels for one pass.
pub struct ChannelsMut<'a> {
    red: RwLockWriteGuard<'a, VoxelVolume>,
    green: RwLockWriteGuard<'a, VoxelVolume>,
    blue: RwLockWriteGuard<'a, VoxelVolume>,
}

impl ChannelsMut<'_> {
    /// Mutable references in `[red, green, blue]` order.
    pub fn split(&mut self) -> [&mut VoxelVolume; 3] {
        [&mut *self.red, &mut *self.green, &mut *self.blue]
    }
}

impl SharedChannels {
    /// Allocates three zero-filled channels.
    pub fn new(dims: Dims) -> Result<Self> {
        Ok(Self {
            channels: [
                RwLock::new(VoxelVolume::new(dims)?),
                RwLock::new(VoxelVolume::new(dims)?),
                RwLock::new(VoxelVolume::new(dims)?),
            ],
            generation: AtomicU64::new(0),
        })
    }

    /// Current channel dimensions.
    pub fn dims(&self) -> Dims {
        self.read(Channel::Red).dims()
    }

    /// Shared access to one channel.
    ///
    /// A writer that panicked leaves the previous pass's data in place, so
    /// poisoning is ignored.
    pub fn read(&self, channel: Channel) -> RwLockReadGuard<'_, VoxelVolume> {
        self.channels[channel.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access to all three channels.
    pub fn write_all(&self) -> ChannelsMut<'_> {
        let [r, g, b] = &self.channels;
        ChannelsMut {
            red: r.write().unwrap_or_else(PoisonError::into_inner),
            green: g.write().unwrap_or_else(PoisonError::into_inner),
            blue: b.write().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Owned copy of one channel.
    pub fn snapshot(&self, channel: Channel) -> VoxelVolume {
        self.read(channel).clone()
    }

    /// Number of completed passes.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Marks a pass complete and returns the new generation.
    pub(crate) fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Replaces all three channels with zeroed volumes of `dims`.
    ///
    /// Nothing changes if allocation fails.
    pub fn reallocate(&self, dims: Dims) -> Result<()> {
        let fresh = [
            VoxelVolume::new(dims)?,
            VoxelVolume::new(dims)?,
            VoxelVolume::new(dims)?,
        ];
        let mut guard = self.write_all();
        for (slot, vol) in guard.split().into_iter().zip(fresh) {
            *slot = vol;
        }
        debug!(?dims, "channel buffers reallocated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_all_then_read() {
        let ch = SharedChannels::new([2, 2, 2]).unwrap();
        {
            let mut w = ch.write_all();
            let [r, g, b] = w.split();
            r.set(0, 0, 0, 1.0).unwrap();
            g.set(1, 0, 0, 2.0).unwrap();
            b.set(1, 1, 1, 3.0).unwrap();
        }
        assert_eq!(ch.read(Channel::Red).get(0, 0, 0), Some(1.0));
        assert_eq!(ch.read(Channel::Green).get(1, 0, 0), Some(2.0));
        assert_eq!(ch.snapshot(Channel::Blue).get(1, 1, 1), Some(3.0));
    }

    #[test]
    fn test_reallocate() {
        let ch = SharedChannels::new([2, 2, 2]).unwrap();
        ch.reallocate([4, 3, 2]).unwrap();
        for c in Channel::ALL {
            assert_eq!(ch.read(c).dims(), [4, 3, 2]);
        }
        assert!(ch.reallocate([0, 3, 2]).is_err());
        assert_eq!(ch.dims(), [4, 3, 2]);
    }

    #[test]
    fn test_generation() {
        let ch = SharedChannels::new([1, 1, 1]).unwrap();
        assert_eq!(ch.bump_generation(), 1);
        assert_eq!(ch.bump_generation(), 2);
        assert_eq!(ch.generation(), 2);
    }
}
