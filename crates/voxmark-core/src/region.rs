//! Integer voxel regions.
//!
//! [`VoxelBox`] is an axis-aligned region with **inclusive** bounds on both
//! ends, matching how a spot's search window is described: centre ± radius,
//! clipped to `[0, dim - 1]`.
//!
//! ```rust
//! use voxmark_core::VoxelBox;
//!
//! // Window of radius 2 around voxel (1, 5, 5) in a 10^3 volume
//! let b = VoxelBox::around([1, 5, 5], [2, 2, 2], [10, 10, 10]).unwrap();
//! assert_eq!(b.min, [0, 3, 3]);
//! assert_eq!(b.max, [3, 7, 7]);
//! assert!(b.contains(0, 3, 7));
//! ```

use crate::volume::Dims;

/// Inclusive integer bounding box in voxel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelBox {
    /// Lowest corner (inclusive)
    pub min: [usize; 3],
    /// Highest corner (inclusive)
    pub max: [usize; 3],
}

impl VoxelBox {
    /// Creates a box from inclusive corners.
    #[inline]
    pub const fn new(min: [usize; 3], max: [usize; 3]) -> Self {
        Self { min, max }
    }

    /// The whole volume.
    #[inline]
    pub const fn full(dims: Dims) -> Self {
        Self {
            min: [0, 0, 0],
            max: [
                dims[0].saturating_sub(1),
                dims[1].saturating_sub(1),
                dims[2].saturating_sub(1),
            ],
        }
    }

    /// Window `centre ± radius` per axis, clipped to the volume.
    ///
    /// `centre` may lie outside the volume (including negative indices); the
    /// result is `None` when nothing of the window overlaps the volume.
    pub fn around(centre: [i64; 3], radius: [i64; 3], dims: Dims) -> Option<Self> {
        let mut min = [0usize; 3];
        let mut max = [0usize; 3];
        for a in 0..3 {
            let r = radius[a].max(0);
            let lo = centre[a].saturating_sub(r).max(0);
            let hi = centre[a]
                .saturating_add(r)
                .min(dims[a] as i64 - 1);
            if dims[a] == 0 || lo > hi {
                return None;
            }
            min[a] = lo as usize;
            max[a] = hi as usize;
        }
        Some(Self { min, max })
    }

    /// Returns `true` if `(x, y, z)` lies inside the box.
    #[inline]
    pub const fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x >= self.min[0]
            && x <= self.max[0]
            && y >= self.min[1]
            && y <= self.max[1]
            && z >= self.min[2]
            && z <= self.max[2]
    }

    /// Number of voxels covered.
    #[inline]
    pub const fn volume(&self) -> usize {
        (self.max[0] - self.min[0] + 1)
            * (self.max[1] - self.min[1] + 1)
            * (self.max[2] - self.min[2] + 1)
    }
}
