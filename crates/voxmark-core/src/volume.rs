//! Dense voxel volume storage.
//!
//! [`VoxelVolume`] holds one scalar sample per voxel in x-fastest order:
//!
//! ```text
//! index(x, y, z) = x + dims[0] * (y + dims[1] * z)
//! ```
//!
//! Samples are stored as `f32` regardless of the source bit depth; 16-bit
//! microscopy data converts losslessly through [`VoxelVolume::from_u16`].
//!
//! # Example
//!
//! ```rust
//! use voxmark_core::VoxelVolume;
//!
//! let mut vol = VoxelVolume::new([4, 4, 4]).unwrap();
//! vol.set(1, 2, 3, 7.0).unwrap();
//! assert_eq!(vol.get(1, 2, 3), Some(7.0));
//! assert_eq!(vol.len(), 64);
//! ```

use rayon::prelude::*;

use crate::error::{Error, Result};

/// Volume dimensions `[x, y, z]` in voxels.
pub type Dims = [usize; 3];

/// A dense 3D array of scalar samples.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelVolume {
    dims: Dims,
    data: Vec<f32>,
}

impl VoxelVolume {
    /// Creates a zero-filled volume.
    ///
    /// Fails if any dimension is zero or the voxel count overflows.
    pub fn new(dims: Dims) -> Result<Self> {
        let len = voxel_count(dims)?;
        Ok(Self {
            dims,
            data: vec![0.0; len],
        })
    }

    /// Wraps an existing sample buffer.
    pub fn from_vec(dims: Dims, data: Vec<f32>) -> Result<Self> {
        let len = voxel_count(dims)?;
        if data.len() != len {
            return Err(Error::BufferLength {
                expected: len,
                got: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Converts 16-bit samples, the usual bit depth of light-sheet data.
    pub fn from_u16(dims: Dims, data: &[u16]) -> Result<Self> {
        Self::from_vec(dims, data.iter().map(|&v| f32::from(v)).collect())
    }

    /// Builds a volume by evaluating `f(x, y, z)` for every voxel.
    pub fn from_fn(dims: Dims, f: impl Fn(usize, usize, usize) -> f32 + Sync) -> Result<Self> {
        let len = voxel_count(dims)?;
        let plane = dims[0] * dims[1];
        let data = (0..len)
            .into_par_iter()
            .map(|i| {
                let z = i / plane;
                let rem = i % plane;
                f(rem % dims[0], rem / dims[0], z)
            })
            .collect();
        Ok(Self { dims, data })
    }

    /// Volume dimensions.
    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: zero-sized volumes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear index of `(x, y, z)`, or `None` when outside the volume.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        if x < self.dims[0] && y < self.dims[1] && z < self.dims[2] {
            Some(x + self.dims[0] * (y + self.dims[1] * z))
        } else {
            None
        }
    }

    /// Sample at `(x, y, z)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        self.index(x, y, z).map(|i| self.data[i])
    }

    /// Writes the sample at `(x, y, z)`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: f32) -> Result<()> {
        let i = self
            .index(x, y, z)
            .ok_or_else(|| Error::out_of_bounds(x, y, z, self.dims))?;
        self.data[i] = value;
        Ok(())
    }

    /// Raw samples in x-fastest order.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw samples in x-fastest order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns `true` when both volumes have the same dimensions.
    #[inline]
    pub fn same_shape(&self, other: &VoxelVolume) -> bool {
        self.dims == other.dims
    }

    /// Fails with [`Error::DimensionMismatch`] unless shapes agree.
    pub fn ensure_same_shape(&self, other: &VoxelVolume) -> Result<()> {
        if self.same_shape(other) {
            Ok(())
        } else {
            Err(Error::dimension_mismatch(self.dims, other.dims))
        }
    }

    /// Overwrites every sample with `f(src)` of the matching source sample.
    ///
    /// Runs on the rayon pool.
    pub fn map_from(&mut self, src: &VoxelVolume, f: impl Fn(f32) -> f32 + Sync) -> Result<()> {
        self.ensure_same_shape(src)?;
        self.data
            .par_iter_mut()
            .zip(src.data.par_iter())
            .for_each(|(dst, &s)| *dst = f(s));
        Ok(())
    }

    /// Copies all samples from `src`.
    pub fn copy_from(&mut self, src: &VoxelVolume) -> Result<()> {
        self.ensure_same_shape(src)?;
        self.data.copy_from_slice(&src.data);
        Ok(())
    }

    /// Largest sample, or `0.0` when every sample is negative or NaN.
    pub fn max_value(&self) -> f32 {
        self.data
            .par_iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(|| 0.0, f32::max)
    }
}

fn voxel_count(dims: Dims) -> Result<usize> {
    if dims.contains(&0) {
        return Err(Error::invalid_dimensions(dims, "zero-sized axis"));
    }
    dims[0]
        .checked_mul(dims[1])
        .and_then(|v| v.checked_mul(dims[2]))
        .ok_or_else(|| Error::invalid_dimensions(dims, "voxel count overflows"))
}
