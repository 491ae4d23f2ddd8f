//! Per-axis voxel scale.
//!
//! The scale of a resolution level is the product of two factors:
//!
//! ```text
//! scale[a] = display_voxel_ratio[a] * downscale[a]
//!          = (voxel_size[a] / min(voxel_size)) * (full_dims[a] / level_dims[a])
//! ```
//!
//! # Usage
//!
//! ```rust
//! use voxmark_math::AxisScale;
//!
//! // 0.5 x 0.5 x 2.0 um voxels, level 1 halves x and y
//! let s = AxisScale::from_geometry([0.5, 0.5, 2.0], [512, 512, 64], [256, 256, 64]).unwrap();
//! assert_eq!(s.as_array(), [2.0, 2.0, 4.0]);
//! ```

use std::ops::Index;

use voxmark_core::{Dims, Error, Result};

/// Physical units covered by one voxel along each axis.
///
/// Every component is finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale([f32; 3]);

impl AxisScale {
    /// One physical unit per voxel on every axis.
    pub const IDENTITY: Self = Self([1.0; 3]);

    /// Validates and wraps a scale vector.
    pub fn new(scale: [f32; 3]) -> Result<Self> {
        for s in scale {
            if !s.is_finite() || s <= 0.0 {
                return Err(Error::invalid_parameter(
                    "axis_scale",
                    format!("components must be finite and > 0, got {scale:?}"),
                ));
            }
        }
        Ok(Self(scale))
    }

    /// Derives the scale of a resolution level from source metadata.
    pub fn from_geometry(voxel_size: [f32; 3], full_dims: Dims, level_dims: Dims) -> Result<Self> {
        let ratio = display_voxel_ratio(voxel_size)?;
        let down = downscale_factors(full_dims, level_dims)?;
        Self::new([ratio[0] * down[0], ratio[1] * down[1], ratio[2] * down[2]])
    }

    /// Components as an array.
    #[inline]
    pub const fn as_array(&self) -> [f32; 3] {
        self.0
    }
}

impl Default for AxisScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<usize> for AxisScale {
    type Output = f32;

    #[inline]
    fn index(&self, axis: usize) -> &f32 {
        &self.0[axis]
    }
}

/// Voxel edge lengths relative to the shortest edge.
///
/// Isotropic data yields `[1, 1, 1]`; typical light-sheet stacks have a
/// larger z ratio.
pub fn display_voxel_ratio(voxel_size: [f32; 3]) -> Result<[f32; 3]> {
    if voxel_size.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return Err(Error::invalid_parameter(
            "voxel_size",
            format!("components must be finite and > 0, got {voxel_size:?}"),
        ));
    }
    let min = voxel_size[0].min(voxel_size[1]).min(voxel_size[2]);
    Ok([voxel_size[0] / min, voxel_size[1] / min, voxel_size[2] / min])
}

/// How many full-resolution voxels one voxel of a level spans per axis.
pub fn downscale_factors(full_dims: Dims, level_dims: Dims) -> Result<[f32; 3]> {
    if full_dims.contains(&0) {
        return Err(Error::invalid_dimensions(full_dims, "zero-sized axis"));
    }
    if level_dims.contains(&0) {
        return Err(Error::invalid_dimensions(level_dims, "zero-sized axis"));
    }
    Ok([
        full_dims[0] as f32 / level_dims[0] as f32,
        full_dims[1] as f32 / level_dims[1] as f32,
        full_dims[2] as f32 / level_dims[2] as f32,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_non_positive() {
        assert!(AxisScale::new([1.0, 0.0, 1.0]).is_err());
        assert!(AxisScale::new([1.0, -2.0, 1.0]).is_err());
        assert!(AxisScale::new([f32::NAN, 1.0, 1.0]).is_err());
        assert!(AxisScale::new([0.5, 1.0, 3.0]).is_ok());
    }

    #[test]
    fn test_display_voxel_ratio() {
        let r = display_voxel_ratio([0.2, 0.2, 1.0]).unwrap();
        assert_relative_eq!(r[0], 1.0);
        assert_relative_eq!(r[1], 1.0);
        assert_relative_eq!(r[2], 5.0);
        assert!(display_voxel_ratio([0.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_downscale_factors() {
        let d = downscale_factors([400, 300, 50], [100, 150, 50]).unwrap();
        assert_eq!(d, [4.0, 2.0, 1.0]);
        assert!(downscale_factors([10, 10, 10], [0, 10, 10]).is_err());
    }

    #[test]
    fn test_full_resolution_isotropic_is_identity() {
        let s = AxisScale::from_geometry([0.7, 0.7, 0.7], [64, 64, 64], [64, 64, 64]).unwrap();
        assert_eq!(s, AxisScale::IDENTITY);
    }
}
