//! Synthetic moving-sphere dataset.
//!
//! A bright sphere with linear fall-off travels along x by one voxel per
//! time index, starting 20 voxels left of the volume centre. One tracked
//! spot follows its centre. Level 1 is a 2x downsampled copy.

use std::sync::Arc;

use voxmark_core::{Dims, Error, Result, Rgb, Spot, VoxelVolume};
use voxmark_math::display_voxel_ratio;

use crate::source::VolumeSource;

/// Procedural [`VolumeSource`] for demos and tests.
#[derive(Debug, Clone)]
pub struct SphereSource {
    dims: Dims,
    frames: usize,
    radius: f32,
    peak: f32,
    spot_radius: f32,
    spot_color: Option<Rgb>,
    voxel_size: [f32; 3],
}

impl Default for SphereSource {
    fn default() -> Self {
        Self {
            dims: [100, 100, 100],
            frames: 50,
            radius: 20.0,
            peak: 1000.0,
            spot_radius: 20.0 / 3.0,
            spot_color: Rgb::from_packed(0xFF_20_D0_40),
            voxel_size: [1.0, 1.0, 1.0],
        }
    }
}

impl SphereSource {
    /// Offset of the sphere from the volume centre at time 0, in voxels.
    pub const START_OFFSET: f32 = -20.0;

    /// Sphere of `radius` voxels in a volume of `dims`.
    pub fn new(dims: Dims, frames: usize, radius: f32) -> Result<Self> {
        if dims.contains(&0) {
            return Err(Error::invalid_dimensions(dims, "zero-sized axis"));
        }
        if frames == 0 {
            return Err(Error::invalid_parameter("frames", "must be > 0"));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::invalid_parameter("radius", "must be finite and > 0"));
        }
        Ok(Self {
            dims,
            frames,
            radius,
            spot_radius: radius / 3.0,
            ..Self::default()
        })
    }

    /// Brightest sample at the sphere centre.
    pub fn with_peak(mut self, peak: f32) -> Self {
        self.peak = peak;
        self
    }

    /// Color of the tracked spot; `None` makes it uncolored.
    pub fn with_spot_color(mut self, color: Option<Rgb>) -> Self {
        self.spot_color = color;
        self
    }

    /// Voxel size reported as metadata.
    pub fn with_voxel_size(mut self, voxel_size: [f32; 3]) -> Result<Self> {
        display_voxel_ratio(voxel_size)?;
        self.voxel_size = voxel_size;
        Ok(self)
    }

    /// Sphere centre at `time` in full-resolution voxels.
    pub fn centre(&self, time: usize) -> [f32; 3] {
        [
            self.dims[0] as f32 / 2.0 + time as f32 + Self::START_OFFSET,
            self.dims[1] as f32 / 2.0,
            self.dims[2] as f32 / 2.0,
        ]
    }

    fn check_time(&self, time: usize) -> Result<()> {
        if time >= self.frames {
            return Err(Error::source_unavailable(
                time,
                0,
                format!("only {} time indices", self.frames),
            ));
        }
        Ok(())
    }
}

impl VolumeSource for SphereSource {
    fn num_levels(&self) -> usize {
        2
    }

    fn level_dims(&self, level: usize) -> Result<Dims> {
        match level {
            0 => Ok(self.dims),
            1 => Ok(self.dims.map(|d| d.div_ceil(2))),
            _ => Err(Error::UnknownLevel {
                level,
                available: self.num_levels(),
            }),
        }
    }

    fn voxel_size(&self) -> [f32; 3] {
        self.voxel_size
    }

    fn num_timepoints(&self) -> usize {
        self.frames
    }

    fn source_volume(&self, time: usize, level: usize) -> Result<Arc<VoxelVolume>> {
        self.check_time(time)?;
        let dims = self.level_dims(level)?;
        let step = (1usize << level) as f32;
        let c = self.centre(time);
        let (radius, peak) = (self.radius, self.peak);
        let vol = VoxelVolume::from_fn(dims, |x, y, z| {
            let p = [x as f32 * step, y as f32 * step, z as f32 * step];
            let d = ((p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2) + (p[2] - c[2]).powi(2)).sqrt();
            if d <= radius {
                peak * (1.0 - d / radius).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })?;
        Ok(Arc::new(vol))
    }

    fn visible_spots(&self, time: usize) -> Result<Vec<Spot>> {
        if time >= self.frames {
            return Err(Error::spots_unavailable(time, "past the last time index"));
        }
        let c = self.centre(time);
        let ratio = display_voxel_ratio(self.voxel_size)?;
        let position = [c[0] * ratio[0], c[1] * ratio[1], c[2] * ratio[2]];
        Ok(vec![Spot::new(0, position, self.spot_radius, self.spot_color)])
    }
}
