//! Spot imprinting into the channel buffers.
//!
//! For each spot the compositor takes the voxel window `centre ± round(r /
//! scale)`, clipped to the volume, and overwrites every voxel whose
//! **physical** distance to the spot centre is within the radius:
//!
//! ```text
//! val      = transfer(source[v]) * color_intensity / clamp_top
//! out[v]   = (val * r, val * g, val * b)
//! ```
//!
//! Only multiplication touches the color, so hue is preserved. Spots are
//! processed in input order and later spots overwrite earlier ones where
//! they overlap.
//!
//! # Example
//!
//! ```rust
//! use voxmark_core::{Rgb, Spot, VoxelVolume};
//! use voxmark_math::{AxisScale, CoordinateMapper};
//! use voxmark_ops::{ImprintParams, SpotCompositor};
//! use voxmark_transfer::{TransferFunction, TransferParams};
//!
//! let src = VoxelVolume::from_fn([10, 10, 10], |_, _, _| 100.0).unwrap();
//! let mut r = VoxelVolume::new([10, 10, 10]).unwrap();
//! let (mut g, mut b) = (r.clone(), r.clone());
//!
//! let comp = SpotCompositor::new(
//!     CoordinateMapper::new(AxisScale::IDENTITY),
//!     TransferFunction::new(TransferParams::identity(1000.0)).unwrap(),
//!     ImprintParams { radius_scale: 1.0, color_intensity: 1000.0, ..Default::default() },
//! )
//! .unwrap();
//! let spot = Spot::new(1, [5.0, 5.0, 5.0], 2.0, Some(Rgb::RED));
//! let written = comp.imprint(&spot, &src, [&mut r, &mut g, &mut b]).unwrap();
//! assert!(written > 0);
//! assert_eq!(r.get(5, 5, 5), Some(100.0));
//! assert_eq!(g.get(5, 5, 5), Some(0.0));
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use voxmark_core::{Dims, Error, Result, Rgb, Spot, VoxelBox, VoxelVolume};
use voxmark_math::CoordinateMapper;
use voxmark_transfer::TransferFunction;

/// Tunables of spot imprinting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImprintParams {
    /// Imprint spots at all
    pub enabled: bool,
    /// Multiplier on spot radii; spots are drawn larger than annotated
    pub radius_scale: f32,
    /// Brightest value an imprinted voxel can reach
    pub color_intensity: f32,
    /// Normalize colors so the largest component is 1.0
    pub boost: bool,
}

impl Default for ImprintParams {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_scale: 3.0,
            color_intensity: 2100.0,
            boost: false,
        }
    }
}

impl ImprintParams {
    /// Checks radius scale and color intensity.
    pub fn validate(&self) -> Result<()> {
        if !self.radius_scale.is_finite() || self.radius_scale <= 0.0 {
            return Err(Error::invalid_parameter(
                "radius_scale",
                format!("must be finite and > 0, got {}", self.radius_scale),
            ));
        }
        if !self.color_intensity.is_finite() || self.color_intensity < 0.0 {
            return Err(Error::invalid_parameter(
                "color_intensity",
                format!("must be finite and >= 0, got {}", self.color_intensity),
            ));
        }
        Ok(())
    }
}

/// Totals of one [`SpotCompositor::imprint_all`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImprintStats {
    /// Spots that wrote at least their window
    pub spots_imprinted: usize,
    /// Spots without color or entirely outside the volume
    pub spots_skipped: usize,
    /// Voxel writes, counting overlaps repeatedly
    pub voxels_written: usize,
}

/// Paints spots into three channel volumes.
#[derive(Debug, Clone, Copy)]
pub struct SpotCompositor {
    mapper: CoordinateMapper,
    transfer: TransferFunction,
    imprint: ImprintParams,
}

impl SpotCompositor {
    /// Creates a compositor, validating `imprint`.
    pub fn new(
        mapper: CoordinateMapper,
        transfer: TransferFunction,
        imprint: ImprintParams,
    ) -> Result<Self> {
        imprint.validate()?;
        Ok(Self {
            mapper,
            transfer,
            imprint,
        })
    }

    /// Factor from transfer output to imprint value.
    #[inline]
    pub fn intensity_scale(&self) -> f32 {
        self.imprint.color_intensity / self.transfer.clamp_top()
    }

    /// Physical radius actually imprinted for `spot`.
    #[inline]
    pub fn effective_radius(&self, spot: &Spot) -> f32 {
        spot.radius * self.imprint.radius_scale
    }

    /// Voxel window searched for `spot`, or `None` outside the volume.
    pub fn search_box(&self, spot: &Spot, dims: Dims) -> Option<VoxelBox> {
        let radius = self.effective_radius(spot);
        if !radius.is_finite() || radius < 0.0 || spot.position.iter().any(|p| !p.is_finite()) {
            return None;
        }
        VoxelBox::around(
            self.mapper.centre_voxel(spot.position),
            self.mapper.voxel_radius(radius),
            dims,
        )
    }

    /// Imprints one spot and returns the number of voxels written.
    ///
    /// A spot without color, or with an all-zero color, writes nothing.
    pub fn imprint(
        &self,
        spot: &Spot,
        source: &VoxelVolume,
        channels: [&mut VoxelVolume; 3],
    ) -> Result<usize> {
        let [red, green, blue] = channels;
        for ch in [&*red, &*green, &*blue] {
            ch.ensure_same_shape(source)?;
        }

        let Some(color) = spot.imprint_color() else {
            return Ok(0);
        };
        let color = if self.imprint.boost { color.boosted() } else { color };
        let Some(window) = self.search_box(spot, source.dims()) else {
            return Ok(0);
        };

        let radius = self.effective_radius(spot);
        let pass = ImprintPass {
            mapper: &self.mapper,
            transfer: &self.transfer,
            source,
            window,
            centre: spot.position,
            radius_sq: radius * radius,
            scale: self.intensity_scale(),
            color,
        };
        let written = pass.run([red, green, blue]);
        trace!(spot = spot.id, written, ?window, "spot imprinted");
        Ok(written)
    }

    /// Imprints spots in order; later spots win on overlap.
    pub fn imprint_all(
        &self,
        spots: &[Spot],
        source: &VoxelVolume,
        channels: [&mut VoxelVolume; 3],
    ) -> Result<ImprintStats> {
        let [red, green, blue] = channels;
        let mut stats = ImprintStats::default();
        for spot in spots {
            if spot.imprint_color().is_none() || self.search_box(spot, source.dims()).is_none() {
                stats.spots_skipped += 1;
                continue;
            }
            stats.voxels_written += self.imprint(spot, source, [&mut *red, &mut *green, &mut *blue])?;
            stats.spots_imprinted += 1;
        }
        debug!(
            imprinted = stats.spots_imprinted,
            skipped = stats.spots_skipped,
            voxels = stats.voxels_written,
            "spots composited"
        );
        Ok(stats)
    }
}

/// Per-spot state shared by every z plane of the window.
struct ImprintPass<'a> {
    mapper: &'a CoordinateMapper,
    transfer: &'a TransferFunction,
    source: &'a VoxelVolume,
    window: VoxelBox,
    centre: [f32; 3],
    radius_sq: f32,
    scale: f32,
    color: Rgb,
}

impl ImprintPass<'_> {
    fn run(&self, channels: [&mut VoxelVolume; 3]) -> usize {
        let [red, green, blue] = channels;
        let dims = self.source.dims();
        let plane = dims[0] * dims[1];
        let z0 = self.window.min[2];
        let span = z0 * plane..(self.window.max[2] + 1) * plane;

        let r = &mut red.as_mut_slice()[span.clone()];
        let g = &mut green.as_mut_slice()[span.clone()];
        let b = &mut blue.as_mut_slice()[span];

        #[cfg(feature = "parallel")]
        let planes = r
            .par_chunks_mut(plane)
            .zip(g.par_chunks_mut(plane))
            .zip(b.par_chunks_mut(plane))
            .enumerate();
        #[cfg(not(feature = "parallel"))]
        let planes = r
            .chunks_mut(plane)
            .zip(g.chunks_mut(plane))
            .zip(b.chunks_mut(plane))
            .enumerate();

        planes
            .map(|(i, ((r, g), b))| self.plane(z0 + i, r, g, b))
            .sum()
    }

    fn plane(&self, z: usize, r: &mut [f32], g: &mut [f32], b: &mut [f32]) -> usize {
        let dims = self.source.dims();
        let src = self.source.as_slice();
        let base = z * dims[0] * dims[1];
        let mut written = 0;
        for y in self.window.min[1]..=self.window.max[1] {
            for x in self.window.min[0]..=self.window.max[0] {
                if self.mapper.distance_sq([x, y, z], self.centre) > self.radius_sq {
                    continue;
                }
                let local = x + dims[0] * y;
                let val = self.transfer.apply(src[base + local]) * self.scale;
                r[local] = val * self.color.r;
                g[local] = val * self.color.g;
                b[local] = val * self.color.b;
                written += 1;
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmark_math::AxisScale;
    use voxmark_transfer::TransferParams;

    fn compositor(scale: [f32; 3]) -> SpotCompositor {
        SpotCompositor::new(
            CoordinateMapper::new(AxisScale::new(scale).unwrap()),
            TransferFunction::new(TransferParams::identity(1000.0)).unwrap(),
            ImprintParams {
                radius_scale: 1.0,
                color_intensity: 1000.0,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn volumes(dims: Dims) -> (VoxelVolume, VoxelVolume, VoxelVolume, VoxelVolume) {
        let src = VoxelVolume::from_fn(dims, |x, y, z| (1 + x + y + z) as f32).unwrap();
        let r = src.clone();
        (src, r.clone(), r.clone(), r)
    }

    #[test]
    fn test_invalid_params() {
        let bad = ImprintParams {
            radius_scale: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = ImprintParams {
            color_intensity: f32::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_anisotropic_window() {
        let c = compositor([1.0, 1.0, 2.0]);
        let spot = Spot::new(0, [5.0, 5.0, 10.0], 4.0, Some(Rgb::RED));
        let b = c.search_box(&spot, [10, 10, 10]).unwrap();
        assert_eq!(b.min, [1, 1, 3]);
        assert_eq!(b.max, [9, 9, 7]);
    }

    #[test]
    fn test_anisotropic_acceptance_is_physical() {
        let c = compositor([1.0, 1.0, 2.0]);
        let (src, mut r, mut g, mut b) = volumes([10, 10, 10]);
        let spot = Spot::new(0, [5.0, 5.0, 10.0], 2.0, Some(Rgb::BLUE));
        c.imprint(&spot, &src, [&mut r, &mut g, &mut b]).unwrap();
        // z = 6 is two physical units away: inside.
        assert_eq!(r.get(5, 5, 6), Some(0.0));
        // z = 7 is four physical units away: outside.
        assert_eq!(r.get(5, 5, 7), src.get(5, 5, 7));
        // (6, 6, 5) is sqrt(2) away: inside.
        assert_eq!(b.get(6, 6, 5), src.get(6, 6, 5));
        assert_eq!(r.get(6, 6, 5), Some(0.0));
    }

    #[test]
    fn test_intensity_scale() {
        let c = SpotCompositor::new(
            CoordinateMapper::default(),
            TransferFunction::new(TransferParams::default()).unwrap(),
            ImprintParams::default(),
        )
        .unwrap();
        assert_eq!(c.intensity_scale(), 3.0);
    }

    #[test]
    fn test_boost() {
        let c = SpotCompositor::new(
            CoordinateMapper::default(),
            TransferFunction::new(TransferParams::identity(1000.0)).unwrap(),
            ImprintParams {
                radius_scale: 1.0,
                color_intensity: 1000.0,
                boost: true,
                ..Default::default()
            },
        )
        .unwrap();
        let (src, mut r, mut g, mut b) = volumes([4, 4, 4]);
        let spot = Spot::new(0, [1.0, 1.0, 1.0], 0.0, Some(Rgb::new(0.5, 0.25, 0.0)));
        assert_eq!(c.imprint(&spot, &src, [&mut r, &mut g, &mut b]).unwrap(), 1);
        assert_eq!(r.get(1, 1, 1), Some(4.0));
        assert_eq!(g.get(1, 1, 1), Some(2.0));
        assert_eq!(b.get(1, 1, 1), Some(0.0));
    }

    #[test]
    fn test_skip_counts() {
        let c = compositor([1.0; 3]);
        let (src, mut r, mut g, mut b) = volumes([6, 6, 6]);
        let spots = [
            Spot::new(1, [2.0, 2.0, 2.0], 1.0, None),
            Spot::new(2, [50.0, 2.0, 2.0], 1.0, Some(Rgb::RED)),
            Spot::new(3, [2.0, 2.0, 2.0], 1.0, Some(Rgb::GREEN)),
        ];
        let stats = c.imprint_all(&spots, &src, [&mut r, &mut g, &mut b]).unwrap();
        assert_eq!(stats.spots_imprinted, 1);
        assert_eq!(stats.spots_skipped, 2);
        assert_eq!(stats.voxels_written, 7);
    }

    #[test]
    fn test_mismatched_channel_rejected() {
        let c = compositor([1.0; 3]);
        let (src, mut r, mut g, _) = volumes([4, 4, 4]);
        let mut b = VoxelVolume::new([4, 4, 5]).unwrap();
        let spot = Spot::new(0, [1.0; 3], 1.0, Some(Rgb::RED));
        assert!(c.imprint(&spot, &src, [&mut r, &mut g, &mut b]).is_err());
    }
}
