//! World/voxel coordinate mapping.
//!
//! [`CoordinateMapper`] converts physical (world) distances into voxel
//! distances and back for one [`AxisScale`]. [`SceneFrame`] places voxel
//! coordinates into the sink viewer's scene, which is centred on the volume
//! and has y and z inverted relative to the data source.
//!
//! # Example
//!
//! ```rust
//! use voxmark_math::{AxisScale, CoordinateMapper};
//!
//! let m = CoordinateMapper::new(AxisScale::new([1.0, 1.0, 2.5]).unwrap());
//! assert_eq!(m.world_to_voxel_delta(5.0, 2), 2.0);
//! assert_eq!(m.voxel_radius(5.0), [5, 5, 2]);
//! ```

use glam::Vec3;
use voxmark_core::Dims;

use crate::AxisScale;

/// Sign applied per axis when going from voxel space to scene space.
///
/// The source stores y growing downwards and z growing away from the viewer;
/// the sink scene has both pointing the other way.
pub const SCENE_AXIS_SIGNS: [f32; 3] = [1.0, -1.0, -1.0];

/// Maps between physical space and voxel index space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateMapper {
    scale: AxisScale,
}

impl CoordinateMapper {
    /// Creates a mapper for one resolution level.
    pub const fn new(scale: AxisScale) -> Self {
        Self { scale }
    }

    /// Scale in use.
    #[inline]
    pub const fn scale(&self) -> AxisScale {
        self.scale
    }

    /// Physical distance along `axis` expressed in voxels.
    #[inline]
    pub fn world_to_voxel_delta(&self, distance: f32, axis: usize) -> f32 {
        distance / self.scale[axis]
    }

    /// Voxel distance along `axis` expressed in physical units.
    #[inline]
    pub fn voxel_to_world_offset(&self, voxels: f32, axis: usize) -> f32 {
        voxels * self.scale[axis]
    }

    /// Continuous voxel coordinates of a physical position.
    pub fn world_to_voxel(&self, position: [f32; 3]) -> [f32; 3] {
        std::array::from_fn(|a| self.world_to_voxel_delta(position[a], a))
    }

    /// Physical position of an integer voxel.
    pub fn voxel_to_world(&self, voxel: [usize; 3]) -> [f32; 3] {
        std::array::from_fn(|a| self.voxel_to_world_offset(voxel[a] as f32, a))
    }

    /// Nearest voxel to a physical position, possibly outside the volume.
    pub fn centre_voxel(&self, position: [f32; 3]) -> [i64; 3] {
        self.world_to_voxel(position).map(|v| v.round() as i64)
    }

    /// Per-axis search half-width in voxels for a physical radius.
    pub fn voxel_radius(&self, radius: f32) -> [i64; 3] {
        std::array::from_fn(|a| self.world_to_voxel_delta(radius, a).round().max(0.0) as i64)
    }

    /// Squared physical distance between a voxel and a physical point.
    #[inline]
    pub fn distance_sq(&self, voxel: [usize; 3], centre: [f32; 3]) -> f32 {
        let w = self.voxel_to_world(voxel);
        let d = [w[0] - centre[0], w[1] - centre[1], w[2] - centre[2]];
        d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
    }
}

/// Placement of a voxel volume inside the sink viewer's scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    dims: Dims,
    pixel_to_world: [f32; 3],
    scene_scale: f32,
}

impl SceneFrame {
    /// Creates a frame for a volume of `dims` voxels.
    ///
    /// `pixel_to_world` is the display voxel ratio of the source;
    /// `scene_scale` is the uniform scale of the volume node in the scene.
    pub const fn new(dims: Dims, pixel_to_world: [f32; 3], scene_scale: f32) -> Self {
        Self {
            dims,
            pixel_to_world,
            scene_scale,
        }
    }

    /// Volume dimensions.
    #[inline]
    pub const fn dims(&self) -> Dims {
        self.dims
    }

    /// Scene position of continuous voxel coordinates.
    pub fn voxel_to_scene(&self, voxel: [f32; 3]) -> Vec3 {
        Vec3::from_array(std::array::from_fn(|a| {
            (voxel[a] - self.dims[a] as f32 * 0.5)
                * self.pixel_to_world[a]
                * self.scene_scale
                * SCENE_AXIS_SIGNS[a]
        }))
    }

    /// Continuous voxel coordinates of a scene position.
    pub fn scene_to_voxel(&self, scene: Vec3) -> [f32; 3] {
        let s = scene.to_array();
        std::array::from_fn(|a| {
            s[a] * SCENE_AXIS_SIGNS[a] / (self.pixel_to_world[a] * self.scene_scale)
                + self.dims[a] as f32 * 0.5
        })
    }

    /// Physical position of a scene point, for writing sink-side edits back.
    pub fn scene_to_world(&self, scene: Vec3, mapper: &CoordinateMapper) -> [f32; 3] {
        let v = self.scene_to_voxel(scene);
        std::array::from_fn(|a| mapper.voxel_to_world_offset(v[a], a))
    }

    /// Scene position of a physical point.
    pub fn world_to_scene(&self, position: [f32; 3], mapper: &CoordinateMapper) -> Vec3 {
        self.voxel_to_scene(mapper.world_to_voxel(position))
    }
}
