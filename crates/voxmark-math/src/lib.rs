//! # voxmark-math
//!
//! Geometry for mapping annotations onto voxel volumes.
//!
//! - [`AxisScale`] - physical size of one voxel per axis at a resolution level
//! - [`CoordinateMapper`] - physical (world) space to voxel index space and back
//! - [`SceneFrame`] - voxel space to the sink viewer's centred scene space
//! - [`CameraSync`] - source viewer transform to sink camera rotation/position
//!
//! # Conventions
//!
//! World and voxel space share axis orientation: a world delta maps to a
//! voxel delta by per-axis division only. The y/z inversion between the
//! data source and the sink viewer lives in exactly two places, both fixed
//! constants with pinned tests:
//!
//! ```text
//! world --(/ scale)--> voxel --(- dims/2, * SCENE_AXIS_SIGNS)--> scene
//! view matrix --(quat, flip y,z)--> camera rotation
//! ```
//!
//! View transforms are given as three **rows** of an affine 3x4 matrix, the
//! way the source viewer hands them out.
//!
//! # Dependencies
//!
//! - [`glam`] - quaternions and vectors for the camera
//! - `voxmark-core` - dimensions and errors

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod camera;
mod mapper;
mod scale;

pub use camera::*;
pub use mapper::*;
pub use scale::*;

/// Re-export glam types used in public signatures.
pub mod glam {
    pub use ::glam::{Mat3, Quat, Vec3};
}
