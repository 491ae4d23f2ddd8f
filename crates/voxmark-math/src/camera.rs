//! Camera synchronisation between the source and sink viewers.
//!
//! The source viewer describes its view as an affine 3x4 matrix (rotation
//! with uniform zoom, plus translation). The sink viewer orbits a camera
//! around the volume, described by a rotation quaternion and a position.
//!
//! [`CameraSync::sync`] extracts the rotation, flips the quaternion
//! components configured in [`AxisFlips`] (y and z by default) and keeps the
//! sink camera at its current distance from the origin, looking along the
//! new forward direction.
//!
//! ```rust
//! use voxmark_math::{CameraSync, glam::Vec3};
//!
//! let identity = [
//!     [1.0, 0.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0, 0.0],
//!     [0.0, 0.0, 1.0, 0.0],
//! ];
//! let pose = CameraSync::default().sync(&identity, Vec3::new(0.0, 0.0, 5.0));
//! assert!((pose.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6);
//! ```

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Affine view transform as three rows of `[r0, r1, r2, t]`.
pub type ViewTransform = [[f32; 4]; 3];

/// Quaternion components negated when converting to the sink convention.
///
/// Derived empirically for one pair of viewer conventions; treat as
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisFlips {
    /// Negate the x component
    pub x: bool,
    /// Negate the y component
    pub y: bool,
    /// Negate the z component
    pub z: bool,
}

impl Default for AxisFlips {
    fn default() -> Self {
        Self {
            x: false,
            y: true,
            z: true,
        }
    }
}

impl AxisFlips {
    fn apply(&self, q: Quat) -> Quat {
        let sign = |flip: bool| if flip { -1.0 } else { 1.0 };
        Quat::from_xyzw(q.x * sign(self.x), q.y * sign(self.y), q.z * sign(self.z), q.w)
    }
}

/// Camera state for the sink viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// View rotation (world to camera)
    pub rotation: Quat,
    /// Camera position in scene space
    pub position: Vec3,
}

impl CameraPose {
    /// Direction the camera looks along, in scene space.
    pub fn forward(&self) -> Vec3 {
        self.rotation.conjugate() * Vec3::NEG_Z
    }
}

/// Converts source view transforms into sink camera poses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraSync {
    flips: AxisFlips,
}

impl CameraSync {
    /// Creates a converter with explicit flips.
    pub const fn new(flips: AxisFlips) -> Self {
        Self { flips }
    }

    /// Flips in use.
    pub const fn flips(&self) -> AxisFlips {
        self.flips
    }

    /// Rotation of the source view, zoom removed.
    pub fn view_rotation(view: &ViewTransform) -> Quat {
        let rows = Mat3::from_cols(
            Vec3::new(view[0][0], view[0][1], view[0][2]),
            Vec3::new(view[1][0], view[1][1], view[1][2]),
            Vec3::new(view[2][0], view[2][1], view[2][2]),
        )
        .transpose();
        let unscaled = Mat3::from_cols(
            rows.x_axis.normalize_or_zero(),
            rows.y_axis.normalize_or_zero(),
            rows.z_axis.normalize_or_zero(),
        );
        Quat::from_mat3(&unscaled).normalize()
    }

    /// Sink pose matching `view`, keeping the distance of `current_position`
    /// from the scene origin.
    pub fn sync(&self, view: &ViewTransform, current_position: Vec3) -> CameraPose {
        let rotation = self.flips.apply(Self::view_rotation(view));
        let distance = current_position.length();
        let forward = rotation.conjugate() * Vec3::NEG_Z;
        CameraPose {
            rotation,
            position: -forward * distance,
        }
    }
}
