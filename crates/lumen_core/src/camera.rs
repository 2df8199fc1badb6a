//! Pinhole camera description.

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// Pinhole camera placed by position, target and up vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees: 60.0,
        }
    }
}

/// Orthonormal camera frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, look_at: Vec3, up: Vec3, fov_degrees: f32) -> Self {
        Self {
            position,
            look_at,
            up,
            fov_degrees,
        }
    }

    /// Compute the camera frame.
    ///
    /// `right = up x forward` and the screen up is `forward x right`, so a
    /// camera looking down +Z with +Y up has +X on the right. An `up`
    /// parallel to the view direction falls back to an arbitrary
    /// perpendicular vector, and a camera whose target equals its position
    /// looks down +Z.
    pub fn basis(&self) -> CameraBasis {
        let forward = match (self.look_at - self.position).try_normalize() {
            Some(f) => f,
            None => {
                log::warn!("Camera look_at equals position {:?}", self.position);
                Vec3::Z
            }
        };
        let right = match self.up.cross(forward).try_normalize() {
            Some(r) => r,
            None => {
                log::warn!("Camera up {:?} is parallel to view direction", self.up);
                forward.any_orthonormal_vector()
            }
        };
        CameraBasis {
            forward,
            right,
            up: forward.cross(right),
        }
    }

    /// `tan(fov / 2)`, the half-height of the image plane at unit distance.
    pub fn half_height(&self) -> f32 {
        (self.fov_degrees.to_radians() / 2.0).tan()
    }
}
