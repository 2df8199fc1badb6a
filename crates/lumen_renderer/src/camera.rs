//! Camera ray generation.

use lumen_core::Camera;
use lumen_math::{Ray, Vec3};
use rand::RngCore;

use crate::integrator::gen_f32;

/// Precomputed pinhole projection for one image size.
///
/// Row 0 is the top of the image. Pixel centers map to
/// `px = (2(x + 0.5)/w - 1) * aspect` and `py = 1 - 2(y + 0.5)/h`, scaled
/// by `tan(fov / 2)`.
#[derive(Clone, Debug)]
pub struct CameraRays {
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    // Cached computed values
    scale: f32,
    aspect: f32,
    width: f32,
    height: f32,
}

impl CameraRays {
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let basis = camera.basis();
        Self {
            origin: camera.position,
            forward: basis.forward,
            right: basis.right,
            up: basis.up,
            scale: camera.half_height(),
            aspect: width as f32 / height.max(1) as f32,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Ray through a sub-pixel position; `(0.5, 0.5)` is the pixel center.
    pub fn ray_at(&self, x: u32, y: u32, offset_x: f32, offset_y: f32) -> Ray {
        let px = (2.0 * (x as f32 + offset_x) / self.width - 1.0) * self.aspect;
        let py = 1.0 - 2.0 * (y as f32 + offset_y) / self.height;
        let direction = self.forward + self.scale * (px * self.right + py * self.up);
        Ray::new(self.origin, direction)
    }

    /// Ray through the center of pixel `(x, y)`.
    pub fn center_ray(&self, x: u32, y: u32) -> Ray {
        self.ray_at(x, y, 0.5, 0.5)
    }

    /// Ray through a uniformly random point inside pixel `(x, y)`.
    pub fn jittered_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let offset_x = gen_f32(rng);
        let offset_y = gen_f32(rng);
        self.ray_at(x, y, offset_x, offset_y)
    }
}
