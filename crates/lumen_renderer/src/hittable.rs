//! Hittable trait and HitPoint for ray-object intersection.

use lumen_core::{Material, Sphere, Triangle};
use lumen_math::{Aabb, Color, Interval, Ray, Vec2, Vec3};

/// The primitive a ray hit.
#[derive(Clone, Copy, Debug)]
pub enum HitObject<'a> {
    Sphere(&'a Sphere),
    Triangle(&'a Triangle),
}

/// Record of a ray-object intersection.
#[derive(Clone, Copy, Debug)]
pub struct HitPoint<'a> {
    /// Ray parameter of the intersection
    pub distance: f32,
    /// World-space point of intersection
    pub point: Vec3,
    /// Unit surface normal. Outward for spheres, the front-face normal for
    /// triangles.
    pub normal: Vec3,
    pub object: HitObject<'a>,
}

impl<'a> HitPoint<'a> {
    pub fn material(&self) -> &'a Material {
        match self.object {
            HitObject::Sphere(s) => s.material(),
            HitObject::Triangle(t) => t.material(),
        }
    }

    /// Texture coordinates. Only spheres carry a parameterization.
    pub fn uv(&self) -> Option<Vec2> {
        match self.object {
            HitObject::Sphere(s) => Some(s.uv_at(self.point)),
            HitObject::Triangle(_) => None,
        }
    }

    /// Texture color modulating shading at this point.
    ///
    /// Textured spheres return the texture sample; everything else returns
    /// white so the flat material colors pass through unchanged.
    pub fn texture_color(&self) -> Color {
        let material = self.material();
        match (&material.texture, self.uv()) {
            (Some(texture), Some(uv)) => texture.sample(uv),
            _ => Color::ONE,
        }
    }

    /// Emitted radiance, modulated by the texture on textured spheres.
    pub fn emission(&self) -> Color {
        self.material().emission * self.texture_color()
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Closest intersection with a parameter strictly inside `ray_t`.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitPoint<'a>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}
