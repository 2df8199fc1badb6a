//! Lumen Math - vector types and ray/box primitives shared by the scene
//! description and the path tracer.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Linear RGB color. Components are unbounded (HDR).
pub type Color = Vec3;

/// Reinterpret a slice of vectors as a flat slice of floats (x, y, z, x, ...).
///
/// Useful for handing a color buffer to an encoder without copying.
pub fn as_floats(vectors: &[Vec3]) -> &[f32] {
    bytemuck::cast_slice(vectors)
}
