//! Diffuse plus narrow-lobe specular reflectance.

use std::f32::consts::FRAC_1_PI;

use lumen_core::Material;
use lumen_math::{Color, Vec3};

/// Default multiplier applied to the specular term inside the lobe.
pub const DEFAULT_SPECULAR_BOOST: f32 = 10.0;

/// Mirror `v` about the unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Evaluate the BRDF for light leaving along `outgoing` after arriving
/// along `incoming` (the direction of travel of the incident ray).
///
/// `tex` modulates both terms. Directions within `specular_distance` of
/// the mirror direction (by cosine) pick up `specular_boost` times the
/// specular term on top of the diffuse term.
pub fn evaluate(
    material: &Material,
    tex: Color,
    incoming: Vec3,
    outgoing: Vec3,
    normal: Vec3,
    specular_boost: f32,
) -> Color {
    let diffuse = material.diffuse * tex * FRAC_1_PI;
    let specular = material.specular * tex * FRAC_1_PI;

    let mirror = reflect(incoming.normalize_or_zero(), normal.normalize_or_zero());
    if outgoing.normalize_or_zero().dot(mirror) > 1.0 - material.specular_distance {
        diffuse + specular_boost * specular
    } else {
        diffuse
    }
}
