//! Composite shapes expanded into flat triangle lists.
//!
//! Generators do not participate in hit testing; the scene stores the
//! triangles they emit. To move a generated shape, transform the returned
//! triangles or regenerate it.

use std::sync::Arc;

use lumen_math::{Quat, Vec3};

use crate::material::Material;
use crate::primitive::Triangle;

/// Corner indices of the 12 cube triangles, wound so every face normal
/// points away from the center.
const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 1, 5], [0, 5, 4], // bottom (-Y)
    [3, 7, 6], [3, 6, 2], // top (+Y)
    [4, 5, 6], [4, 6, 7], // front (+Z)
    [0, 3, 2], [0, 2, 1], // back (-Z)
    [1, 2, 6], [1, 6, 5], // right (+X)
    [0, 4, 7], [0, 7, 3], // left (-X)
];

/// The 8 corners of an oriented box.
pub fn cube_corners(center: Vec3, size: Vec3, rotation: Quat) -> [Vec3; 8] {
    let h = size / 2.0;
    [
        Vec3::new(-h.x, -h.y, -h.z),
        Vec3::new(h.x, -h.y, -h.z),
        Vec3::new(h.x, h.y, -h.z),
        Vec3::new(-h.x, h.y, -h.z),
        Vec3::new(-h.x, -h.y, h.z),
        Vec3::new(h.x, -h.y, h.z),
        Vec3::new(h.x, h.y, h.z),
        Vec3::new(-h.x, h.y, h.z),
    ]
    .map(|p| rotation * p + center)
}

/// An oriented box as 12 outward-facing triangles.
pub fn cube(center: Vec3, size: Vec3, rotation: Quat, material: Arc<Material>) -> Vec<Triangle> {
    let p = cube_corners(center, size, rotation);
    CUBE_FACES
        .iter()
        .map(|[a, b, c]| Triangle::new(p[*a], p[*b], p[*c], material.clone()))
        .collect()
}

/// A parallelogram spanned from `corner` by two sides, as two triangles.
///
/// `side2` is made orthogonal to `side1` first, so the result is a true
/// rectangle. The front face is `cross(side1, side2)`.
pub fn rectangle(corner: Vec3, side1: Vec3, side2: Vec3, material: Arc<Material>) -> [Triangle; 2] {
    let u_dir = side1.normalize_or_zero();
    let side2 = side2 - side2.dot(u_dir) * u_dir;

    let p0 = corner;
    let p1 = corner + side1;
    let p2 = corner + side2;
    let p3 = corner + side1 + side2;

    [
        Triangle::new(p0, p1, p2, material.clone()),
        Triangle::new(p1, p3, p2, material),
    ]
}
