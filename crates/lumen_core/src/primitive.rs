//! Sphere and triangle primitives.
//!
//! Both are plain data: intersection lives in the renderer. Geometry only
//! changes through the explicit transform methods, which keep derived
//! fields (edges, normal) in sync.

use std::sync::Arc;

use lumen_math::{Aabb, Quat, Vec2, Vec3};

use crate::material::Material;
use crate::texture::direction_to_uv;

/// A sphere primitive.
#[derive(Clone, Debug)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero, which makes
    /// the sphere unhittable.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        if radius <= 0.0 {
            log::warn!("Sphere at {:?} has non-positive radius {}", center, radius);
        }
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::from_points(self.center - r, self.center + r)
    }

    pub fn centroid(&self) -> Vec3 {
        self.center
    }

    /// Texture coordinates of a point on the surface.
    pub fn uv_at(&self, point: Vec3) -> Vec2 {
        direction_to_uv((point - self.center).normalize_or_zero())
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.center += offset;
    }

    /// Spheres are rotation invariant and have no texture frame, so this
    /// leaves the sphere untouched.
    pub fn rotate(&mut self, _rotation: Quat) {}

    /// Scale the radius in place.
    pub fn scale(&mut self, factor: f32) {
        self.radius = (self.radius * factor).max(0.0);
    }
}

/// A single-sided triangle.
///
/// The front face is the side `cross(b - a, c - a)` points to; rays
/// arriving from behind never hit. Zero-area triangles get a zero normal.
#[derive(Clone, Debug)]
pub struct Triangle {
    a: Vec3,
    b: Vec3,
    c: Vec3,
    edge_ab: Vec3,
    edge_ac: Vec3,
    normal: Vec3,
    material: Arc<Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(a: Vec3, b: Vec3, c: Vec3, material: Arc<Material>) -> Self {
        let mut tri = Self {
            a,
            b,
            c,
            edge_ab: Vec3::ZERO,
            edge_ac: Vec3::ZERO,
            normal: Vec3::ZERO,
            material,
        };
        tri.update_derived();
        tri
    }

    fn update_derived(&mut self) {
        self.edge_ab = self.b - self.a;
        self.edge_ac = self.c - self.a;
        self.normal = self.edge_ab.cross(self.edge_ac).normalize_or_zero();
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    pub fn a(&self) -> Vec3 {
        self.a
    }

    pub fn edge_ab(&self) -> Vec3 {
        self.edge_ab
    }

    pub fn edge_ac(&self) -> Vec3 {
        self.edge_ac
    }

    /// Unit face normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::enclosing(&self.vertices())
    }

    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.a += offset;
        self.b += offset;
        self.c += offset;
        self.update_derived();
    }

    /// Rotate about the origin.
    pub fn rotate(&mut self, rotation: Quat) {
        self.a = rotation * self.a;
        self.b = rotation * self.b;
        self.c = rotation * self.c;
        self.update_derived();
    }

    /// Scale about the origin.
    pub fn scale(&mut self, factor: f32) {
        self.a *= factor;
        self.b *= factor;
        self.c *= factor;
        self.update_derived();
    }
}

/// Any primitive the renderer can intersect.
#[derive(Clone, Debug)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Primitive {
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
        }
    }

    pub fn centroid(&self) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.centroid(),
            Primitive::Triangle(t) => t.centroid(),
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        match self {
            Primitive::Sphere(s) => s.translate(offset),
            Primitive::Triangle(t) => t.translate(offset),
        }
    }

    pub fn rotate(&mut self, rotation: Quat) {
        match self {
            Primitive::Sphere(s) => s.rotate(rotation),
            Primitive::Triangle(t) => t.rotate(rotation),
        }
    }

    pub fn scale(&mut self, factor: f32) {
        match self {
            Primitive::Sphere(s) => s.scale(factor),
            Primitive::Triangle(t) => t.scale(factor),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Triangle> for Primitive {
    fn from(triangle: Triangle) -> Self {
        Primitive::Triangle(triangle)
    }
}

/// Move every triangle by `offset`.
pub fn translate_all(triangles: &mut [Triangle], offset: Vec3) {
    triangles.iter_mut().for_each(|t| t.translate(offset));
}

/// Rotate every triangle about the origin.
pub fn rotate_all(triangles: &mut [Triangle], rotation: Quat) {
    triangles.iter_mut().for_each(|t| t.rotate(rotation));
}

/// Scale every triangle about the origin.
pub fn scale_all(triangles: &mut [Triangle], factor: f32) {
    triangles.iter_mut().for_each(|t| t.scale(factor));
}
