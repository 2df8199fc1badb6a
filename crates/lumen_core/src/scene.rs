//! Scene description consumed by the renderer.
//!
//! A scene is a flat list of spheres and triangles plus a camera and an
//! optional environment panorama. Composite shapes are expanded to
//! triangles when they are added. The renderer only reads a scene; edits
//! happen between render calls through `&mut Scene`.

use std::sync::Arc;

use lumen_math::{Aabb, Color, Quat, Vec3};

use crate::camera::Camera;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::primitive::{Primitive, Sphere, Triangle};
use crate::shapes;
use crate::texture::HdrPanorama;

/// HDR panorama lighting rays that leave the scene.
#[derive(Clone, Debug)]
pub struct Environment {
    pub panorama: Arc<HdrPanorama>,
    /// Multiplier applied to every panorama lookup
    pub intensity: f32,
}

impl Environment {
    pub fn new(panorama: Arc<HdrPanorama>, intensity: f32) -> Self {
        Self {
            panorama,
            intensity,
        }
    }

    /// Radiance arriving from `direction`.
    pub fn radiance(&self, direction: Vec3) -> Color {
        self.panorama.sample_direction(direction) * self.intensity
    }
}

/// A complete renderable scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub triangles: Vec<Triangle>,
    pub camera: Camera,
    pub environment: Option<Environment>,
}

impl Scene {
    /// Create an empty scene with the default camera.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sphere and return its index in [`Scene::spheres`].
    pub fn add_sphere(&mut self, radius: f32, center: Vec3, material: Arc<Material>) -> usize {
        self.spheres.push(Sphere::new(center, radius, material));
        self.spheres.len() - 1
    }

    /// Add a triangle and return its index in [`Scene::triangles`].
    pub fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, material: Arc<Material>) -> usize {
        self.triangles.push(Triangle::new(a, b, c, material));
        self.triangles.len() - 1
    }

    /// Append already-built triangles.
    pub fn add_triangles(&mut self, triangles: impl IntoIterator<Item = Triangle>) {
        self.triangles.extend(triangles);
    }

    /// Add any primitive.
    pub fn add_primitive(&mut self, primitive: impl Into<Primitive>) {
        match primitive.into() {
            Primitive::Sphere(s) => self.spheres.push(s),
            Primitive::Triangle(t) => self.triangles.push(t),
        }
    }

    /// Add an oriented box as 12 triangles.
    pub fn add_cube(&mut self, center: Vec3, size: Vec3, rotation: Quat, material: Arc<Material>) {
        self.add_triangles(shapes::cube(center, size, rotation, material));
    }

    /// Add a rectangle as 2 triangles.
    pub fn add_rectangle(&mut self, corner: Vec3, side1: Vec3, side2: Vec3, material: Arc<Material>) {
        self.add_triangles(shapes::rectangle(corner, side1, side2, material));
    }

    /// Expand a mesh into triangles sharing `material`.
    pub fn add_mesh(&mut self, mesh: &Mesh, material: Arc<Material>) {
        self.add_triangles(mesh.triangles(material));
    }

    pub fn set_camera(&mut self, position: Vec3, look_at: Vec3, up: Vec3, fov_degrees: f32) {
        self.camera = Camera::new(position, look_at, up, fov_degrees);
    }

    pub fn set_environment(&mut self, panorama: Arc<HdrPanorama>, intensity: f32) {
        self.environment = Some(Environment::new(panorama, intensity));
    }

    /// Total number of spheres and triangles.
    pub fn primitive_count(&self) -> usize {
        self.spheres.len() + self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }

    /// Bounding box of every primitive, or [`Aabb::EMPTY`] for an empty
    /// scene.
    pub fn world_bounds(&self) -> Aabb {
        let spheres = self.spheres.iter().map(Sphere::bounding_box);
        let triangles = self.triangles.iter().map(Triangle::bounding_box);
        spheres
            .chain(triangles)
            .reduce(|a, b| Aabb::surrounding(&a, &b))
            .unwrap_or(Aabb::EMPTY)
    }
}
