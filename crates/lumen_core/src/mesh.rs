//! Indexed triangle mesh.
//!
//! A mesh is a generator: it keeps shared vertex positions so transforms
//! touch each vertex once, and expands to flat [`Triangle`]s when added to
//! a scene. Winding follows [`Triangle`]: `cross(b - a, c - a)` is the
//! front face.

use std::sync::Arc;

use lumen_math::{Aabb, Quat, Vec3};

use crate::material::Material;
use crate::primitive::Triangle;

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Aabb::enclosing(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the mesh center (center of bounding box).
    pub fn center(&self) -> Vec3 {
        self.bounds.centroid()
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.positions.iter_mut().for_each(|p| *p += offset);
        self.refresh_bounds();
    }

    /// Rotate about the origin.
    pub fn rotate(&mut self, rotation: Quat) {
        self.positions.iter_mut().for_each(|p| *p = rotation * *p);
        self.refresh_bounds();
    }

    /// Scale about the origin.
    pub fn scale(&mut self, factor: f32) {
        self.positions.iter_mut().for_each(|p| *p *= factor);
        self.refresh_bounds();
    }

    fn refresh_bounds(&mut self) {
        self.bounds = Aabb::enclosing(&self.positions);
    }

    /// Expand into flat triangles sharing `material`.
    ///
    /// Faces with out-of-range indices are skipped with a warning.
    pub fn triangles(&self, material: Arc<Material>) -> Vec<Triangle> {
        let mut triangles = Vec::with_capacity(self.triangle_count());
        let n = self.positions.len();

        for face in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
            if i0 >= n || i1 >= n || i2 >= n {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    i0,
                    i1,
                    i2,
                    n
                );
                continue;
            }
            triangles.push(Triangle::new(
                self.positions[i0],
                self.positions[i1],
                self.positions[i2],
                material.clone(),
            ));
        }

        triangles
    }
}
