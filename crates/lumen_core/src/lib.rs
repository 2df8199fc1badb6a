//! Lumen Core - scene description for the Lumen path tracer.
//!
//! This crate provides:
//!
//! - **Primitives**: `Sphere`, `Triangle` and the closed `Primitive` enum
//! - **Generators**: cubes, rectangles and indexed `Mesh`es expanded to triangles
//! - **Materials**: diffuse/specular/emissive parameters with an optional
//!   bitmap, HDR or procedural texture
//! - **Scene**: primitive lists, `Camera` and optional HDR `Environment`
//!
//! # Example
//!
//! ```
//! use lumen_core::{Material, Scene};
//! use lumen_math::Vec3;
//!
//! let mut scene = Scene::new();
//! let red = Material::diffuse(Vec3::new(0.8, 0.1, 0.1)).shared();
//! scene.add_sphere(1.0, Vec3::ZERO, red);
//! scene.set_camera(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y, 60.0);
//! assert_eq!(scene.primitive_count(), 1);
//! ```

pub mod camera;
pub mod material;
pub mod mesh;
pub mod primitive;
pub mod procedural;
pub mod scene;
pub mod shapes;
pub mod texture;

// Re-export commonly used types
pub use camera::{Camera, CameraBasis};
pub use material::Material;
pub use mesh::Mesh;
pub use primitive::{Primitive, Sphere, Triangle};
pub use scene::{Environment, Scene};
pub use texture::{Bitmap, HdrPanorama, TextureError, TextureSource};
