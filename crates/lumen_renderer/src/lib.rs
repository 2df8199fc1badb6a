//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over `lumen_core` scenes: BVH acceleration,
//! a diffuse + boosted-mirror BRDF, Russian roulette path termination and
//! row-parallel rendering with progress and cancellation.
//!
//! # Example
//!
//! ```
//! use lumen_core::{Material, Scene};
//! use lumen_math::Vec3;
//! use lumen_renderer::{RayTracer, RenderConfig, RenderTarget};
//!
//! let mut scene = Scene::new();
//! scene.add_sphere(1.0, Vec3::ZERO, Material::emissive(Vec3::ONE).shared());
//!
//! let tracer = RayTracer::new(RenderConfig::default());
//! let mut target = RenderTarget::new(32, 24);
//! let stats = tracer.render(&mut target, &scene).unwrap();
//! assert_eq!(stats.pixels, 32 * 24);
//! ```

mod brdf;
mod bvh;
mod camera;
mod error;
mod hittable;
mod integrator;
mod intersect;
mod progress;
mod render_target;
mod renderer;
mod scheduler;

pub use brdf::{evaluate as evaluate_brdf, reflect, DEFAULT_SPECULAR_BOOST};
pub use bvh::Bvh;
pub use camera::CameraRays;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitObject, HitPoint, Hittable};
pub use integrator::{sample_hemisphere, Integrator};
pub use intersect::{ray_sphere, ray_triangle, PrimitiveList};
pub use progress::{CancelToken, ProgressCallback};
pub use render_target::{color_to_rgba, RenderTarget};
pub use renderer::{render, RayTracer, RenderConfig, RenderStats, SceneUpdate, Shading};
pub use scheduler::{row_bands, row_rng, RowBand, DEFAULT_ROWS_PER_BAND};

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Color, Interval, Ray, Vec3};
