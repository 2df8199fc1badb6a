//! Monte Carlo path integrator.
//!
//! Paths are traced iteratively with a throughput weight instead of
//! recursing per bounce. Random numbers are drawn in the same order as the
//! recursive formulation: the roulette draw, then the hemisphere sample.

use std::f32::consts::PI;

use lumen_core::Scene;
use lumen_math::{Color, Interval, Ray, Vec3};
use rand::{Rng, RngCore};

use crate::brdf;
use crate::hittable::Hittable;
use crate::renderer::{RenderConfig, Shading};

/// Offset applied along the normal when spawning a bounce ray.
pub const ORIGIN_NUDGE: f32 = 1e-4;

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform direction on the hemisphere around `normal`.
///
/// Rejection-samples the unit ball from the `[-1, 1]³` cube, flips the
/// point into the normal's hemisphere and normalizes it.
pub fn sample_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = p.length_squared();
        if len_sq > 1.0 || len_sq < 1e-12 {
            continue;
        }
        let p = if p.dot(normal) < 0.0 { -p } else { p };
        return p / len_sq.sqrt();
    }
}

/// Radiance estimator over a scene and its intersection structure.
pub struct Integrator<'s> {
    geometry: Option<&'s dyn Hittable>,
    scene: &'s Scene,
    config: &'s RenderConfig,
}

impl<'s> Integrator<'s> {
    /// `geometry` is `None` for a scene with no primitives; every ray then
    /// sees the background.
    pub fn new(geometry: Option<&'s dyn Hittable>, scene: &'s Scene, config: &'s RenderConfig) -> Self {
        Self {
            geometry,
            scene,
            config,
        }
    }

    /// Radiance arriving along a ray that leaves the scene.
    pub fn miss(&self, direction: Vec3) -> Color {
        match &self.scene.environment {
            Some(env) => env.radiance(direction),
            None => self.config.background,
        }
    }

    /// One radiance estimate along `ray`, using the configured shading.
    pub fn radiance(&self, ray: Ray, rng: &mut dyn RngCore) -> Color {
        match self.config.shading {
            Shading::PathTraced => self.trace(ray, rng),
            Shading::Flat => self.shade_flat(&ray),
        }
    }

    /// Path-traced radiance estimate with Russian roulette.
    pub fn trace(&self, mut ray: Ray, rng: &mut dyn RngCore) -> Color {
        let Some(geometry) = self.geometry else {
            return self.miss(ray.direction);
        };

        let p = self.config.roulette_stop_probability;
        let weight = 2.0 * PI / (1.0 - p);

        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut depth = 0;

        loop {
            let Some(hit) = geometry.hit(&ray, Interval::from_min(0.0)) else {
                radiance += throughput * self.miss(ray.direction);
                break;
            };

            let tex = hit.texture_color();
            radiance += throughput * hit.material().emission * tex;

            if gen_f32(rng) < p || depth >= self.config.max_depth {
                break;
            }

            let direction = sample_hemisphere(hit.normal, rng);
            let cos_theta = direction.dot(hit.normal).max(0.0);
            let f = brdf::evaluate(
                hit.material(),
                tex,
                ray.direction,
                direction,
                hit.normal,
                self.config.specular_boost,
            );
            throughput *= f * (weight * cos_theta);

            ray = Ray::new(hit.point + ORIGIN_NUDGE * hit.normal, direction);
            depth += 1;
        }

        radiance
    }

    /// Unlit preview: the surface color at the first hit.
    pub fn shade_flat(&self, ray: &Ray) -> Color {
        let hit = self
            .geometry
            .and_then(|g| g.hit(ray, Interval::from_min(0.0)));
        match hit {
            Some(hit) => hit.material().diffuse * hit.texture_color(),
            None => self.miss(ray.direction),
        }
    }
}
