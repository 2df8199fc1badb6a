//! Render orchestration.
//!
//! Implements Monte Carlo path tracing with:
//! - BVH (or brute-force) intersection built per render call
//! - Row-band parallelism with per-row deterministic RNG streams
//! - Progress reporting and cooperative cancellation

use std::time::{Duration, Instant};

use lumen_core::Scene;
use lumen_math::Color;
use serde::{Deserialize, Serialize};

use crate::brdf::DEFAULT_SPECULAR_BOOST;
use crate::bvh::Bvh;
use crate::camera::CameraRays;
use crate::error::{RenderError, RenderResult};
use crate::hittable::Hittable;
use crate::integrator::Integrator;
use crate::intersect::PrimitiveList;
use crate::progress::{CancelToken, Progress, ProgressCallback};
use crate::render_target::RenderTarget;
use crate::scheduler::{self, RowContext, DEFAULT_ROWS_PER_BAND};

/// How each camera ray is turned into a color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shading {
    /// Full path tracing with Russian roulette
    #[default]
    PathTraced,
    /// Surface color at the first hit, no lighting
    Flat,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Estimates averaged per pixel
    pub samples_per_pixel: u32,
    /// Maximum bounce count; 0 shows emission only
    pub max_depth: u32,
    /// Chance of ending a path at each hit, in (0, 1)
    pub roulette_stop_probability: f32,
    /// Radiance for rays that leave the scene when it has no environment
    pub background: Color,
    /// Multiplier on the specular term inside the mirror lobe
    pub specular_boost: f32,
    /// Randomize the sample position inside each pixel
    pub jitter: bool,
    /// Base seed for the per-row RNG streams
    pub seed: u64,
    /// Rows handed to one worker at a time
    pub rows_per_band: u32,
    /// Build a BVH; otherwise test every primitive per ray
    pub use_bvh: bool,
    pub shading: Shading,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            max_depth: 5,
            roulette_stop_probability: 0.8,
            background: Color::splat(0.1),
            specular_boost: DEFAULT_SPECULAR_BOOST,
            jitter: false,
            seed: 0,
            rows_per_band: DEFAULT_ROWS_PER_BAND,
            use_bvh: true,
            shading: Shading::PathTraced,
        }
    }
}

impl RenderConfig {
    /// Check the ranges the integrator relies on.
    pub fn validate(&self) -> RenderResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_pixel must be at least 1".into(),
            ));
        }
        let p = self.roulette_stop_probability;
        if !(p > 0.0 && p < 1.0) {
            return Err(RenderError::InvalidConfig(format!(
                "roulette_stop_probability must be in (0, 1), got {}",
                p
            )));
        }
        if self.rows_per_band == 0 {
            return Err(RenderError::InvalidConfig(
                "rows_per_band must be at least 1".into(),
            ));
        }
        if !self.specular_boost.is_finite() || self.specular_boost < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "specular_boost must be finite and non-negative, got {}",
                self.specular_boost
            )));
        }
        if !self.background.is_finite() {
            return Err(RenderError::InvalidConfig("background must be finite".into()));
        }
        Ok(())
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    pub pixels: usize,
    /// Camera samples traced (`pixels * samples_per_pixel`)
    pub samples: usize,
    pub primitives: usize,
    /// 0 when no BVH was built
    pub bvh_nodes: usize,
    pub elapsed: Duration,
}

/// Per-frame scene mutation, run strictly between renders.
pub trait SceneUpdate {
    /// Advance the scene by `delta` seconds. `target` is the buffer the next
    /// frame renders into.
    fn update(&mut self, scene: &mut Scene, target: &RenderTarget, delta: f32);
}

impl<F> SceneUpdate for F
where
    F: FnMut(&mut Scene, &RenderTarget, f32),
{
    fn update(&mut self, scene: &mut Scene, target: &RenderTarget, delta: f32) {
        self(scene, target, delta)
    }
}

/// CPU path tracer.
///
/// Holds the configuration plus the progress callback and cancel token,
/// which are not part of the serializable config.
#[derive(Default)]
pub struct RayTracer {
    pub config: RenderConfig,
    progress: Option<Box<ProgressCallback>>,
    cancel: CancelToken,
}

impl RayTracer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Receive `(pixels_done, pixels_total)` about every 1% of the image
    /// and on completion. Called from worker threads.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Use an existing token, e.g. one shared with a UI thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the current and any later render until reset.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Render `scene` into `target`, overwriting every pixel.
    ///
    /// Blocks until all rows are done. Builds a fresh BVH on the calling
    /// thread, then renders row bands on the rayon pool.
    pub fn render(&self, target: &mut RenderTarget, scene: &Scene) -> RenderResult<RenderStats> {
        let config = &self.config;
        config.validate()?;

        let (width, height) = (target.width(), target.height());
        if target.is_empty() {
            log::warn!("Render target is {}x{}, nothing to render", width, height);
            return Ok(RenderStats::default());
        }

        let start = Instant::now();
        log::info!(
            "Rendering {}x{} @ {} spp, {} primitives",
            width,
            height,
            config.samples_per_pixel,
            scene.primitive_count()
        );

        let bvh = if config.use_bvh {
            Bvh::build(&scene.triangles, &scene.spheres)
        } else {
            None
        };
        let list = PrimitiveList::new(&scene.triangles, &scene.spheres);
        let geometry: Option<&dyn Hittable> = match &bvh {
            _ if scene.is_empty() => None,
            Some(bvh) => Some(bvh),
            None => Some(&list),
        };
        if let Some(bvh) = &bvh {
            log::info!(
                "BVH: {} nodes, depth {} ({:?})",
                bvh.node_count(),
                bvh.depth(),
                start.elapsed()
            );
        }

        let ctx = RowContext {
            camera: CameraRays::new(&scene.camera, width, height),
            integrator: Integrator::new(geometry, scene, config),
            samples_per_pixel: config.samples_per_pixel,
            jitter: config.jitter,
            seed: config.seed,
        };
        let total = target.pixel_count();
        let progress = Progress::new(total, self.progress.as_deref());

        scheduler::render_bands(
            target.pixels_mut(),
            width,
            height,
            config.rows_per_band,
            &ctx,
            &progress,
            &self.cancel,
        )
        .inspect_err(|_| {
            log::info!("Render cancelled after {} of {} pixels", progress.done(), total);
        })?;

        let stats = RenderStats {
            pixels: total,
            samples: total * config.samples_per_pixel as usize,
            primitives: scene.primitive_count(),
            bvh_nodes: bvh.as_ref().map_or(0, Bvh::node_count),
            elapsed: start.elapsed(),
        };
        log::info!("Rendered {} samples in {:?}", stats.samples, stats.elapsed);
        Ok(stats)
    }

    /// Run `update` on the scene, then render it.
    pub fn render_frame(
        &self,
        target: &mut RenderTarget,
        scene: &mut Scene,
        update: &mut dyn SceneUpdate,
        delta: f32,
    ) -> RenderResult<RenderStats> {
        update.update(scene, target, delta);
        self.render(target, scene)
    }
}

/// Render with a one-off tracer and no progress reporting.
pub fn render(target: &mut RenderTarget, scene: &Scene, config: &RenderConfig) -> RenderResult<RenderStats> {
    RayTracer::new(config.clone()).render(target, scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Material;
    use lumen_math::Vec3;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn mat(diffuse: Color, emission: Color) -> Arc<Material> {
        Material::diffuse(diffuse).with_emission(emission).shared()
    }

    /// Five big spheres forming a room, a light and a glossy ball.
    fn room_scene() -> Scene {
        let mut scene = Scene::new();
        let r = 1000.0;
        let white = mat(Color::splat(0.8), Color::ZERO);
        scene.add_sphere(r, Vec3::new(-r - 1.0, 0.0, 0.0), mat(Color::new(0.8, 0.1, 0.1), Color::ZERO));
        scene.add_sphere(r, Vec3::new(r + 1.0, 0.0, 0.0), mat(Color::new(0.1, 0.1, 0.8), Color::ZERO));
        scene.add_sphere(r, Vec3::new(0.0, 0.0, r + 1.0), white.clone());
        scene.add_sphere(r, Vec3::new(0.0, -r - 1.0, 0.0), white.clone());
        scene.add_sphere(r, Vec3::new(0.0, r + 1.0, 0.0), mat(Color::splat(0.8), Color::splat(2.0)));
        scene.add_sphere(
            0.3,
            Vec3::new(-0.5, -0.7, -0.2),
            Material::diffuse(Color::splat(0.3))
                .with_specular(Color::splat(0.9), 0.01)
                .shared(),
        );
        scene.add_sphere(0.25, Vec3::new(0.4, -0.75, 0.1), mat(Color::new(1.0, 0.8, 0.4), Color::ZERO));
        scene.set_camera(Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 0.0, 6.0), Vec3::Y, 36.0);
        scene
    }

    fn config() -> RenderConfig {
        RenderConfig {
            seed: 1234,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_values() {
        let config = RenderConfig::default();
        assert_eq!(config.samples_per_pixel, 1);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.roulette_stop_probability, 0.8);
        assert_eq!(config.background, Color::splat(0.1));
        assert_eq!(config.specular_boost, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "samples_per_pixel": 8, "jitter": true, "shading": "flat" }"#;
        let config: RenderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.samples_per_pixel, 8);
        assert!(config.jitter);
        assert_eq!(config.shading, Shading::Flat);
        assert_eq!(config.max_depth, 5);
        assert!(config.use_bvh);
    }

    #[test]
    fn test_config_validation() {
        let bad_spp = RenderConfig {
            samples_per_pixel: 0,
            ..Default::default()
        };
        assert!(matches!(bad_spp.validate(), Err(RenderError::InvalidConfig(_))));

        for p in [0.0, 1.0, -0.5, f32::NAN] {
            let cfg = RenderConfig {
                roulette_stop_probability: p,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "p = {} accepted", p);
        }

        let mut target = RenderTarget::new(4, 4);
        assert!(render(&mut target, &Scene::new(), &bad_spp).is_err());
    }

    #[test]
    fn test_emissive_sphere_fills_view_at_depth_zero() {
        let mut scene = Scene::new();
        scene.add_sphere(50.0, Vec3::ZERO, Material::emissive(Color::new(3.0, 2.0, 1.0)).shared());
        scene.set_camera(Vec3::new(0.0, 0.0, -60.0), Vec3::ZERO, Vec3::Y, 10.0);

        let config = RenderConfig {
            max_depth: 0,
            ..config()
        };
        let mut target = RenderTarget::new(16, 16);
        render(&mut target, &scene, &config).unwrap();
        assert!(target.pixels().iter().all(|c| *c == Color::new(3.0, 2.0, 1.0)));
    }

    #[test]
    fn test_empty_scene_is_background() {
        let mut target = RenderTarget::new(8, 4);
        target.clear(Color::ONE);
        let stats = render(&mut target, &Scene::new(), &config()).unwrap();
        assert!(target.pixels().iter().all(|c| *c == Color::splat(0.1)));
        assert_eq!(stats.bvh_nodes, 0);
        assert_eq!(stats.pixels, 32);
    }

    #[test]
    fn test_zero_size_target() {
        let mut target = RenderTarget::new(0, 0);
        let stats = render(&mut target, &room_scene(), &config()).unwrap();
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn test_room_scene_is_deterministic() {
        let scene = room_scene();
        let config = RenderConfig {
            max_depth: 0,
            ..config()
        };

        let mut first = RenderTarget::new(64, 64);
        let stats = render(&mut first, &scene, &config).unwrap();
        assert_eq!(stats.primitives, 7);
        assert!(stats.bvh_nodes >= 1);

        // Band size must not change a fixed-seed result
        let mut second = RenderTarget::new(64, 64);
        let banded = RenderConfig {
            rows_per_band: 5,
            ..config.clone()
        };
        render(&mut second, &scene, &banded).unwrap();
        assert_eq!(first, second);

        // Top rows see the ceiling light, everything else is unlit
        for (x, y) in [(32, 0), (20, 3), (44, 6), (5, 0)] {
            assert_eq!(first.get(x, y), Color::splat(2.0), "pixel ({}, {})", x, y);
        }
        for (x, y) in [(32, 14), (5, 32), (60, 32), (32, 40), (32, 62), (20, 52), (0, 5)] {
            assert_eq!(first.get(x, y), Color::ZERO, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn test_room_reference_pixels() {
        let config = RenderConfig {
            shading: Shading::Flat,
            ..config()
        };
        let mut target = RenderTarget::new(64, 64);
        render(&mut target, &room_scene(), &config).unwrap();

        let red = Color::new(0.8, 0.1, 0.1);
        let blue = Color::new(0.1, 0.1, 0.8);
        let white = Color::splat(0.8);
        let glossy = Color::splat(0.3);
        let gold = Color::new(1.0, 0.8, 0.4);
        let expected = [
            ((32, 0), white),
            ((5, 0), white),
            ((44, 6), white),
            ((32, 14), white),
            ((32, 40), white),
            ((32, 62), white),
            ((0, 5), red),
            ((5, 32), red),
            ((60, 32), blue),
            ((63, 20), blue),
            ((20, 52), glossy),
            ((38, 54), gold),
        ];
        for ((x, y), color) in expected {
            assert_eq!(target.get(x, y), color, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn test_rows_replay_from_seeded_streams() {
        let scene = room_scene();
        let config = RenderConfig {
            samples_per_pixel: 3,
            jitter: true,
            rows_per_band: 7,
            ..config()
        };
        let (width, height) = (24, 16);
        let mut target = RenderTarget::new(width, height);
        render(&mut target, &scene, &config).unwrap();

        // Each row draws from its own stream: per pixel left to right, per
        // sample the jitter first, then the path.
        let bvh = Bvh::build(&scene.triangles, &scene.spheres).unwrap();
        let integrator = Integrator::new(Some(&bvh), &scene, &config);
        let camera = CameraRays::new(&scene.camera, width, height);
        for y in [0, 9, 15] {
            let mut rng = scheduler::row_rng(config.seed, y);
            for x in 0..width {
                let mut sum = Color::ZERO;
                for _ in 0..3 {
                    let ray = camera.jittered_ray(x, y, &mut rng);
                    sum += integrator.radiance(ray, &mut rng);
                }
                assert_eq!(target.get(x, y), sum / 3.0, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let scene = room_scene();
        let config = RenderConfig {
            samples_per_pixel: 2,
            jitter: true,
            ..config()
        };
        let tracer = RayTracer::new(config);

        let mut first = RenderTarget::new(24, 16);
        let mut second = RenderTarget::new(24, 16);
        tracer.render(&mut first, &scene).unwrap();
        tracer.render(&mut second, &scene).unwrap();
        assert_eq!(first, second);
        assert!(first.pixels().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_bvh_and_linear_paths_agree() {
        let scene = room_scene();
        let mut with_bvh = RenderTarget::new(32, 32);
        let mut linear = RenderTarget::new(32, 32);
        render(&mut with_bvh, &scene, &config()).unwrap();
        let no_bvh = RenderConfig {
            use_bvh: false,
            ..config()
        };
        let stats = render(&mut linear, &scene, &no_bvh).unwrap();
        assert_eq!(stats.bvh_nodes, 0);
        assert_eq!(with_bvh, linear);
    }

    #[test]
    fn test_progress_reaches_total() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        let tracer = RayTracer::new(config())
            .with_progress(move |done, total| sink.lock().unwrap().push((done, total)));

        let mut target = RenderTarget::new(40, 30);
        tracer.render(&mut target, &room_scene()).unwrap();

        let reports = reports.lock().unwrap();
        assert_eq!(reports.iter().map(|r| r.0).max(), Some(1200));
        assert!(reports.iter().all(|r| r.1 == 1200));
        assert!(reports.len() <= 101);
    }

    #[test]
    fn test_cancelled_render_returns_error() {
        let tracer = RayTracer::new(config());
        let token = tracer.cancel_token();
        token.cancel();

        let mut target = RenderTarget::new(16, 16);
        let result = tracer.render(&mut target, &room_scene());
        assert_eq!(result, Err(RenderError::Cancelled));

        token.reset();
        assert!(tracer.render(&mut target, &room_scene()).is_ok());
    }

    #[test]
    fn test_cancel_from_progress_callback() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let tracer = RayTracer::new(RenderConfig {
            rows_per_band: 1,
            ..config()
        })
        .with_cancel_token(token)
        .with_progress(move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
            trigger.cancel();
        });

        let mut target = RenderTarget::new(8, 400);
        let result = tracer.render(&mut target, &room_scene());
        assert_eq!(result, Err(RenderError::Cancelled));
        assert!(calls.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn test_render_frame_runs_update_first() {
        let mut scene = Scene::new();
        let tracer = RayTracer::new(RenderConfig {
            max_depth: 0,
            ..config()
        });
        let mut target = RenderTarget::new(4, 4);

        let mut update = |scene: &mut Scene, target: &RenderTarget, delta: f32| {
            assert_eq!(target.width(), 4);
            assert_eq!(delta, 0.5);
            scene.add_sphere(100.0, Vec3::ZERO, Material::emissive(Color::ONE).shared());
        };
        let stats = tracer
            .render_frame(&mut target, &mut scene, &mut update, 0.5)
            .unwrap();
        assert_eq!(stats.primitives, 1);
        assert_eq!(target.get(0, 0), Color::ONE);
    }
}
