//! Room scene demo.
//!
//! Renders a closed room of large spheres with a glossy ball, a marble ball
//! and a rotated cube, then saves a PNG.
//!
//! Usage: `cargo run --release --example room -- [output.png] [config.json]`

use std::sync::Arc;

use anyhow::Context;
use lumen_core::{procedural, Material, Scene, TextureSource};
use lumen_math::{Color, Quat, Vec3};
use lumen_renderer::{RayTracer, RenderConfig, RenderTarget};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "room.png".to_string());
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path))?
        }
        None => RenderConfig {
            samples_per_pixel: 64,
            jitter: true,
            ..Default::default()
        },
    };

    let scene = build_scene();
    let tracer = RayTracer::new(config).with_progress(|done, total| {
        log::info!("{:5.1}%", 100.0 * done as f64 / total as f64);
    });

    let mut target = RenderTarget::new(WIDTH, HEIGHT);
    let stats = tracer.render(&mut target, &scene)?;
    log::info!(
        "{} samples, {} primitives, {} BVH nodes in {:?}",
        stats.samples,
        stats.primitives,
        stats.bvh_nodes,
        stats.elapsed
    );

    let image = image::RgbaImage::from_raw(WIDTH, HEIGHT, target.to_rgba8())
        .context("Pixel buffer does not match image size")?;
    image
        .save(&output)
        .with_context(|| format!("Failed to save {}", output))?;
    log::info!("Saved {}", output);

    Ok(())
}

fn diffuse(color: Color) -> Arc<Material> {
    Material::diffuse(color).shared()
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();
    let r = 1000.0;

    // Walls, floor and an emissive ceiling
    scene.add_sphere(r, Vec3::new(-r - 2.0, 0.0, 0.0), diffuse(Color::new(0.75, 0.15, 0.15)));
    scene.add_sphere(r, Vec3::new(r + 2.0, 0.0, 0.0), diffuse(Color::new(0.15, 0.15, 0.75)));
    scene.add_sphere(r, Vec3::new(0.0, 0.0, r + 2.0), diffuse(Color::splat(0.75)));
    scene.add_sphere(r, Vec3::new(0.0, -r - 1.5, 0.0), diffuse(Color::splat(0.75)));
    scene.add_sphere(
        r,
        Vec3::new(0.0, r + 1.5, 0.0),
        Material::diffuse(Color::splat(0.75))
            .with_emission(Color::splat(1.5))
            .shared(),
    );

    scene.add_sphere(
        0.5,
        Vec3::new(-0.8, -1.0, 0.6),
        Material::diffuse(Color::splat(0.2))
            .with_specular(Color::splat(0.8), 0.02)
            .shared(),
    );
    scene.add_sphere(
        0.45,
        Vec3::new(0.9, -1.05, 0.2),
        Material::diffuse(Color::ONE)
            .with_texture(TextureSource::procedural(procedural::marble))
            .shared(),
    );
    scene.add_cube(
        Vec3::new(0.1, -1.2, 1.3),
        Vec3::splat(0.6),
        Quat::from_rotation_y(0.6),
        Material::diffuse(Color::new(0.9, 0.7, 0.3)).shared(),
    );

    scene.set_camera(Vec3::new(0.0, 0.0, -4.5), Vec3::new(0.0, -0.3, 0.0), Vec3::Y, 50.0);
    scene
}
