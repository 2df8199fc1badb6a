//! Texture sources sampled by materials.
//!
//! Bitmaps hold 8-bit sRGB pixels and are decoded to linear on lookup.
//! HDR panoramas hold linear float RGB and are returned as-is. Both use
//! nearest-neighbour lookup with UVs clamped to the image bounds.

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use lumen_math::{Color, Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur when building a texture from raw data.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Texture has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },

    #[error("Texture data has {actual} values, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

fn check_len(width: u32, height: u32, channels: usize, actual: usize) -> TextureResult<()> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroSize { width, height });
    }
    let expected = width as usize * height as usize * channels;
    if actual != expected {
        return Err(TextureError::SizeMismatch { expected, actual });
    }
    Ok(())
}

/// Map a UV coordinate to a clamped pixel index.
#[inline]
fn texel_index(uv: Vec2, width: u32, height: u32) -> usize {
    let x = ((uv.x * width as f32) as i64).clamp(0, width as i64 - 1) as usize;
    let y = ((uv.y * height as f32) as i64).clamp(0, height as i64 - 1) as usize;
    y * width as usize + x
}

/// Decode an 8-bit sRGB channel to linear with a plain 2.2 gamma.
#[inline]
pub fn srgb_to_linear(value: u8) -> f32 {
    (value as f32 / 255.0).powf(2.2)
}

/// UV of a unit direction under the equirectangular mapping used for
/// spheres and environment panoramas.
///
/// `u = 0.5 + atan2(z, x) / 2π`, `v = 0.5 - asin(y) / π`.
pub fn direction_to_uv(dir: Vec3) -> Vec2 {
    let u = 0.5 + dir.z.atan2(dir.x) / (2.0 * PI);
    let v = 0.5 - dir.y.clamp(-1.0, 1.0).asin() / PI;
    Vec2::new(u, v)
}

/// An 8-bit RGB image used as a surface texture.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    /// Row-major RGB triples
    pixels: Vec<[u8; 3]>,
}

impl Bitmap {
    /// Create a bitmap from interleaved RGB bytes.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> TextureResult<Self> {
        check_len(width, height, 3, rgb.len())?;
        let pixels = rgb.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a bitmap from an already-decoded image.
    pub fn from_image(image: &image::RgbImage) -> TextureResult<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.as_raw().clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-neighbour lookup, returned as linear color.
    pub fn sample(&self, uv: Vec2) -> Color {
        let [r, g, b] = self.pixels[texel_index(uv, self.width, self.height)];
        Color::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }
}

/// A linear floating-point equirectangular image.
#[derive(Clone, Debug)]
pub struct HdrPanorama {
    width: u32,
    height: u32,
    /// Row-major RGB floats
    data: Vec<f32>,
}

impl HdrPanorama {
    /// Create a panorama from interleaved linear RGB floats.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> TextureResult<Self> {
        check_len(width, height, 3, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-neighbour lookup. Data is already linear.
    pub fn sample(&self, uv: Vec2) -> Color {
        let idx = texel_index(uv, self.width, self.height) * 3;
        Color::new(self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Look up the radiance seen along a world direction.
    pub fn sample_direction(&self, dir: Vec3) -> Color {
        self.sample(direction_to_uv(dir.normalize_or_zero()))
    }
}

/// A pure `uv -> linear color` function supplied by scene setup.
pub type ProceduralFn = dyn Fn(Vec2) -> Color + Send + Sync;

/// The single color source a material may carry.
#[derive(Clone)]
pub enum TextureSource {
    Hdr(Arc<HdrPanorama>),
    Procedural(Arc<ProceduralFn>),
    Bitmap(Arc<Bitmap>),
}

impl TextureSource {
    /// Wrap a closure as a procedural source.
    pub fn procedural<F>(f: F) -> Self
    where
        F: Fn(Vec2) -> Color + Send + Sync + 'static,
    {
        TextureSource::Procedural(Arc::new(f))
    }

    /// Linear color at `uv`.
    pub fn sample(&self, uv: Vec2) -> Color {
        match self {
            TextureSource::Hdr(hdr) => hdr.sample(uv),
            TextureSource::Procedural(f) => f(uv),
            TextureSource::Bitmap(bitmap) => bitmap.sample(uv),
        }
    }
}

impl fmt::Debug for TextureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureSource::Hdr(hdr) => write!(f, "Hdr({}x{})", hdr.width, hdr.height),
            TextureSource::Procedural(_) => f.write_str("Procedural(..)"),
            TextureSource::Bitmap(bmp) => write!(f, "Bitmap({}x{})", bmp.width, bmp.height),
        }
    }
}
