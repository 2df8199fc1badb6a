//! Surface reflectance parameters.

use std::sync::Arc;

use lumen_math::{Color, Vec2};

use crate::texture::{Bitmap, HdrPanorama, TextureSource};

/// Default half-width of the specular lobe.
pub const DEFAULT_SPECULAR_DISTANCE: f32 = 0.01;

/// Material shared by any number of spheres and triangles.
///
/// Colors are linear and non-negative. `specular_distance` controls the
/// width of the mirror lobe: a sample direction counts as specular when its
/// cosine to the mirror direction exceeds `1 - specular_distance`.
#[derive(Clone, Debug)]
pub struct Material {
    pub diffuse: Color,
    pub specular: Color,
    pub emission: Color,
    pub specular_distance: f32,
    pub texture: Option<TextureSource>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Color::ZERO,
            specular: Color::ZERO,
            emission: Color::ZERO,
            specular_distance: DEFAULT_SPECULAR_DISTANCE,
            texture: None,
        }
    }
}

impl Material {
    /// Purely diffuse material.
    pub fn diffuse(diffuse: Color) -> Self {
        Self {
            diffuse,
            ..Default::default()
        }
    }

    /// Light source that reflects nothing.
    pub fn emissive(emission: Color) -> Self {
        Self {
            emission,
            ..Default::default()
        }
    }

    /// Set the emitted radiance.
    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    /// Set the specular color and lobe width.
    pub fn with_specular(mut self, specular: Color, specular_distance: f32) -> Self {
        self.specular = specular;
        self.specular_distance = specular_distance;
        self
    }

    /// Attach a texture source, replacing any existing one.
    pub fn with_texture(mut self, texture: TextureSource) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_bitmap(self, bitmap: Arc<Bitmap>) -> Self {
        self.with_texture(TextureSource::Bitmap(bitmap))
    }

    pub fn with_hdr(self, hdr: Arc<HdrPanorama>) -> Self {
        self.with_texture(TextureSource::Hdr(hdr))
    }

    /// Wrap in an `Arc` for sharing between primitives.
    pub fn shared(self) -> Arc<Material> {
        Arc::new(self)
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.cmpgt(Color::ZERO).any()
    }

    /// Color at `uv`: the texture if one is attached, otherwise the flat
    /// diffuse color.
    pub fn sample_color(&self, uv: Vec2) -> Color {
        match &self.texture {
            Some(texture) => texture.sample(uv),
            None => self.diffuse,
        }
    }
}
