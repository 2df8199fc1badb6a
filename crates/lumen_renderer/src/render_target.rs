//! Linear color buffer written by the renderer.

use lumen_math::Color;

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Apply display gamma (2.2) to a linear value already clamped to [0, 1].
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    linear.powf(1.0 / 2.2)
}

/// Convert a color to 8-bit RGBA: clamp, gamma encode, quantize.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let encode = |c: f32| (255.0 * linear_to_gamma(clamp_01(c))) as u8;
    [encode(color.x), encode(color.y), encode(color.z), 255]
}

/// Row-major image of linear HDR colors.
///
/// Every render overwrites the whole buffer. Values are unbounded;
/// tone mapping and gamma are left to the consumer, with
/// [`RenderTarget::to_rgba8`] as the simple clamp-and-gamma path.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl RenderTarget {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y). Row 0 is the top of the image.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Flat `[r, g, b, r, g, b, ...]` view of the buffer, without copying.
    pub fn as_floats(&self) -> &[f32] {
        lumen_math::as_floats(&self.pixels)
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}
