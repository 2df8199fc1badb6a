//! Row-band scheduling for parallel rendering.
//!
//! The image is split into horizontal bands of whole rows. Each band is a
//! disjoint `&mut` slice of the target, rendered by one rayon worker. Every
//! row seeds its own RNG stream from `(seed, row)`, so the result does not
//! depend on band size or thread count.

use lumen_math::Color;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::camera::CameraRays;
use crate::error::{RenderError, RenderResult};
use crate::integrator::Integrator;
use crate::progress::{CancelToken, Progress};

/// Default number of rows per band.
pub const DEFAULT_ROWS_PER_BAND: u32 = 16;

/// A horizontal range of image rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    /// First row in the band
    pub y: u32,
    /// Number of rows
    pub rows: u32,
    /// Index of this band, top to bottom
    pub index: usize,
}

/// Split `height` rows into bands of `rows_per_band`; the last band may be
/// shorter.
pub fn row_bands(height: u32, rows_per_band: u32) -> Vec<RowBand> {
    let rows_per_band = rows_per_band.max(1);
    (0..height)
        .step_by(rows_per_band as usize)
        .enumerate()
        .map(|(index, y)| RowBand {
            y,
            rows: rows_per_band.min(height - y),
            index,
        })
        .collect()
}

/// Everything a worker needs to render a row.
pub(crate) struct RowContext<'a> {
    pub camera: CameraRays,
    pub integrator: Integrator<'a>,
    pub samples_per_pixel: u32,
    pub jitter: bool,
    pub seed: u64,
}

/// Deterministic RNG for one image row.
pub fn row_rng(seed: u64, row: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(row as u64);
    rng
}

/// Render one row into `row`, averaging `samples_per_pixel` estimates per
/// pixel.
pub(crate) fn render_row(row: &mut [Color], y: u32, ctx: &RowContext) {
    let mut rng = row_rng(ctx.seed, y);
    let spp = ctx.samples_per_pixel;

    for (x, pixel) in row.iter_mut().enumerate() {
        let x = x as u32;
        let mut sum = Color::ZERO;
        for _ in 0..spp {
            let ray = if ctx.jitter {
                ctx.camera.jittered_ray(x, y, &mut rng)
            } else {
                ctx.camera.center_ray(x, y)
            };
            sum += ctx.integrator.radiance(ray, &mut rng);
        }
        *pixel = sum / spp as f32;
    }
}

/// Render every row of `pixels` (row-major, `width` by `height`) in
/// parallel, one band per task.
///
/// Cancellation is checked before each row. A cancelled render leaves the
/// rows it already finished in place.
pub(crate) fn render_bands(
    pixels: &mut [Color],
    width: u32,
    height: u32,
    rows_per_band: u32,
    ctx: &RowContext,
    progress: &Progress,
    cancel: &CancelToken,
) -> RenderResult<()> {
    let bands = row_bands(height, rows_per_band);
    let band_len = width as usize * rows_per_band.max(1) as usize;

    pixels
        .par_chunks_mut(band_len)
        .zip(bands.par_iter())
        .try_for_each(|(band_pixels, band)| {
            for (offset, row) in band_pixels.chunks_mut(width as usize).enumerate() {
                if cancel.is_cancelled() {
                    return Err(RenderError::Cancelled);
                }
                render_row(row, band.y + offset as u32, ctx);
                progress.advance(width as usize);
            }
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_row_bands_exact_fit() {
        let bands = row_bands(64, 16);
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[3], RowBand { y: 48, rows: 16, index: 3 });
    }

    #[test]
    fn test_row_bands_partial_fit() {
        let bands = row_bands(100, 16);
        assert_eq!(bands.len(), 7);
        let total: u32 = bands.iter().map(|b| b.rows).sum();
        assert_eq!(total, 100);
        assert_eq!(bands[6].rows, 4);
    }

    #[test]
    fn test_row_bands_degenerate() {
        assert!(row_bands(0, 16).is_empty());
        assert_eq!(row_bands(3, 0).len(), 3);
    }

    #[test]
    fn test_row_rng_streams_are_independent_of_order() {
        let mut a = row_rng(11, 5);
        let _ = row_rng(11, 4).next_u64();
        let mut b = row_rng(11, 5);
        assert_eq!(a.next_u64(), b.next_u64());

        let mut c = row_rng(11, 6);
        assert_ne!(row_rng(11, 5).next_u64(), c.next_u64());
    }
}
