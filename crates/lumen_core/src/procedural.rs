//! Procedural texture functions.
//!
//! Each is a pure `uv -> linear color` function that can be wrapped with
//! [`TextureSource::procedural`](crate::texture::TextureSource::procedural).
//! They are ports of small fragment shaders, so helpers follow GLSL
//! semantics (`fract`, `step`, floor-based `mod`).

use std::f32::consts::PI;

use lumen_math::{Color, Vec2};

#[inline]
fn fract(v: Vec2) -> Vec2 {
    v - v.floor()
}

#[inline]
fn glsl_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Blue, purple and gold marble swirl, clamped to `[0, 1]`.
pub fn marble(uv: Vec2) -> Color {
    let scale = 8.0;
    let swirl = (scale * uv.x + (scale * uv.y * 2.0).sin()).sin();
    let bands = (scale * uv.y + swirl * 2.0).sin();

    let blue = Color::new(0.2, 0.3, 0.8);
    let purple = Color::new(0.7, 0.2, 0.6);
    let gold = Color::new(0.9, 0.8, 0.2);

    let base = blue.lerp(purple, 0.5 + 0.5 * bands);
    let color = base.lerp(gold, swirl.abs());

    let grain = (50.0 * (uv.x + uv.y)).sin() * 0.05;
    (color + Color::splat(grain)).clamp(Color::ZERO, Color::ONE)
}

/// Rainbow bands warped by a sine, on UVs rotated by 180 degrees.
pub fn rainbow_swirl(uv: Vec2) -> Color {
    let uv = fract(Vec2::ONE - uv);
    let f = ((uv.x * 10.0 + (uv.y * 5.0).sin() * 5.0).sin()) * 5.0;
    Color::new(f.sin(), (f + 2.0).sin(), (f + 10.0).sin()) * 0.5 + Color::splat(0.5)
}

/// Two-color checkerboard with `cells` squares along each axis.
pub fn checker(uv: Vec2, cells: f32, even: Color, odd: Color) -> Color {
    let cell = (uv * cells).floor();
    if glsl_mod(cell.x + cell.y, 2.0) < 1.0 {
        even
    } else {
        odd
    }
}

fn rotate_about_center(st: Vec2, angle: f32) -> Vec2 {
    let half = Vec2::splat(0.5);
    Vec2::from_angle(angle).rotate(st - half) + half
}

fn rotate_tile(st: Vec2) -> Vec2 {
    let st = st * 2.0;
    let index = step(1.0, glsl_mod(st.x, 2.0)) + step(1.0, glsl_mod(st.y, 2.0)) * 2.0;
    let st = fract(st);

    match index as u32 {
        1 => rotate_about_center(st, PI * 0.5),
        2 => rotate_about_center(st, -PI * 0.5),
        3 => rotate_about_center(st, PI),
        _ => st,
    }
}

/// Black and white truchet-style triangles.
///
/// `uv` is divided by `resolution` first, then tiled 3x3 with each 2x2
/// block of cells rotated in quarter turns.
pub fn tile_pattern(uv: Vec2, resolution: Vec2) -> Color {
    let st = fract(uv / resolution * 3.0);
    let st = rotate_tile(st);
    Color::splat(step(st.x, st.y))
}

fn random2(p: Vec2) -> Vec2 {
    let x = p.dot(Vec2::new(127.1, 311.7));
    let y = p.dot(Vec2::new(269.5, 183.3));
    fract(Vec2::new(x.sin(), y.sin()) * 43758.545)
}

/// Distance from `p` to the nearest feature point of a jittered grid.
///
/// Each unit cell holds one feature point; only the 3x3 neighbourhood is
/// searched.
pub fn cellular(p: Vec2) -> f32 {
    let cell = p.floor();
    let local = fract(p);
    let mut min_dist = 10.0f32;

    for j in -1..=1 {
        for i in -1..=1 {
            let neighbor = Vec2::new(i as f32, j as f32);
            let point = random2(cell + neighbor);
            let point = 0.5 * Vec2::new((6.2831 * point.x).sin(), (6.2831 * point.y).sin());
            min_dist = min_dist.min((neighbor + point - local).length());
        }
    }

    min_dist
}

/// Cellular noise at 10x frequency mapped to a cosine palette.
pub fn cellular_palette(uv: Vec2) -> Color {
    let v = cellular(uv * 10.0);
    Color::new((3.0 * v).sin(), (3.0 * v + 2.0).sin(), (3.0 * v + 4.0).sin()) * 0.5
        + Color::splat(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_unit_range(c: Color) -> bool {
        c.cmpge(Color::ZERO).all() && c.cmple(Color::ONE).all()
    }

    #[test]
    fn test_marble_is_clamped() {
        for i in 0..32 {
            for j in 0..32 {
                let uv = Vec2::new(i as f32 / 31.0, j as f32 / 31.0);
                assert!(in_unit_range(marble(uv)));
            }
        }
    }

    #[test]
    fn test_rainbow_swirl_range() {
        for i in 0..16 {
            let uv = Vec2::new(i as f32 * 0.37, -(i as f32) * 0.21);
            assert!(in_unit_range(rainbow_swirl(uv)));
        }
    }

    #[test]
    fn test_checker_alternates() {
        let (a, b) = (Color::ZERO, Color::ONE);
        assert_eq!(checker(Vec2::new(0.05, 0.05), 10.0, a, b), a);
        assert_eq!(checker(Vec2::new(0.15, 0.05), 10.0, a, b), b);
        assert_eq!(checker(Vec2::new(0.15, 0.15), 10.0, a, b), a);
        // Negative coordinates continue the pattern
        assert_eq!(checker(Vec2::new(-0.05, 0.05), 10.0, a, b), b);
    }

    #[test]
    fn test_tile_pattern_is_binary() {
        for i in 0..20 {
            for j in 0..20 {
                let uv = Vec2::new(i as f32 * 0.03, j as f32 * 0.03);
                let c = tile_pattern(uv, Vec2::splat(0.6));
                assert!(c == Color::ZERO || c == Color::ONE);
                assert_eq!(c.x, c.y);
            }
        }
    }

    #[test]
    fn test_cellular_distance_bounds() {
        for i in 0..50 {
            let p = Vec2::new(i as f32 * 0.173, i as f32 * -0.291);
            let d = cellular(p);
            assert!(d >= 0.0);
            assert!(d < 2.2);
        }
        assert!(in_unit_range(cellular_palette(Vec2::new(0.3, 0.7))));
    }

    #[test]
    fn test_functions_are_deterministic() {
        let uv = Vec2::new(0.42, 0.17);
        assert_eq!(cellular_palette(uv), cellular_palette(uv));
        assert_eq!(marble(uv), marble(uv));
    }
}
