use crate::Vec3;

/// A ray in 3D space.
///
/// The direction is normalized on construction, so the ray parameter `t`
/// is a world-space distance. Degenerate (zero-length) directions stay zero
/// and intersect nothing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.direction(), Vec3::Z);
    }

    #[test]
    fn test_ray_at_is_distance() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 4.0));
        let p = ray.at(5.0);
        assert!((p - Vec3::new(1.0, 3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_direction_stays_zero() {
        let ray = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(ray.direction(), Vec3::ZERO);
        assert_eq!(ray.at(10.0), Vec3::ONE);
    }
}
