/// A closed range of ray parameters `[min, max]`.
///
/// Intersection routines accept an interval so traversal can shrink the
/// search range to the closest hit found so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Range with no members; `min > max`.
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `[min, +inf)`, the usual search range for a fresh ray.
    pub fn from_min(min: f32) -> Self {
        Self::new(min, f32::INFINITY)
    }

    /// Length of the range; negative when empty.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Membership including both endpoints.
    pub fn contains(&self, t: f32) -> bool {
        t >= self.min && t <= self.max
    }

    /// Membership excluding both endpoints. Hits exactly at a bound are
    /// rejected.
    pub fn surrounds(&self, t: f32) -> bool {
        t > self.min && t < self.max
    }

    /// Same interval with its upper bound lowered to `max`.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, self.max.min(max))
    }

    /// Grow by `delta` in total, half on each end.
    pub fn expand(&self, delta: f32) -> Interval {
        let half = 0.5 * delta;
        Interval::new(self.min - half, self.max + half)
    }

    /// Smallest interval covering both inputs.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }
}
