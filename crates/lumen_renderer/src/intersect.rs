//! Closed-form ray-primitive intersection.
//!
//! Rays are expected to carry unit directions ([`Ray::new`] normalizes).

use lumen_core::{Sphere, Triangle};
use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitObject, HitPoint, Hittable};

/// Roots at or below this distance are treated as self-intersections.
pub const SPHERE_EPSILON: f32 = 1e-4;

/// Determinant and distance threshold for triangle hits.
pub const TRIANGLE_EPSILON: f32 = 1e-8;

/// Distance to the nearest sphere root beyond [`SPHERE_EPSILON`].
///
/// Uses `r² - |oc - (oc·d)d|²` for the discriminant, which stays accurate
/// for rays passing far from large spheres.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    if radius <= 0.0 {
        return None;
    }

    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let q = oc - b * ray.direction;
    let discriminant = radius * radius - q.length_squared();
    if discriminant < 0.0 {
        return None;
    }

    let h = discriminant.sqrt();
    let near = -b - h;
    if near > SPHERE_EPSILON {
        return Some(near);
    }
    let far = -b + h;
    (far > SPHERE_EPSILON).then_some(far)
}

/// Möller-Trumbore intersection with back-face culling.
///
/// Rays travelling along the normal (`d·n >= 0`) never hit, and neither do
/// degenerate triangles.
pub fn ray_triangle(ray: &Ray, triangle: &Triangle) -> Option<f32> {
    let normal = triangle.normal();
    if normal == Vec3::ZERO || ray.direction.dot(normal) >= 0.0 {
        return None;
    }

    let edge1 = triangle.edge_ab();
    let edge2 = triangle.edge_ac();

    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < TRIANGLE_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - triangle.a();
    let u = s.dot(p) * inv_det;
    if u < 0.0 {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    // w = 1 - u - v
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > TRIANGLE_EPSILON).then_some(t)
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitPoint<'a>> {
        let t = ray_sphere(ray, self.center(), self.radius())?;
        if !ray_t.surrounds(t) {
            return None;
        }
        let point = ray.at(t);
        Some(HitPoint {
            distance: t,
            point,
            normal: (point - self.center()).normalize_or_zero(),
            object: HitObject::Sphere(self),
        })
    }

    fn bounding_box(&self) -> Aabb {
        Sphere::bounding_box(self)
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitPoint<'a>> {
        let t = ray_triangle(ray, self)?;
        if !ray_t.surrounds(t) {
            return None;
        }
        Some(HitPoint {
            distance: t,
            point: ray.at(t),
            normal: self.normal(),
            object: HitObject::Triangle(self),
        })
    }

    fn bounding_box(&self) -> Aabb {
        Triangle::bounding_box(self)
    }
}

/// Brute-force closest hit over borrowed primitive lists.
///
/// Used when acceleration is disabled and as the reference the BVH must
/// agree with.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveList<'s> {
    spheres: &'s [Sphere],
    triangles: &'s [Triangle],
}

impl<'s> PrimitiveList<'s> {
    pub fn new(triangles: &'s [Triangle], spheres: &'s [Sphere]) -> Self {
        Self { spheres, triangles }
    }

    pub fn len(&self) -> usize {
        self.spheres.len() + self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index of a primitive in one of the scene lists.
///
/// The derived order (every triangle before every sphere, then by index)
/// breaks ties between hits at exactly the same distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum PrimRef {
    Triangle(u32),
    Sphere(u32),
}

/// Running closest hit over any visiting order.
///
/// A candidate wins if it is nearer, or equally near with a lower
/// [`PrimRef`]. Candidates must be tested against the full search interval,
/// not one narrowed to the current best, or exact ties are lost.
#[derive(Default)]
pub(crate) struct ClosestHit<'a> {
    best: Option<(HitPoint<'a>, PrimRef)>,
}

impl<'a> ClosestHit<'a> {
    pub(crate) fn offer(&mut self, hit: HitPoint<'a>, prim: PrimRef) {
        let better = match &self.best {
            None => true,
            Some((best, best_prim)) => {
                hit.distance < best.distance || (hit.distance == best.distance && prim < *best_prim)
            }
        };
        if better {
            self.best = Some((hit, prim));
        }
    }

    pub(crate) fn distance(&self) -> Option<f32> {
        self.best.as_ref().map(|(hit, _)| hit.distance)
    }

    pub(crate) fn into_hit(self) -> Option<HitPoint<'a>> {
        self.best.map(|(hit, _)| hit)
    }
}

impl Hittable for PrimitiveList<'_> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitPoint<'a>> {
        let mut closest = ClosestHit::default();
        for (i, triangle) in self.triangles.iter().enumerate() {
            if let Some(hit) = triangle.hit(ray, ray_t) {
                closest.offer(hit, PrimRef::Triangle(i as u32));
            }
        }
        for (i, sphere) in self.spheres.iter().enumerate() {
            if let Some(hit) = sphere.hit(ray, ray_t) {
                closest.offer(hit, PrimRef::Sphere(i as u32));
            }
        }
        closest.into_hit()
    }

    fn bounding_box(&self) -> Aabb {
        let spheres = self.spheres.iter().map(Sphere::bounding_box);
        let triangles = self.triangles.iter().map(Triangle::bounding_box);
        spheres.chain(triangles).fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b))
    }
}
