//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to children and primitive ranges by
//! index. Leaves hold at most [`LEAF_MAX_SIZE`] primitives unless the depth
//! limit is reached first. The tree borrows the scene's primitive lists and
//! is rebuilt for every render.

use lumen_core::{Sphere, Triangle};
use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitPoint, Hittable};
use crate::intersect::{ClosestHit, PrimRef};

/// Maximum primitives per leaf node before splitting.
pub const LEAF_MAX_SIZE: usize = 4;

/// Nodes deeper than this become leaves regardless of size.
pub const MAX_DEPTH: usize = 16;

/// Relative margin on the best distance when culling nodes. Slab entry
/// distances and primitive distances round differently, and a hit lying on
/// a box face must not be culled by its own box.
const CULL_SLACK: f32 = 1e-4;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Clone, Copy, Debug)]
enum BvhNode {
    /// Internal node with two children.
    Branch { bbox: Aabb, left: u32, right: u32 },
    /// Leaf node referencing `prims[start..start + count]`.
    Leaf { bbox: Aabb, start: u32, count: u32 },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// BVH over a scene's triangles and spheres.
pub struct Bvh<'s> {
    spheres: &'s [Sphere],
    triangles: &'s [Triangle],
    prims: Vec<PrimRef>,
    nodes: Vec<BvhNode>,
    depth: usize,
}

impl<'s> Bvh<'s> {
    /// Build a BVH. Returns `None` when there is nothing to enclose.
    pub fn build(triangles: &'s [Triangle], spheres: &'s [Sphere]) -> Option<Self> {
        if triangles.is_empty() && spheres.is_empty() {
            return None;
        }

        let prims = (0..triangles.len() as u32)
            .map(PrimRef::Triangle)
            .chain((0..spheres.len() as u32).map(PrimRef::Sphere))
            .collect::<Vec<_>>();

        let mut bvh = Self {
            spheres,
            triangles,
            nodes: Vec::with_capacity(2 * prims.len() / LEAF_MAX_SIZE + 1),
            prims,
            depth: 0,
        };
        let count = bvh.prims.len();
        bvh.build_node(0, count, 0);

        log::debug!(
            "Built BVH: {} primitives, {} nodes, depth {}",
            count,
            bvh.nodes.len(),
            bvh.depth
        );
        Some(bvh)
    }

    fn prim_bbox(&self, prim: PrimRef) -> Aabb {
        match prim {
            PrimRef::Sphere(i) => self.spheres[i as usize].bounding_box(),
            PrimRef::Triangle(i) => self.triangles[i as usize].bounding_box(),
        }
    }

    fn prim_centroid(&self, prim: PrimRef) -> Vec3 {
        match prim {
            PrimRef::Sphere(i) => self.spheres[i as usize].centroid(),
            PrimRef::Triangle(i) => self.triangles[i as usize].centroid(),
        }
    }

    /// Recursive construction over `prims[start..end]`, returning the new
    /// node's index.
    ///
    /// Splits the longest axis of the node box at its midpoint. When every
    /// centroid lands on one side, each primitive list is halved instead.
    fn build_node(&mut self, start: usize, end: usize, depth: usize) -> u32 {
        self.depth = self.depth.max(depth);

        let bbox = self.prims[start..end]
            .iter()
            .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &self.prim_bbox(*p)));

        let count = end - start;
        let index = self.nodes.len() as u32;
        self.nodes.push(BvhNode::Leaf {
            bbox,
            start: start as u32,
            count: count as u32,
        });

        if count <= LEAF_MAX_SIZE || depth > MAX_DEPTH {
            return index;
        }

        let axis = bbox.longest_axis();
        let slab = bbox.axis_interval(axis);
        let mid = (slab.min + slab.max) * 0.5;

        let (left, right): (Vec<PrimRef>, Vec<PrimRef>) = self.prims[start..end]
            .iter()
            .partition(|p| self.prim_centroid(**p)[axis] < mid);

        let split = if left.is_empty() || right.is_empty() {
            self.halve_each_list(start, end)
        } else {
            let split = start + left.len();
            self.prims[start..split].copy_from_slice(&left);
            self.prims[split..end].copy_from_slice(&right);
            split
        };

        let left = self.build_node(start, split, depth + 1);
        let right = self.build_node(split, end, depth + 1);
        self.nodes[index as usize] = BvhNode::Branch { bbox, left, right };
        index
    }

    /// Fallback split when every centroid lands on one side: the first half
    /// of the range's triangles and the first half of its spheres go left.
    fn halve_each_list(&mut self, start: usize, end: usize) -> usize {
        let range = &mut self.prims[start..end];
        range.sort_unstable();
        let triangles = range
            .iter()
            .take_while(|p| matches!(p, PrimRef::Triangle(_)))
            .count();
        let (tri_left, sphere_left) = (triangles / 2, (range.len() - triangles) / 2);

        // [tri left, tri right, sphere left, sphere right]
        //   -> [tri left, sphere left, tri right, sphere right]
        range[tri_left..triangles + sphere_left].rotate_right(sphere_left);
        start + tri_left + sphere_left
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn primitive_count(&self) -> usize {
        self.prims.len()
    }

    /// Depth of the deepest node; the root is depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn hit_prim(&self, prim: PrimRef, ray: &Ray, ray_t: Interval) -> Option<HitPoint<'s>> {
        let (spheres, triangles): (&'s [Sphere], &'s [Triangle]) = (self.spheres, self.triangles);
        match prim {
            PrimRef::Sphere(i) => spheres[i as usize].hit(ray, ray_t),
            PrimRef::Triangle(i) => triangles[i as usize].hit(ray, ray_t),
        }
    }

    /// Depth-first search that feeds every primitive hit into `closest`.
    ///
    /// Primitives are tested against the full `ray_t` so equal-distance
    /// ties are resolved by [`ClosestHit`], exactly as in the brute-force
    /// list. Only the node culling uses the current best distance.
    fn hit_node(&self, index: u32, ray: &Ray, ray_t: Interval, closest: &mut ClosestHit<'s>) {
        let node = &self.nodes[index as usize];
        let cull_t = closest.distance().map_or(ray_t, |t| ray_t.with_max(t + CULL_SLACK * t.max(1.0)));
        if !node.bbox().hit(ray, cull_t) {
            return;
        }

        match *node {
            BvhNode::Leaf { start, count, .. } => {
                for prim in &self.prims[start as usize..(start + count) as usize] {
                    if let Some(hit) = self.hit_prim(*prim, ray, ray_t) {
                        closest.offer(hit, *prim);
                    }
                }
            }
            BvhNode::Branch { left, right, .. } => {
                self.hit_node(left, ray, ray_t, closest);
                self.hit_node(right, ray, ray_t, closest);
            }
        }
    }
}

impl Hittable for Bvh<'_> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitPoint<'a>> {
        let mut closest = ClosestHit::default();
        self.hit_node(0, ray, ray_t, &mut closest);
        closest.into_hit()
    }

    fn bounding_box(&self) -> Aabb {
        *self.nodes[0].bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HitObject;
    use crate::intersect::PrimitiveList;
    use lumen_core::Material;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn grey() -> Arc<Material> {
        Material::diffuse(Vec3::splat(0.5)).shared()
    }

    fn random_scene(seed: u64) -> (Vec<Triangle>, Vec<Sphere>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let point = |rng: &mut StdRng| {
            Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            )
        };

        let spheres = (0..40)
            .map(|_| {
                let c = point(&mut rng);
                Sphere::new(c, rng.gen_range(0.2..1.5), grey())
            })
            .collect();
        let triangles = (0..60)
            .map(|_| {
                let a = point(&mut rng);
                let b = a + point(&mut rng) * 0.2;
                let c = a + point(&mut rng) * 0.2;
                Triangle::new(a, b, c, grey())
            })
            .collect();
        (triangles, spheres)
    }

    fn same_object(a: &HitPoint, b: &HitPoint) -> bool {
        match (a.object, b.object) {
            (HitObject::Sphere(x), HitObject::Sphere(y)) => std::ptr::eq(x, y),
            (HitObject::Triangle(x), HitObject::Triangle(y)) => std::ptr::eq(x, y),
            _ => false,
        }
    }

    fn check_containment(bvh: &Bvh, index: u32) {
        let node = bvh.nodes[index as usize];
        match node {
            BvhNode::Leaf { bbox, start, count } => {
                assert!(count > 0);
                for prim in &bvh.prims[start as usize..(start + count) as usize] {
                    assert!(bbox.contains(&bvh.prim_bbox(*prim)));
                }
            }
            BvhNode::Branch { bbox, left, right } => {
                assert!(bbox.contains(bvh.nodes[left as usize].bbox()));
                assert!(bbox.contains(bvh.nodes[right as usize].bbox()));
                check_containment(bvh, left);
                check_containment(bvh, right);
            }
        }
    }

    #[test]
    fn test_bvh_empty() {
        assert!(Bvh::build(&[], &[]).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let spheres = vec![Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey())];
        let bvh = Bvh::build(&[], &spheres).unwrap();

        // Should create a leaf
        assert_eq!(bvh.node_count(), 1);
        assert!(matches!(bvh.nodes[0], BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.hit(&ray, Interval::from_min(0.0)).unwrap();
        assert!((hit.distance - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<_> = (0..10)
            .map(|i| Sphere::new(Vec3::new(i as f32, 0.0, -5.0), 0.5, grey()))
            .collect();
        let bvh = Bvh::build(&[], &spheres).unwrap();
        assert!(bvh.node_count() > 1);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.hit(&ray, Interval::from_min(0.0)).unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((hit.point.z - (-4.5)).abs() < 0.01);
        assert!((hit.point.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_containment_invariant() {
        let (triangles, spheres) = random_scene(7);
        let bvh = Bvh::build(&triangles, &spheres).unwrap();
        assert_eq!(bvh.primitive_count(), 100);
        assert!(bvh.depth() <= MAX_DEPTH + 1);
        check_containment(&bvh, 0);

        let mut seen = bvh.prims.clone();
        seen.sort_by_key(|p| match p {
            PrimRef::Triangle(i) => *i as u64,
            PrimRef::Sphere(i) => 1_000 + *i as u64,
        });
        seen.dedup();
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_coincident_centroids_fall_back_to_index_split() {
        let spheres: Vec<_> = (0..9)
            .map(|i| Sphere::new(Vec3::ZERO, 1.0 + i as f32, grey()))
            .collect();
        let bvh = Bvh::build(&[], &spheres).unwrap();
        assert!(bvh.node_count() > 1);
        check_containment(&bvh, 0);
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let (triangles, spheres) = random_scene(42);
        let bvh = Bvh::build(&triangles, &spheres).unwrap();
        let list = PrimitiveList::new(&triangles, &spheres);

        let mut rng = StdRng::seed_from_u64(99);
        let mut hits = 0;
        for _ in 0..500 {
            let origin = Vec3::new(
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
                rng.gen_range(-15.0..15.0),
            );
            let target = Vec3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
            );
            let ray = Ray::new(origin, target - origin);

            let expected = list.hit(&ray, Interval::from_min(0.0));
            let actual = bvh.hit(&ray, Interval::from_min(0.0));
            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => {
                    hits += 1;
                    assert_eq!(e.distance, a.distance);
                    assert_eq!(e.point, a.point);
                    assert_eq!(e.normal, a.normal);
                    assert!(same_object(&e, &a));
                    assert!(std::ptr::eq(e.material(), a.material()));
                }
                (e, a) => panic!("mismatch: brute={:?} bvh={:?}", e.map(|h| h.distance), a.map(|h| h.distance)),
            }
        }
        assert!(hits > 50);
    }

    #[test]
    fn test_degenerate_split_halves_each_list() {
        // Every centroid is the origin, so the midpoint split puts everything
        // on one side.
        let triangles: Vec<_> = (0..4)
            .map(|i| {
                let s = 1.0 + i as f32;
                Triangle::new(
                    Vec3::new(-s, -s, 0.0),
                    Vec3::new(s, -s, 0.0),
                    Vec3::new(0.0, 2.0 * s, 0.0),
                    grey(),
                )
            })
            .collect();
        let spheres: Vec<_> = (0..4)
            .map(|i| Sphere::new(Vec3::ZERO, 1.0 + i as f32, grey()))
            .collect();
        let bvh = Bvh::build(&triangles, &spheres).unwrap();

        let BvhNode::Branch { left, right, .. } = bvh.nodes[0] else {
            panic!("root should split");
        };
        let leaf_prims = |index: u32| match bvh.nodes[index as usize] {
            BvhNode::Leaf { start, count, .. } => bvh.prims[start as usize..(start + count) as usize].to_vec(),
            BvhNode::Branch { .. } => panic!("children of 8 primitives should be leaves"),
        };
        assert_eq!(
            leaf_prims(left),
            vec![PrimRef::Triangle(0), PrimRef::Triangle(1), PrimRef::Sphere(0), PrimRef::Sphere(1)]
        );
        assert_eq!(
            leaf_prims(right),
            vec![PrimRef::Triangle(2), PrimRef::Triangle(3), PrimRef::Sphere(2), PrimRef::Sphere(3)]
        );
        check_containment(&bvh, 0);
    }

    #[test]
    fn test_equal_distances_pick_same_primitive_as_brute_force() {
        // Coincident spheres with distinct materials, spread over several leaves
        let spheres: Vec<_> = (0..13)
            .map(|i| Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, Material::diffuse(Vec3::splat(i as f32)).shared()))
            .collect();
        let bvh = Bvh::build(&[], &spheres).unwrap();
        assert!(bvh.node_count() > 1);
        let list = PrimitiveList::new(&[], &spheres);

        let ray = Ray::new(Vec3::new(0.2, 0.1, 0.0), Vec3::Z);
        let expected = list.hit(&ray, Interval::from_min(0.0)).unwrap();
        let actual = bvh.hit(&ray, Interval::from_min(0.0)).unwrap();
        assert!(same_object(&expected, &actual));
        assert_eq!(actual.material().diffuse, Vec3::ZERO);
    }
}
