use super::bvh::BvhNode;
use super::triangle::Triangle;
use crate::math::{RayHit, Vec3};

/// An immutable triangle soup plus its BVH, shared by reference across a
/// room's tick loop, the LOS worker pool, and `MeshCollision`.
///
/// Built once per map load; queries never mutate it, which is what lets the
/// LOS worker pool hand each worker its own cheap clone instead of
/// synchronizing access.
#[derive(Clone)]
pub struct CollisionMesh {
    triangles: Vec<Triangle>,
    bvh: std::sync::Arc<Option<BvhNode>>,
}

impl CollisionMesh {
    /// Builds the mesh from raw vertex triples, silently dropping
    /// degenerate triangles (see `Triangle::new`).
    pub fn build(raw_triangles: &[(Vec3, Vec3, Vec3)]) -> Self {
        let triangles: Vec<Triangle> = raw_triangles
            .iter()
            .filter_map(|(a, b, c)| Triangle::new(*a, *b, *c))
            .collect();
        let bvh = BvhNode::build(&triangles);
        Self {
            triangles,
            bvh: std::sync::Arc::new(bvh),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Closest hit along the ray within `[eps, max_dist]`. Returns `None`
    /// for an empty mesh; callers fall back to the world-floor backstop.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
        let bvh = self.bvh.as_ref().as_ref()?;
        let dir = dir.normalized();
        if !dir.is_finite() || dir.length_squared() < 1e-12 {
            return None;
        }
        let inv_dir = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let (t, idx) = bvh.query_ray(&self.triangles, origin, dir, inv_dir, max_dist)?;
        let tri = &self.triangles[idx];
        Some(RayHit {
            distance: t,
            point: origin + dir * t,
            normal: tri.normal,
            triangle_index: idx,
        })
    }

    /// True if nothing blocks a straight line between two points (used both
    /// by the LOS worker pool and directly for small/synchronous batches).
    pub fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let dist = delta.length();
        if dist < 1e-6 {
            return true;
        }
        self.raycast(from, delta, (dist - 0.1).max(0.0)).is_none()
    }

    /// Candidate triangle indices whose AABB overlaps the sphere.
    pub fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<usize> {
        let mut out = Vec::new();
        if let Some(bvh) = self.bvh.as_ref() {
            bvh.query_sphere(center, radius, &mut out);
        }
        out
    }

    pub fn triangle(&self, index: usize) -> &Triangle {
        &self.triangles[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> CollisionMesh {
        CollisionMesh::build(&[
            (
                Vec3::new(-10.0, 0.0, -10.0),
                Vec3::new(10.0, 0.0, -10.0),
                Vec3::new(-10.0, 0.0, 10.0),
            ),
            (
                Vec3::new(10.0, 0.0, -10.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(-10.0, 0.0, 10.0),
            ),
        ])
    }

    #[test]
    fn empty_mesh_has_no_hits() {
        let mesh = CollisionMesh::build(&[]);
        assert!(mesh.is_empty());
        assert!(mesh
            .raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 100.0)
            .is_none());
        assert!(mesh.has_line_of_sight(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn raycast_hits_floor() {
        let mesh = floor();
        let hit = mesh.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 100.0);
        assert!(hit.is_some());
        assert!((hit.unwrap().distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn line_of_sight_blocked_by_wall() {
        let mesh = CollisionMesh::build(&[
            (
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ),
            (
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ),
        ]);
        assert!(!mesh.has_line_of_sight(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0)));
        assert!(mesh.has_line_of_sight(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -2.0)));
    }
}
