use crate::math::{Aabb, Vec3};

/// Degenerate triangles (near-zero cross product, or any non-finite vertex)
/// are rejected at mesh construction time rather than carried as a
/// zero-area special case through the BVH and collision code.
const DEGENERATE_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub normal: Vec3,
}

impl Triangle {
    /// Returns `None` for degenerate triangles: zero (or NaN) cross product.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Option<Self> {
        if !v0.is_finite() || !v1.is_finite() || !v2.is_finite() {
            return None;
        }
        let cross = (v1 - v0).cross(&(v2 - v0));
        let len = cross.length();
        if !len.is_finite() || len < DEGENERATE_EPSILON {
            return None;
        }
        let normal = cross / len;
        Some(Self { v0, v1, v2, normal })
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&[self.v0, self.v1, self.v2])
    }

    /// Möller–Trumbore ray-triangle intersection. Two-sided: a negative
    /// determinant (ray hitting the back face) is not rejected, matching
    /// the spec's requirement that backfaces still register hits.
    pub fn intersect_ray(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<f32> {
        const EPS: f32 = 1e-6;
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let pvec = dir.cross(&edge2);
        let det = edge1.dot(&pvec);
        if det.abs() < EPS {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = origin - self.v0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(&edge1);
        let v = dir.dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(&qvec) * inv_det;
        if t > EPS && t <= max_dist {
            Some(t)
        } else {
            None
        }
    }

    /// Ericson's closest-point-on-triangle test (Real-Time Collision
    /// Detection §5.1.5): the seven Voronoi regions of a triangle, covering
    /// vertex, edge, and face cases without branching on winding order.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.v0, self.v1, self.v2);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_triangle() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        assert!(Triangle::new(a, a, a).is_none());
        let collinear = Triangle::new(a, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert!(collinear.is_none());
    }

    #[test]
    fn rejects_nonfinite_vertex() {
        let bad = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(Triangle::new(bad, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn accepted_triangle_has_unit_normal() {
        let tri = flat_triangle();
        assert!((tri.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_hits_triangle_from_above() {
        let tri = flat_triangle();
        let hit = tri.intersect_ray(Vec3::new(0.0, 5.0, -0.2), Vec3::new(0.0, -1.0, 0.0), 100.0);
        assert!(hit.is_some());
        assert!((hit.unwrap() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ray_two_sided_hits_from_below() {
        let tri = flat_triangle();
        let hit = tri.intersect_ray(Vec3::new(0.0, -5.0, -0.2), Vec3::new(0.0, 1.0, 0.0), 100.0);
        assert!(hit.is_some());
    }

    #[test]
    fn closest_point_vertex_region() {
        let tri = flat_triangle();
        let far = Vec3::new(-10.0, 0.0, -10.0);
        let closest = tri.closest_point(far);
        assert!(closest.distance(&tri.v0) < 1e-4);
    }

    #[test]
    fn closest_point_face_region_is_projection() {
        let tri = flat_triangle();
        let above = Vec3::new(0.0, 3.0, -0.5);
        let closest = tri.closest_point(above);
        assert!(closest.y.abs() < 1e-4);
    }
}
