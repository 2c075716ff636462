use super::vec3::Vec3;

/// Axis-aligned bounding box, used by the BVH and by MapBounds clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Aabb::empty();
        for p in points {
            aabb.grow_point(p);
        }
        aabb
    }

    pub fn grow_point(&mut self, p: &Vec3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Vec3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vec3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.max - self.min;
        if d.x < 0.0 || d.y < 0.0 || d.z < 0.0 {
            return 0.0;
        }
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    pub fn contains_point(&self, p: &Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Closest point on (or inside) this box to an arbitrary point.
    pub fn closest_point(&self, p: &Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// True if a sphere at `center` with `radius` overlaps this box.
    pub fn overlaps_sphere(&self, center: &Vec3, radius: f32) -> bool {
        self.closest_point(center).distance_squared(center) <= radius * radius
    }

    /// Slab test against a ray. Returns Some((tmin, tmax)) if the ray's span
    /// overlaps the box at all, using precomputed `inv_dir` (1/dir per axis,
    /// infinities permitted for axis-aligned rays).
    pub fn ray_intersect(&self, origin: &Vec3, inv_dir: &Vec3, max_dist: f32) -> Option<(f32, f32)> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        for axis in 0..3 {
            let (o, d, lo, hi) = match axis {
                0 => (origin.x, inv_dir.x, self.min.x, self.max.x),
                1 => (origin.y, inv_dir.y, self.min.y, self.max.y),
                _ => (origin.z, inv_dir.z, self.min.z, self.max.z),
            };
            let mut t0 = (lo - o) * d;
            let mut t1 = (hi - o) * d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
        }
        if tmax < 0.0 || tmin > tmax || tmin > max_dist {
            None
        } else {
            Some((tmin, tmax))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_encloses_both() {
        let a = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(2.0, -1.0, 0.5), Vec3::new(3.0, 2.0, 4.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Vec3::new(3.0, 2.0, 4.0));
    }

    #[test]
    fn closest_point_clamps_into_box() {
        let b = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let p = Vec3::new(5.0, -5.0, 0.5);
        let c = b.closest_point(&p);
        assert_eq!(c, Vec3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn ray_intersect_hits_box_ahead() {
        let b = Aabb::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 7.0));
        let origin = Vec3::ZERO;
        let dir = Vec3::new(0.0, 0.0, 1.0);
        let inv = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let hit = b.ray_intersect(&origin, &inv, 100.0);
        assert!(hit.is_some());
        let (tmin, _) = hit.unwrap();
        assert!((tmin - 5.0).abs() < 1e-5);
    }

    #[test]
    fn ray_intersect_misses_box_behind() {
        let b = Aabb::new(Vec3::new(-1.0, -1.0, -7.0), Vec3::new(1.0, 1.0, -5.0));
        let origin = Vec3::ZERO;
        let dir = Vec3::new(0.0, 0.0, 1.0);
        let inv = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        assert!(b.ray_intersect(&origin, &inv, 100.0).is_none());
    }
}
