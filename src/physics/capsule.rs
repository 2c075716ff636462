use crate::math::Vec3;
use crate::mesh::Triangle;

/// Result of testing a sphere against a single triangle.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub penetration: f32,
    pub push_out: Vec3,
    pub normal: Vec3,
}

/// Sphere-vs-triangle penetration test. `push_out` points from the
/// triangle surface toward the sphere center, scaled by the penetration
/// depth, so callers can sum contacts and move the sphere out in one shot.
pub fn sphere_triangle(center: Vec3, radius: f32, tri: &Triangle) -> Option<Contact> {
    let closest = tri.closest_point(center);
    let delta = center - closest;
    let dist = delta.length();
    if dist >= radius {
        return None;
    }
    let penetration = radius - dist;
    let direction = if dist > 1e-6 { delta / dist } else { tri.normal };
    Some(Contact {
        penetration,
        push_out: direction * penetration,
        normal: direction,
    })
}

/// Samples the capsule segment `[bottom, top]` at `SAMPLES` evenly spaced
/// points and keeps whichever sample penetrates the triangle the most.
pub const CAPSULE_SAMPLES: usize = 5;

pub fn capsule_triangle(bottom: Vec3, top: Vec3, radius: f32, tri: &Triangle) -> Option<Contact> {
    let mut deepest: Option<Contact> = None;
    for i in 0..CAPSULE_SAMPLES {
        let t = i as f32 / (CAPSULE_SAMPLES - 1) as f32;
        let sample = bottom.lerp(&top, t);
        if let Some(contact) = sphere_triangle(sample, radius, tri) {
            if deepest.map(|d| contact.penetration > d.penetration).unwrap_or(true) {
                deepest = Some(contact);
            }
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Triangle {
        Triangle::new(
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(5.0, 0.0, -5.0),
            Vec3::new(-5.0, 0.0, 5.0),
        )
        .unwrap()
    }

    #[test]
    fn sphere_above_surface_no_contact() {
        let tri = ground();
        assert!(sphere_triangle(Vec3::new(0.0, 1.0, 0.0), 0.4, &tri).is_none());
    }

    #[test]
    fn sphere_embedded_has_positive_penetration() {
        let tri = ground();
        let contact = sphere_triangle(Vec3::new(0.0, 0.2, 0.0), 0.4, &tri).unwrap();
        assert!(contact.penetration > 0.0);
        assert!(contact.penetration <= 0.4);
    }

    #[test]
    fn capsule_keeps_deepest_sample() {
        let tri = ground();
        let contact = capsule_triangle(
            Vec3::new(0.0, -0.3, 0.0),
            Vec3::new(0.0, 1.5, 0.0),
            0.4,
            &tri,
        )
        .unwrap();
        assert!(contact.penetration > 0.0);
    }
}
