use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A 3-component vector used for positions, directions, and velocities.
///
/// Invariant: components are always finite. Constructors and arithmetic
/// never silently launder a NaN/inf into a live entity's position; callers
/// that receive untrusted input (e.g. `Input.yaw`) clamp/validate before
/// building a `Vec3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn dot(&self, other: &Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn normalized(&self) -> Vec3 {
        let len = self.length();
        if len < 1e-8 {
            Vec3::ZERO
        } else {
            *self / len
        }
    }

    pub fn with_y(&self, y: f32) -> Vec3 {
        Vec3::new(self.x, y, self.z)
    }

    /// xz-plane projection, used for horizontal movement and push-out sums.
    pub fn xz(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        (*self - *other).length()
    }

    pub fn distance_squared(&self, other: &Vec3) -> f32 {
        (*self - *other).length_squared()
    }

    pub fn lerp(&self, other: &Vec3, t: f32) -> Vec3 {
        *self + (*other - *self) * t
    }

    /// Angle in radians between two directions, both assumed non-zero.
    pub fn angle_to(&self, other: &Vec3) -> f32 {
        let denom = self.length() * other.length();
        if denom < 1e-8 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    /// Forward/right basis vectors for a horizontal yaw, matching the
    /// convention used throughout input application: yaw=0 looks down +z.
    pub fn from_yaw(yaw: f32) -> (Vec3, Vec3) {
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        (forward, right)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
    }

    #[test]
    fn cross_of_orthonormal_axes() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let z = Vec3::new(0.0, 0.0, 1.0);
        let up = x.cross(&z);
        assert!((up.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn angle_to_parallel_is_zero() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        assert!(a.angle_to(&a).abs() < 1e-6);
    }

    #[test]
    fn angle_to_opposite_is_pi() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        assert!((a.angle_to(&-a) - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn from_yaw_zero_looks_down_z() {
        let (fwd, _right) = Vec3::from_yaw(0.0);
        assert!((fwd.z - 1.0).abs() < 1e-6);
        assert!(fwd.x.abs() < 1e-6);
    }
}
