mod aabb;
mod ray;
mod vec3;

pub use aabb::Aabb;
pub use ray::{Ray, RayHit};
pub use vec3::Vec3;
