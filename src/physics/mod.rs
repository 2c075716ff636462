mod capsule;
mod mesh_collision;

pub use capsule::{capsule_triangle, sphere_triangle, Contact};
pub use mesh_collision::{
    move_with_mesh_collision, resolve_wall_collisions, MotionState, MAX_FALL_SPEED,
    PLAYER_HEIGHT, PLAYER_RADIUS, SLOPE_LIMIT_COS, STEP_HEIGHT,
};
