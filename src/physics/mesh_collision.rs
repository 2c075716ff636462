use super::capsule::{capsule_triangle, Contact};
use crate::math::Vec3;
use crate::mesh::CollisionMesh;

pub const STEP_HEIGHT: f32 = 0.5;
pub const SLOPE_LIMIT_COS: f32 = 0.6;
pub const PLAYER_RADIUS: f32 = 0.4;
pub const PLAYER_HEIGHT: f32 = 1.8;
pub const MIN_PENETRATION: f32 = 0.02;
pub const MAX_SUBSTEPS: usize = 3;
pub const MAX_DEPENETRATION_ITERS: usize = 6;
pub const MAX_FALL_SPEED: f32 = -20.0;
const WORLD_FLOOR: f32 = 0.0;

/// Per-entity motion bookkeeping that has to survive across ticks: whether
/// the entity ended the last tick grounded, and the last ground height it
/// rested on (used to catch tunneling through thin floors).
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionState {
    pub on_ground: bool,
    pub prev_ground_y: Option<f32>,
}

fn is_wall(contact: &Contact) -> bool {
    contact.normal.y.abs() < SLOPE_LIMIT_COS
}

/// Sums wall push-out (xz only) over every triangle whose broadphase AABB
/// overlaps the capsule band `[bottom, top]`.
fn band_contacts(mesh: &CollisionMesh, bottom: Vec3, top: Vec3) -> (bool, Vec3) {
    let center = bottom.lerp(&top, 0.5);
    let reach = PLAYER_RADIUS + bottom.distance(&top) * 0.5 + 0.01;
    let mut push_sum = Vec3::ZERO;
    let mut contacts = 0;
    for idx in mesh.query_sphere(center, reach) {
        let tri = mesh.triangle(idx);
        if let Some(contact) = capsule_triangle(bottom, top, PLAYER_RADIUS, tri) {
            if is_wall(&contact) && contact.penetration > MIN_PENETRATION {
                push_sum += contact.push_out.xz();
                contacts += 1;
            }
        }
    }
    (contacts > 0, push_sum)
}

fn wall_band(feet: Vec3) -> (Vec3, Vec3) {
    (
        feet + Vec3::new(0.0, STEP_HEIGHT + 0.1, 0.0),
        feet + Vec3::new(0.0, PLAYER_HEIGHT - 0.6, 0.0),
    )
}

fn feet_band(feet: Vec3) -> (Vec3, Vec3) {
    (feet, feet + Vec3::new(0.0, STEP_HEIGHT, 0.0))
}

/// Pushes `pos` out of any wall-ish triangle overlapping the player's torso
/// band, up to `MAX_DEPENETRATION_ITERS` times, stopping early once a pass
/// finds zero contacts.
pub fn resolve_wall_collisions(mesh: &CollisionMesh, mut pos: Vec3) -> Vec3 {
    for _ in 0..MAX_DEPENETRATION_ITERS {
        let (bottom, top) = wall_band(pos);
        let (blocked, push) = band_contacts(mesh, bottom, top);
        if !blocked {
            break;
        }
        pos += push * 1.02;
    }
    pos
}

/// Raycasts straight down from `origin` up to `max_dist`, returning the
/// ground height if the hit is walkable (`|normal.y| >= SLOPE_LIMIT_COS`).
fn find_ground_below(mesh: &CollisionMesh, origin: Vec3, max_dist: f32) -> Option<f32> {
    let hit = mesh.raycast(origin, Vec3::new(0.0, -1.0, 0.0), max_dist)?;
    if hit.normal.y.abs() >= SLOPE_LIMIT_COS {
        Some(hit.point.y)
    } else {
        None
    }
}

fn try_step_up(mesh: &CollisionMesh, trial: Vec3) -> Option<Vec3> {
    let raised = trial.with_y(trial.y + STEP_HEIGHT);
    let (feet_b, feet_t) = feet_band(raised);
    let (wall_b, wall_t) = wall_band(raised);
    if band_contacts(mesh, feet_b, feet_t).0 || band_contacts(mesh, wall_b, wall_t).0 {
        return None;
    }
    let probe = raised + Vec3::new(0.0, 2.0, 0.0);
    let ground_y = find_ground_below(mesh, probe, 10.0 + STEP_HEIGHT)?;
    let drop = raised.y - ground_y;
    if (-0.1..=STEP_HEIGHT + 0.3).contains(&drop) {
        Some(trial.with_y(ground_y))
    } else {
        None
    }
}

/// Advances `pos` by `vel * dt` against the mesh: depenetrate, sub-step
/// horizontal motion with stair-stepping and sliding, integrate gravity,
/// snap to ground, and clip against ceilings. Mutates `vel` in place
/// (slide zeroes the blocked component; ground snap clamps `vel.y`).
pub fn move_with_mesh_collision(
    mesh: &CollisionMesh,
    pos: Vec3,
    vel: &mut Vec3,
    dt: f32,
    state: &mut MotionState,
) -> Vec3 {
    if mesh.is_empty() {
        return free_fall(pos, vel, dt, state);
    }

    let mut pos = resolve_wall_collisions(mesh, pos);

    let horizontal = vel.xz() * dt;
    let move_len = horizontal.length();
    let n_steps = ((move_len / (0.4 * PLAYER_RADIUS)).ceil() as usize).clamp(1, MAX_SUBSTEPS);
    let step_delta = if n_steps > 0 { horizontal / n_steps as f32 } else { Vec3::ZERO };

    for _ in 0..n_steps {
        let trial = pos + step_delta;
        let (feet_b, feet_t) = feet_band(trial);
        let (wall_b, wall_t) = wall_band(trial);
        let feet_blocked = band_contacts(mesh, feet_b, feet_t).0;
        let (mid_blocked, mid_push) = band_contacts(mesh, wall_b, wall_t);

        if feet_blocked && !mid_blocked {
            if let Some(stepped) = try_step_up(mesh, trial) {
                pos = stepped;
                vel.y = vel.y.max(0.0);
                continue;
            }
        }

        if feet_blocked || mid_blocked {
            let (_, feet_push) = band_contacts(mesh, feet_b, feet_t);
            let push = (feet_push + mid_push) * 1.02;
            pos = trial + push;
            if push.length_squared() > 1e-9 {
                let n = push.normalized();
                let vn = vel.xz().dot(&n);
                if vn < 0.0 {
                    *vel -= n * vn;
                }
            }
        } else {
            pos = trial;
        }
    }

    vel.y = vel.y.max(MAX_FALL_SPEED);
    pos.y += vel.y * dt;

    ground_snap(mesh, &mut pos, vel, state);
    clip_ceiling(mesh, &mut pos, vel);
    catch_tunneling(&mut pos, vel, state);

    pos
}

fn free_fall(pos: Vec3, vel: &mut Vec3, dt: f32, state: &mut MotionState) -> Vec3 {
    vel.y = vel.y.max(MAX_FALL_SPEED);
    let mut next = pos + *vel * dt;
    if next.y <= WORLD_FLOOR {
        next.y = WORLD_FLOOR;
        vel.y = vel.y.max(0.0);
        state.on_ground = true;
    } else {
        state.on_ground = false;
    }
    state.prev_ground_y = Some(WORLD_FLOOR);
    next
}

fn ground_snap(mesh: &CollisionMesh, pos: &mut Vec3, vel: &mut Vec3, state: &mut MotionState) {
    let probe = *pos + Vec3::new(0.0, 2.0, 0.0);
    match find_ground_below(mesh, probe, 10.0) {
        Some(ground_y) => {
            let drop = pos.y - ground_y;
            if vel.y <= 2.0 && drop <= STEP_HEIGHT && drop >= -1.0 {
                pos.y = ground_y;
                vel.y = vel.y.max(0.0);
                state.on_ground = true;
            } else if pos.y < ground_y {
                pos.y = ground_y;
                state.on_ground = true;
            } else {
                state.on_ground = drop <= 0.1;
            }
            state.prev_ground_y = Some(ground_y);
        }
        None => {
            if pos.y <= WORLD_FLOOR {
                pos.y = WORLD_FLOOR;
                vel.y = vel.y.max(0.0);
                state.on_ground = true;
                state.prev_ground_y = Some(WORLD_FLOOR);
            } else {
                state.on_ground = false;
            }
        }
    }
}

fn clip_ceiling(mesh: &CollisionMesh, pos: &mut Vec3, vel: &mut Vec3) {
    if vel.y <= 0.0 {
        return;
    }
    let head = *pos + Vec3::new(0.0, PLAYER_HEIGHT, 0.0);
    if let Some(hit) = mesh.raycast(head, Vec3::UP, 0.2) {
        vel.y = 0.0;
        pos.y = hit.point.y - PLAYER_HEIGHT;
    }
}

/// Never snap down while actively jumping hard (`vel.y > 2`); otherwise if
/// the entity ended up more than a step below where it was last resting,
/// treat it as a tunneling artifact and pull it back up.
fn catch_tunneling(pos: &mut Vec3, vel: &mut Vec3, state: &mut MotionState) {
    if vel.y > 2.0 || state.on_ground {
        return;
    }
    if let Some(prev_ground) = state.prev_ground_y {
        if pos.y < prev_ground - STEP_HEIGHT {
            pos.y = prev_ground;
            vel.y = vel.y.max(0.0);
            state.on_ground = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_floor() -> CollisionMesh {
        CollisionMesh::build(&[
            (
                Vec3::new(-50.0, 0.0, -50.0),
                Vec3::new(50.0, 0.0, -50.0),
                Vec3::new(-50.0, 0.0, 50.0),
            ),
            (
                Vec3::new(50.0, 0.0, -50.0),
                Vec3::new(50.0, 0.0, 50.0),
                Vec3::new(-50.0, 0.0, 50.0),
            ),
        ])
    }

    #[test]
    fn empty_mesh_free_motion_clamps_at_world_floor() {
        let mesh = CollisionMesh::build(&[]);
        let mut vel = Vec3::new(0.0, -30.0, 0.0);
        let mut state = MotionState::default();
        let pos = move_with_mesh_collision(&mesh, Vec3::new(0.0, 1.0, 0.0), &mut vel, 1.0, &mut state);
        assert_eq!(pos.y, 0.0);
        assert!(state.on_ground);
        assert!(vel.y >= 0.0);
    }

    #[test]
    fn resting_on_flat_floor_snaps_to_zero() {
        let mesh = flat_floor();
        let mut vel = Vec3::new(0.0, -1.0, 0.0);
        let mut state = MotionState::default();
        let pos = move_with_mesh_collision(&mesh, Vec3::new(0.0, 0.05, 0.0), &mut vel, 0.016, &mut state);
        assert!((pos.y - 0.0).abs() < 1e-4);
        assert!(state.on_ground);
    }

    #[test]
    fn step_height_four_tenths_is_climbed() {
        // A step 0.4m tall, within STEP_HEIGHT, should be climbable.
        let step_tris = [
            (
                Vec3::new(-5.0, 0.0, -5.0),
                Vec3::new(1.0, 0.0, -5.0),
                Vec3::new(-5.0, 0.0, 5.0),
            ),
            (
                Vec3::new(1.0, 0.0, -5.0),
                Vec3::new(1.0, 0.0, 5.0),
                Vec3::new(-5.0, 0.0, 5.0),
            ),
            (
                Vec3::new(1.0, 0.4, -5.0),
                Vec3::new(5.0, 0.4, -5.0),
                Vec3::new(1.0, 0.4, 5.0),
            ),
            (
                Vec3::new(5.0, 0.4, -5.0),
                Vec3::new(5.0, 0.4, 5.0),
                Vec3::new(1.0, 0.4, 5.0),
            ),
            // riser wall connecting the two levels
            (
                Vec3::new(1.0, 0.0, -5.0),
                Vec3::new(1.0, 0.4, -5.0),
                Vec3::new(1.0, 0.0, 5.0),
            ),
            (
                Vec3::new(1.0, 0.4, -5.0),
                Vec3::new(1.0, 0.4, 5.0),
                Vec3::new(1.0, 0.0, 5.0),
            ),
        ];
        let mesh = CollisionMesh::build(&step_tris);
        let mut pos = Vec3::new(0.0, 0.0, 0.0);
        let mut vel = Vec3::new(6.0, 0.0, 0.0);
        let mut state = MotionState::default();
        for _ in 0..30 {
            pos = move_with_mesh_collision(&mesh, pos, &mut vel, 1.0 / 60.0, &mut state);
        }
        assert!(pos.x > 0.5, "expected to advance past the step, x={}", pos.x);
    }

    #[test]
    fn ceiling_blocks_upward_velocity() {
        let tris = [
            (
                Vec3::new(-5.0, 2.0, -5.0),
                Vec3::new(5.0, 2.0, -5.0),
                Vec3::new(-5.0, 2.0, 5.0),
            ),
            (
                Vec3::new(5.0, 2.0, -5.0),
                Vec3::new(5.0, 2.0, 5.0),
                Vec3::new(-5.0, 2.0, 5.0),
            ),
        ];
        let mesh = CollisionMesh::build(&tris);
        let mut vel = Vec3::new(0.0, 10.0, 0.0);
        let mut state = MotionState::default();
        let pos = move_with_mesh_collision(&mesh, Vec3::new(0.0, 0.1, 0.0), &mut vel, 1.0, &mut state);
        assert!(pos.y + PLAYER_HEIGHT <= 2.0 + 1e-3);
        assert_eq!(vel.y, 0.0);
    }
}
