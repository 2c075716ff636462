use crate::ai::config::{ai_config, AiConfig, MAX_LOS_DISTANCE, THINK_INTERVAL_MS};
use crate::entities::{Bot, BotState, Team};
use crate::los::LosCache;
use crate::math::Vec3;
use crate::weapons::weapon_def;
use rand::Rng;

/// Everything the brain knows about a candidate target this tick. Built by
/// the room runner from the live player/bot roster before calling
/// [`think`], so the brain itself never touches room internals.
#[derive(Debug, Clone, Copy)]
pub struct VisibleCombatant<'a> {
    pub id: &'a str,
    pub position: Vec3,
    pub team: Team,
    pub is_alive: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BotIntent {
    pub forward: f32,
    pub strafe: f32,
    pub target_yaw: Option<f32>,
    pub target_pitch: Option<f32>,
    pub jump: bool,
    pub want_fire: bool,
}

const IDLE_TO_PATROL_MS: f64 = 500.0;
const PATROL_REMEMBERED_TARGET_MS: f64 = 5000.0;
const CHASE_STALE_MS: f64 = 10_000.0;
const CHASE_ARRIVAL_RADIUS: f32 = 2.0;
const PATROL_ARRIVAL_RADIUS: f32 = 1.0;
const FLEE_DURATION_MS: f64 = 3000.0;
const FLEE_HEALTH_THRESHOLD: f32 = 30.0;
const AIM_PERTURBATION_RAD_PER_INACCURACY: f32 = 0.2;
const OPTIMAL_RANGE_SLACK: f32 = 5.0;

/// Advances a bot's finite-state machine by one decision and returns the
/// movement/aim/fire intent the room runner should apply this tick. Bots
/// only re-decide every [`THINK_INTERVAL_MS`]; between decisions the
/// runner keeps calling `think` every tick, but the FSM's own state only
/// changes on a think tick.
pub fn think(
    bot: &mut Bot,
    now_ms: f64,
    los: &LosCache,
    team_based: bool,
    visible: &[VisibleCombatant],
    patrol_points: &[Vec3],
    rng: &mut impl Rng,
) -> BotIntent {
    if !bot.base.is_alive {
        bot.state = BotState::Dead;
        return BotIntent::default();
    }

    let cfg = ai_config(bot.difficulty);

    if now_ms - bot.last_decision_time >= THINK_INTERVAL_MS {
        bot.last_decision_time = now_ms;
        reconsider(bot, &cfg, now_ms, los, team_based, visible, patrol_points, rng);
    }

    match bot.state {
        BotState::Idle => BotIntent::default(),
        BotState::Patrol => patrol_intent(bot),
        BotState::Chase => chase_intent(bot),
        BotState::Attack => attack_intent(bot, &cfg, now_ms, rng),
        BotState::Flee => flee_intent(bot),
        BotState::Dead => BotIntent::default(),
    }
}

fn enter_state(bot: &mut Bot, state: BotState, now_ms: f64) {
    bot.state = state;
    bot.state_entered_at = now_ms;
}

fn reconsider(
    bot: &mut Bot,
    cfg: &AiConfig,
    now_ms: f64,
    los: &LosCache,
    team_based: bool,
    visible: &[VisibleCombatant],
    patrol_points: &[Vec3],
    rng: &mut impl Rng,
) {
    match bot.state {
        BotState::Idle => {
            if let Some(t) = acquire_target(bot, cfg, los, team_based, visible) {
                acquire(bot, &t, now_ms);
                if now_ms - bot.state_entered_at >= cfg.reaction_time_ms {
                    enter_state(bot, BotState::Attack, now_ms);
                }
            } else if now_ms - bot.state_entered_at >= IDLE_TO_PATROL_MS {
                enter_state(bot, BotState::Patrol, now_ms);
                pick_patrol_point(bot, patrol_points, rng);
            }
        }
        BotState::Patrol => {
            if let Some(t) = acquire_target(bot, cfg, los, team_based, visible) {
                acquire(bot, &t, now_ms);
                enter_state(bot, BotState::Attack, now_ms);
            } else if now_ms - bot.last_seen_target_at < PATROL_REMEMBERED_TARGET_MS {
                enter_state(bot, BotState::Chase, now_ms);
            } else if bot.patrol_target.is_none()
                || bot.base.position.distance(&bot.patrol_target.unwrap()) < PATROL_ARRIVAL_RADIUS
            {
                pick_patrol_point(bot, patrol_points, rng);
            }
        }
        BotState::Chase => {
            if let Some(t) = acquire_target(bot, cfg, los, team_based, visible) {
                acquire(bot, &t, now_ms);
                enter_state(bot, BotState::Attack, now_ms);
                return;
            }
            let reached = bot
                .last_known_target_pos
                .map(|p| bot.base.position.distance(&p) < CHASE_ARRIVAL_RADIUS)
                .unwrap_or(true);
            let stale = now_ms - bot.last_seen_target_at > CHASE_STALE_MS;
            if reached || stale {
                bot.forget_target();
                enter_state(bot, BotState::Patrol, now_ms);
                pick_patrol_point(bot, patrol_points, rng);
            }
        }
        BotState::Attack => {
            if bot.base.health < FLEE_HEALTH_THRESHOLD && rng.random::<f32>() > cfg.aggressiveness {
                enter_state(bot, BotState::Flee, now_ms);
                return;
            }
            let tracked = bot
                .target_id
                .as_deref()
                .and_then(|id| visible.iter().find(|c| c.id == id));
            match tracked {
                None => {
                    bot.forget_target();
                    enter_state(bot, BotState::Patrol, now_ms);
                    pick_patrol_point(bot, patrol_points, rng);
                }
                Some(t) if !t.is_alive => {
                    bot.forget_target();
                    enter_state(bot, BotState::Patrol, now_ms);
                    pick_patrol_point(bot, patrol_points, rng);
                }
                Some(t) if los.is_visible(&bot.base.id, t.id) => {
                    bot.last_known_target_pos = Some(t.position);
                    bot.last_seen_target_at = now_ms;
                }
                Some(_) => {
                    enter_state(bot, BotState::Chase, now_ms);
                }
            }
        }
        BotState::Flee => {
            if now_ms - bot.state_entered_at > FLEE_DURATION_MS {
                bot.forget_target();
                enter_state(bot, BotState::Patrol, now_ms);
                pick_patrol_point(bot, patrol_points, rng);
            }
        }
        BotState::Dead => {}
    }
}

fn acquire(bot: &mut Bot, target: &VisibleCombatant, now_ms: f64) {
    bot.target_id = Some(target.id.to_string());
    bot.last_known_target_pos = Some(target.position);
    bot.last_seen_target_at = now_ms;
}

fn pick_patrol_point(bot: &mut Bot, patrol_points: &[Vec3], rng: &mut impl Rng) {
    if patrol_points.is_empty() {
        bot.patrol_target = None;
        return;
    }
    let idx = rng.random_range(0..patrol_points.len());
    bot.patrol_target = Some(patrol_points[idx]);
}

/// Candidates are alive enemies within sight range and FOV — or, in a
/// non-team mode, every other alive entity. Within [`MAX_LOS_DISTANCE`] the
/// batched LOS query issued by the room runner must also confirm
/// visibility; beyond that the FOV test alone is trusted, since a ray that
/// far out costs more than the result is worth.
fn acquire_target<'a>(
    bot: &Bot,
    cfg: &AiConfig,
    los: &LosCache,
    team_based: bool,
    visible: &[VisibleCombatant<'a>],
) -> Option<VisibleCombatant<'a>> {
    let half_fov = cfg.fov_deg.to_radians() / 2.0;
    let (forward, _right) = Vec3::from_yaw(bot.base.yaw);

    visible
        .iter()
        .copied()
        .filter(|c| c.is_alive && (!team_based || c.team != bot.base.team))
        .filter(|c| bot.base.position.distance(&c.position) <= cfg.sight_range)
        .filter(|c| {
            let to_target = c.position - bot.base.position;
            forward.angle_to(&to_target) <= half_fov
        })
        .filter(|c| {
            let d = bot.base.position.distance(&c.position);
            d > MAX_LOS_DISTANCE || los.is_visible(&bot.base.id, c.id)
        })
        .min_by(|a, b| {
            let da = bot.base.position.distance_squared(&a.position);
            let db = bot.base.position.distance_squared(&b.position);
            da.partial_cmp(&db).unwrap()
        })
}

fn face(current_yaw: f32, from: Vec3, to: Vec3) -> f32 {
    let delta = to - from;
    if delta.xz().length_squared() < 1e-6 {
        return current_yaw;
    }
    delta.x.atan2(delta.z)
}

fn patrol_intent(bot: &Bot) -> BotIntent {
    let Some(dest) = bot.patrol_target else {
        return BotIntent::default();
    };
    let yaw = face(bot.base.yaw, bot.base.position, dest);
    BotIntent {
        forward: 1.0,
        strafe: 0.0,
        target_yaw: Some(yaw),
        target_pitch: Some(0.0),
        jump: false,
        want_fire: false,
    }
}

fn chase_intent(bot: &Bot) -> BotIntent {
    let Some(dest) = bot.last_known_target_pos else {
        return BotIntent::default();
    };
    let yaw = face(bot.base.yaw, bot.base.position, dest);
    BotIntent {
        forward: 1.0,
        strafe: 0.0,
        target_yaw: Some(yaw),
        target_pitch: Some(0.0),
        jump: false,
        want_fire: false,
    }
}

fn flee_intent(bot: &Bot) -> BotIntent {
    let Some(threat) = bot.last_known_target_pos else {
        return BotIntent {
            forward: 1.0,
            ..BotIntent::default()
        };
    };
    let away_yaw = face(bot.base.yaw, threat, bot.base.position);
    BotIntent {
        forward: 1.0,
        strafe: 0.0,
        target_yaw: Some(away_yaw),
        target_pitch: Some(0.0),
        jump: false,
        want_fire: false,
    }
}

/// Perturbs an otherwise-perfect aim vector by up to `(1 − accuracy) · 0.2`
/// rad, approximated as the sum of two independent uniforms rather than
/// pulling in a normal-distribution crate.
fn aim_with_spread(cfg: &AiConfig, perfect_yaw: f32, perfect_pitch: f32, rng: &mut impl Rng) -> (f32, f32) {
    let max_spread = (1.0 - cfg.accuracy) * AIM_PERTURBATION_RAD_PER_INACCURACY;
    let yaw_jitter = ((rng.random::<f32>() - 0.5) + (rng.random::<f32>() - 0.5)) * max_spread;
    let pitch_jitter = ((rng.random::<f32>() - 0.5) + (rng.random::<f32>() - 0.5)) * max_spread;
    (perfect_yaw + yaw_jitter, perfect_pitch + pitch_jitter)
}

/// Advances toward `optimalRange = 0.5 · weapon.range`, retreats if too
/// close, and strafes otherwise; fires when off cooldown and in range.
fn attack_intent(bot: &mut Bot, cfg: &AiConfig, now_ms: f64, rng: &mut impl Rng) -> BotIntent {
    let Some(target_pos) = bot.last_known_target_pos else {
        return BotIntent::default();
    };
    let weapon_range = bot
        .base
        .current_weapon_instance()
        .map(|inst| weapon_def(inst.weapon_type).range)
        .unwrap_or(0.0);

    let to_target = target_pos - bot.base.position;
    let d = to_target.length();
    let perfect_yaw = to_target.x.atan2(to_target.z);
    let horizontal = to_target.xz().length();
    let perfect_pitch = (-to_target.y).atan2(horizontal);
    let (yaw, pitch) = aim_with_spread(cfg, perfect_yaw, perfect_pitch, rng);

    let optimal_range = 0.5 * weapon_range;
    let forward = if d > optimal_range + OPTIMAL_RANGE_SLACK {
        1.0
    } else if d < optimal_range - OPTIMAL_RANGE_SLACK {
        -1.0
    } else {
        0.0
    };
    let strafe = if forward == 0.0 { (now_ms * 0.002).sin().signum() as f32 } else { 0.0 };

    let want_fire = now_ms >= bot.next_fire_time && d <= weapon_range;
    if want_fire {
        let fire_interval_ms = bot
            .base
            .current_weapon_instance()
            .map(|inst| weapon_def(inst.weapon_type).fire_interval_ms())
            .unwrap_or(0.0);
        bot.next_fire_time = now_ms + cfg.reaction_time_ms + fire_interval_ms;
    }

    BotIntent {
        forward,
        strafe,
        target_yaw: Some(yaw),
        target_pitch: Some(pitch),
        jump: false,
        want_fire,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Difficulty;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn idle_with_no_visible_targets_and_no_patrol_stays_idle() {
        let mut bot = Bot::new("b1", "Bot", Team::T, Difficulty::Medium);
        let los = LosCache::new();
        let intent = think(&mut bot, 0.0, &los, true, &[], &[], &mut rng());
        assert_eq!(bot.state, BotState::Idle);
        assert_eq!(intent.forward, 0.0);
    }

    #[test]
    fn idle_waits_out_reaction_time_before_attacking() {
        let mut bot = Bot::new("b1", "Bot", Team::T, Difficulty::Hard);
        bot.base.position = Vec3::new(0.0, 1.7, 0.0);
        let los = LosCache::new();
        let enemy = VisibleCombatant { id: "enemy", position: Vec3::new(0.0, 1.7, 5.0), team: Team::Ct, is_alive: true };

        think(&mut bot, 0.0, &los, true, &[enemy], &[], &mut rng());
        assert_eq!(bot.state, BotState::Idle);

        let cfg = ai_config(Difficulty::Hard);
        think(&mut bot, cfg.reaction_time_ms + 1.0, &los, true, &[enemy], &[], &mut rng());
        assert_eq!(bot.state, BotState::Attack);
    }

    #[test]
    fn ffa_mode_targets_same_team_entities() {
        let mut bot = Bot::new("b1", "Bot", Team::T, Difficulty::Hard);
        bot.base.position = Vec3::new(0.0, 1.7, 0.0);
        let los = LosCache::new();
        let other = VisibleCombatant { id: "other", position: Vec3::new(0.0, 1.7, 5.0), team: Team::T, is_alive: true };

        let cfg = ai_config(Difficulty::Hard);
        think(&mut bot, 0.0, &los, false, &[other], &[], &mut rng());
        think(&mut bot, cfg.reaction_time_ms + 1.0, &los, false, &[other], &[], &mut rng());
        assert_eq!(bot.state, BotState::Attack);
    }

    #[test]
    fn team_mode_ignores_same_team_entities() {
        let mut bot = Bot::new("b1", "Bot", Team::T, Difficulty::Hard);
        bot.base.position = Vec3::new(0.0, 1.7, 0.0);
        let los = LosCache::new();
        let teammate = VisibleCombatant { id: "mate", position: Vec3::new(0.0, 1.7, 5.0), team: Team::T, is_alive: true };

        let cfg = ai_config(Difficulty::Hard);
        think(&mut bot, 0.0, &los, true, &[teammate], &[], &mut rng());
        think(&mut bot, cfg.reaction_time_ms + 1.0, &los, true, &[teammate], &[], &mut rng());
        assert_eq!(bot.state, BotState::Idle);
    }

    #[test]
    fn low_health_bot_can_flee_instead_of_engaging() {
        let mut bot = Bot::new("b1", "Bot", Team::T, Difficulty::Easy);
        bot.base.health = 10.0;
        bot.base.position = Vec3::new(0.0, 1.7, 0.0);
        bot.state = BotState::Attack;
        bot.target_id = Some("enemy".into());
        let los = LosCache::new();
        let enemy = VisibleCombatant { id: "enemy", position: Vec3::new(0.0, 1.7, 5.0), team: Team::Ct, is_alive: true };
        bot.last_known_target_pos = Some(enemy.position);
        think(&mut bot, 0.0, &los, true, &[enemy], &[], &mut rng());
        assert!(matches!(bot.state, BotState::Flee | BotState::Attack));
    }

    #[test]
    fn flee_returns_to_patrol_after_duration() {
        let mut bot = Bot::new("b1", "Bot", Team::T, Difficulty::Medium);
        bot.state = BotState::Flee;
        bot.state_entered_at = 0.0;
        let los = LosCache::new();
        think(&mut bot, FLEE_DURATION_MS + 1.0, &los, true, &[], &[], &mut rng());
        assert_eq!(bot.state, BotState::Patrol);
    }

    #[test]
    fn dead_bot_never_moves() {
        let mut bot = Bot::new("b1", "Bot", Team::T, Difficulty::Medium);
        bot.base.is_alive = false;
        let los = LosCache::new();
        let intent = think(&mut bot, 0.0, &los, true, &[], &[], &mut rng());
        assert_eq!(bot.state, BotState::Dead);
        assert!(!intent.want_fire);
    }
}
