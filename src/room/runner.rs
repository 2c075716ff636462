use crate::ai::config::{ai_config, MAX_LOS_DISTANCE};
use crate::ai::{think, BotIntent, VisibleCombatant};
use crate::entities::{CombatantMut, Input, Player, Team};
use crate::los::LosCache;
use crate::math::Vec3;
use crate::physics::{move_with_mesh_collision, MAX_FALL_SPEED, PLAYER_HEIGHT};
use crate::room::phase::Phase;
use crate::room::room::Room;
use crate::weapons::{kill_reward, weapon_def, Slot, WeaponInstance, WeaponType};
use rand::Rng;
use serde::Serialize;

pub const PLAYER_EYE_HEIGHT: f32 = 1.6;
pub const PLAYER_MOVE_SPEED: f32 = 5.0;
pub const JUMP_VELOCITY: f32 = 6.5;
pub const GRAVITY: f32 = -18.0;

#[derive(Debug)]
pub enum FireOutcome {
    NoAmmo,
    Reloading,
    RateLimited,
    Miss,
    HitWorld,
    HitPlayer { target_id: String, damage: f32, killed: bool, headshot: bool },
}

/// Drives one `Room`'s authoritative tick. Owns nothing the room doesn't
/// already own; stateless aside from the RNG it carries for bot aim jitter
/// and anything genuinely tick-scoped.
pub struct GameRunner {
    rng: rand::rngs::SmallRng,
}

impl GameRunner {
    pub fn new() -> Self {
        use rand::SeedableRng;
        Self { rng: rand::rngs::SmallRng::from_os_rng() }
    }

    /// Applies one input sample: movement, look, jump. Combat-affecting
    /// fields (fire/reload) are handled by dedicated methods gated
    /// separately on phase.
    pub fn apply_input(&self, room: &mut Room, player_id: &str, input: &Input, dt: f32) {
        let input = input.clamped();
        let Some(player) = room.players.get_mut(player_id) else {
            return;
        };
        if !player.is_alive || !room.phase.allows_combat_input() {
            player.last_input_sequence = input.sequence;
            return;
        }

        player.yaw = input.yaw;
        player.pitch = input
            .pitch
            .clamp(-(std::f32::consts::FRAC_PI_2 - 0.1), std::f32::consts::FRAC_PI_2 - 0.1);

        let (forward, right) = Vec3::from_yaw(player.yaw);
        let wish = (forward * input.forward + right * input.strafe).xz();
        let wish = if wish.length_squared() > 1.0 {
            wish.normalized()
        } else {
            wish
        };

        let mut vel = Vec3::new(wish.x * PLAYER_MOVE_SPEED, player.velocity.y, wish.z * PLAYER_MOVE_SPEED);
        vel.y += GRAVITY * dt;
        vel.y = vel.y.max(MAX_FALL_SPEED);
        if input.jump && player.motion.on_ground {
            vel.y = JUMP_VELOCITY;
        }

        let feet = player.position.with_y(player.position.y - PLAYER_EYE_HEIGHT);
        let new_feet = move_with_mesh_collision(&room.map.mesh, feet, &mut vel, dt, &mut player.motion);
        let new_feet = room.map.bounds.clamp(new_feet);

        player.position = new_feet.with_y(new_feet.y + PLAYER_EYE_HEIGHT);
        player.velocity = vel;
        player.last_input_sequence = input.sequence;
    }

    /// Drives every bot's FSM for one tick and applies the resulting
    /// movement/aim/fire intent exactly as a human input would be applied.
    pub fn tick_bots(&mut self, room: &mut Room, now_ms: f64, dt: f32) {
        let visible: Vec<(String, Vec3, Team, bool)> = room
            .players
            .values()
            .map(|p| (p.id.clone(), p.position, p.team, p.is_alive))
            .chain(
                room.bots
                    .values()
                    .map(|b| (b.base.id.clone(), b.base.position, b.base.team, b.base.is_alive)),
            )
            .collect();
        let patrol_points: Vec<Vec3> = room.map.spawn_points.iter().map(|s| s.position).collect();

        let bot_ids: Vec<String> = room.bots.keys().cloned().collect();
        let team_based = room.config.mode.is_team_based();

        // One batched LOS pass per tick: every (bot, alive candidate) pair
        // within sight range and within MAX_LOS_DISTANCE gets a ray query,
        // instead of each bot's think() raycasting the mesh on its own.
        let mut query_segs: Vec<(Vec3, Vec3)> = Vec::new();
        let mut query_keys: Vec<(&str, &str)> = Vec::new();
        for id in &bot_ids {
            let bot = &room.bots[id];
            let cfg = ai_config(bot.difficulty);
            let max_dist = cfg.sight_range.min(MAX_LOS_DISTANCE);
            for (vid, pos, _team, alive) in &visible {
                if vid == &bot.base.id || !alive {
                    continue;
                }
                if bot.base.position.distance(pos) > max_dist {
                    continue;
                }
                query_segs.push((bot.base.position, *pos));
                query_keys.push((id.as_str(), vid.as_str()));
            }
        }
        let raw_results = room.los_pool.batch_line_of_sight(&query_segs);
        let mut los_cache = LosCache::new();
        for (idx, (from_id, to_id)) in query_keys.into_iter().enumerate() {
            if let Some(is_visible) = raw_results.get(&idx) {
                los_cache.insert(from_id, to_id, *is_visible);
            }
        }

        for id in bot_ids {
            let intent = {
                let bot = room.bots.get_mut(&id).unwrap();
                let combatants: Vec<VisibleCombatant> = visible
                    .iter()
                    .filter(|(vid, ..)| vid != &bot.base.id)
                    .map(|(vid, pos, team, alive)| VisibleCombatant {
                        id: vid,
                        position: *pos,
                        team: *team,
                        is_alive: *alive,
                    })
                    .collect();
                think(bot, now_ms, &los_cache, team_based, &combatants, &patrol_points, &mut self.rng)
            };
            self.apply_bot_intent(room, &id, &intent, dt);
            if intent.want_fire {
                self.fire(room, &id, now_ms);
            }
        }
    }

    fn apply_bot_intent(&self, room: &mut Room, bot_id: &str, intent: &BotIntent, dt: f32) {
        let Some(bot) = room.bots.get_mut(bot_id) else {
            return;
        };
        if !bot.base.is_alive {
            return;
        }
        if let Some(yaw) = intent.target_yaw {
            bot.base.yaw = yaw;
        }
        if let Some(pitch) = intent.target_pitch {
            bot.base.pitch = pitch;
        }
        let (forward, _right) = Vec3::from_yaw(bot.base.yaw);
        let wish = (forward * intent.forward).xz();
        let mut vel = Vec3::new(wish.x * PLAYER_MOVE_SPEED, bot.base.velocity.y, wish.z * PLAYER_MOVE_SPEED);
        vel.y += GRAVITY * dt;
        vel.y = vel.y.max(MAX_FALL_SPEED);
        if intent.jump && bot.base.motion.on_ground {
            vel.y = JUMP_VELOCITY;
        }

        let feet = bot.base.position.with_y(bot.base.position.y - PLAYER_EYE_HEIGHT);
        let new_feet = move_with_mesh_collision(&room.map.mesh, feet, &mut vel, dt, &mut bot.base.motion);
        let new_feet = room.map.bounds.clamp(new_feet);
        bot.base.position = new_feet.with_y(new_feet.y + PLAYER_EYE_HEIGHT);
        bot.base.velocity = vel;
    }

    /// Attempts to fire the shooter's current weapon. Gates on phase, ammo,
    /// reload state, and fire-rate interval before doing any raycasting.
    pub fn fire(&mut self, room: &mut Room, shooter_id: &str, now_ms: f64) -> FireOutcome {
        if !room.phase.allows_combat_input() {
            return FireOutcome::RateLimited;
        }

        let (origin, dir, weapon_type, slot) = {
            let Some(p) = lookup_player_or_bot_base(room, shooter_id) else {
                return FireOutcome::RateLimited;
            };
            let slot = p.current_weapon;
            let Some(inst) = p.weapons.get(&slot) else {
                return FireOutcome::NoAmmo;
            };
            if inst.is_reloading {
                return FireOutcome::Reloading;
            }
            if !inst.can_fire(now_ms) {
                return if inst.current_ammo == 0 {
                    FireOutcome::NoAmmo
                } else {
                    FireOutcome::RateLimited
                };
            }
            let (forward, _) = Vec3::from_yaw(p.yaw);
            let pitched = Vec3::new(
                forward.x * p.pitch.cos(),
                p.pitch.sin(),
                forward.z * p.pitch.cos(),
            );
            (p.position, pitched, inst.weapon_type, slot)
        };

        if let Some(p) = lookup_player_or_bot_base_mut(room, shooter_id) {
            if let Some(inst) = p.weapons.get_mut(&slot) {
                inst.fire(now_ms);
            }
        }

        let def = weapon_def(weapon_type);
        let spread = apply_spread(dir, def.spread_deg, &mut self.rng);

        let mut best_hit: Option<(String, f32, Vec3)> = None;
        for (id, pos) in all_combatant_positions(room, shooter_id) {
            if let Some(t) = ray_hits_capsule(origin, spread, pos, def.range) {
                if best_hit.as_ref().map(|(_, bt, _)| t < *bt).unwrap_or(true) {
                    best_hit = Some((id, t, pos));
                }
            }
        }

        let wall_dist = room.map.mesh.raycast(origin, spread, def.range).map(|h| h.distance);

        match best_hit {
            Some((target_id, t, _)) if wall_dist.map(|w| t < w).unwrap_or(true) => {
                let hit_point = origin + spread * t;
                let headshot = lookup_player_or_bot_base(room, &target_id)
                    .map(|tp| tp.is_headshot_height(hit_point.y))
                    .unwrap_or(false);
                let raw_damage = if headshot {
                    def.damage * def.headshot_multiplier
                } else {
                    def.damage
                };

                let (damage, killed) = if let Some(target) = combatant_mut_lookup(room, &target_id) {
                    let actual = target.apply_damage(raw_damage);
                    (actual, !target.is_alive())
                } else {
                    (0.0, false)
                };

                if killed {
                    self.resolve_kill(room, shooter_id, &target_id, weapon_type);
                }

                FireOutcome::HitPlayer { target_id, damage, killed, headshot }
            }
            Some(_) => FireOutcome::HitWorld,
            None if wall_dist.is_some() => FireOutcome::HitWorld,
            None => FireOutcome::Miss,
        }
    }

    fn resolve_kill(&self, room: &mut Room, shooter_id: &str, target_id: &str, weapon_type: WeaponType) {
        if let Some(shooter) = combatant_mut_lookup(room, shooter_id) {
            shooter.record_kill();
        }
        if let Some(target) = combatant_mut_lookup(room, target_id) {
            target.record_death();
        }
        let reward = kill_reward(weapon_type);
        if let Some(p) = room.players.get_mut(shooter_id) {
            p.money = room.config.economy.clamp_money(p.money + reward);
        }
    }

    pub fn start_reload(&self, room: &mut Room, player_id: &str, now_ms: f64) -> bool {
        let Some(p) = room.players.get_mut(player_id) else {
            return false;
        };
        let slot = p.current_weapon;
        match p.weapons.get_mut(&slot) {
            Some(inst) if inst.can_reload() => {
                inst.start_reload(now_ms);
                true
            }
            _ => false,
        }
    }

    pub fn tick_reloads(&self, room: &mut Room, now_ms: f64) {
        for p in room.players.values_mut() {
            for inst in p.weapons.values_mut() {
                inst.tick_reload(now_ms);
            }
        }
        for b in room.bots.values_mut() {
            for inst in b.base.weapons.values_mut() {
                inst.tick_reload(now_ms);
            }
        }
    }

    /// Purchases a weapon into its slot if the room is in the buy phase,
    /// the player is alive, and can afford it.
    pub fn buy(&self, room: &mut Room, player_id: &str, weapon_type: WeaponType) -> bool {
        if !room.phase.allows_buy() {
            return false;
        }
        let def = weapon_def(weapon_type);
        let Some(p) = room.players.get_mut(player_id) else {
            return false;
        };
        if !p.is_alive || p.money < def.cost {
            return false;
        }
        p.money -= def.cost;
        p.weapons.insert(def.slot, WeaponInstance::fresh(weapon_type));
        p.current_weapon = def.slot;
        true
    }

    /// Switches to an occupied slot. No-op if the slot is empty.
    pub fn select_weapon(&self, room: &mut Room, player_id: &str, slot: Slot) -> bool {
        let Some(p) = room.players.get_mut(player_id) else {
            return false;
        };
        if p.weapons.contains_key(&slot) {
            p.current_weapon = slot;
            true
        } else {
            false
        }
    }

    /// Drops the weapon in `slot` at the player's feet. The knife can't be
    /// dropped; if the dropped slot was selected, falls back to whatever
    /// slot is still occupied (the knife is always present).
    pub fn drop_weapon(&self, room: &mut Room, player_id: &str, slot: Slot, now_ms: f64) -> bool {
        if slot == Slot::Melee {
            return false;
        }
        let Some(p) = room.players.get_mut(player_id) else {
            return false;
        };
        if !p.is_alive {
            return false;
        }
        let Some(inst) = p.weapons.remove(&slot) else {
            return false;
        };
        let feet = p.position.with_y(p.position.y - PLAYER_EYE_HEIGHT);
        if p.current_weapon == slot {
            p.current_weapon = p
                .weapons
                .keys()
                .find(|s| **s == Slot::Primary)
                .or_else(|| p.weapons.keys().find(|s| **s == Slot::Sidearm))
                .copied()
                .unwrap_or(Slot::Melee);
        }
        let id = format!("dw-{}-{}", room.round_number, room.dropped_weapons.len());
        room.dropped_weapons.push(crate::entities::DroppedWeapon {
            id,
            weapon_type: inst.weapon_type,
            position: feet,
            current_ammo: inst.current_ammo,
            reserve_ammo: inst.reserve_ammo,
            dropped_at: now_ms,
        });
        true
    }

    /// Picks up a dropped weapon within 3m, restoring its stored ammo.
    pub fn pickup_weapon(&self, room: &mut Room, player_id: &str, dropped_id: &str) -> bool {
        const PICKUP_RANGE: f32 = 3.0;
        let Some(p) = room.players.get(player_id) else {
            return false;
        };
        if !p.is_alive {
            return false;
        }
        let feet = p.position.with_y(p.position.y - PLAYER_EYE_HEIGHT);
        let Some(idx) = room
            .dropped_weapons
            .iter()
            .position(|d| d.id == dropped_id && feet.distance(&d.position) <= PICKUP_RANGE)
        else {
            return false;
        };
        let dropped = room.dropped_weapons.remove(idx);
        let def = weapon_def(dropped.weapon_type);
        let p = room.players.get_mut(player_id).unwrap();
        p.weapons.insert(
            def.slot,
            WeaponInstance {
                weapon_type: dropped.weapon_type,
                current_ammo: dropped.current_ammo,
                reserve_ammo: dropped.reserve_ammo,
                is_reloading: false,
                reload_start_time: 0.0,
                last_fire_time: 0.0,
            },
        );
        if def.slot == Slot::Primary {
            p.current_weapon = Slot::Primary;
        }
        true
    }

    /// Advances the round phase machine. Called once per tick with
    /// elapsed wall-clock time; returns `true` if the phase changed this
    /// call (callers use this to trigger a fresh snapshot broadcast).
    pub fn tick_phase(&self, room: &mut Room, now_ms: f64) -> bool {
        let elapsed = now_ms - room.phase_started_at_ms;
        match room.phase {
            Phase::PreMatch => {
                if room.all_ready() && room.players.len() + room.bots.len() >= 2 {
                    room.phase = Phase::Warmup;
                    room.phase_started_at_ms = now_ms;
                    true
                } else {
                    false
                }
            }
            Phase::Warmup => {
                if elapsed >= (room.config.warmup_time_secs as f64) * 1000.0 {
                    self.begin_round(room, now_ms);
                    true
                } else {
                    false
                }
            }
            Phase::Freeze => {
                if elapsed >= (room.config.freeze_time_secs as f64) * 1000.0 {
                    room.phase = Phase::Live;
                    room.phase_started_at_ms = now_ms;
                    true
                } else {
                    false
                }
            }
            Phase::Live => {
                if let Some(winner) = self.check_round_end(room, elapsed) {
                    self.end_round(room, winner, now_ms);
                    true
                } else {
                    false
                }
            }
            Phase::RoundEnd => {
                if elapsed >= (room.config.round_end_delay_secs as f64) * 1000.0 {
                    if self.match_is_over(room) {
                        room.phase = Phase::MatchEnd;
                        room.phase_started_at_ms = now_ms;
                    } else {
                        self.begin_round(room, now_ms);
                    }
                    true
                } else {
                    false
                }
            }
            Phase::MatchEnd => false,
        }
    }

    fn match_is_over(&self, room: &Room) -> bool {
        room.score_t >= room.config.rounds_to_win || room.score_ct >= room.config.rounds_to_win
    }

    /// Elimination (one side has zero alive) or round-time expiry, whichever
    /// comes first. Returns the winning team, if the round has ended.
    fn check_round_end(&self, room: &Room, elapsed_ms: f64) -> Option<Team> {
        let t_alive = room.alive_count(Team::T);
        let ct_alive = room.alive_count(Team::Ct);
        if t_alive == 0 && ct_alive == 0 {
            return Some(self.timeout_winner(room));
        }
        if t_alive == 0 {
            return Some(Team::Ct);
        }
        if ct_alive == 0 {
            return Some(Team::T);
        }
        if elapsed_ms >= (room.config.round_time_secs as f64) * 1000.0 {
            return Some(self.timeout_winner(room));
        }
        None
    }

    /// On a clock expiry with both sides alive (or a simultaneous wipe),
    /// the side with more survivors wins; an exact tie favors the
    /// defenders (CT), matching the usual round-based FPS convention.
    fn timeout_winner(&self, room: &Room) -> Team {
        let t_alive = room.alive_count(Team::T);
        let ct_alive = room.alive_count(Team::Ct);
        if t_alive > ct_alive {
            Team::T
        } else {
            Team::Ct
        }
    }

    fn begin_round(&self, room: &mut Room, now_ms: f64) {
        room.round_number += 1;
        room.phase = Phase::Freeze;
        room.phase_started_at_ms = now_ms;
        let bonus_t = if room.score_t > room.score_ct {
            room.config.economy.round_win_bonus
        } else {
            room.config.economy.round_lose_bonus
        };
        let bonus_ct = if room.score_ct > room.score_t {
            room.config.economy.round_win_bonus
        } else {
            room.config.economy.round_lose_bonus
        };
        let mut t_spawn_idx = 0usize;
        let mut ct_spawn_idx = 0usize;
        let t_spawns: Vec<Vec3> = room
            .map
            .spawns_for(crate::entities::SpawnTeam::T)
            .map(|(_, s)| s.position)
            .collect();
        let ct_spawns: Vec<Vec3> = room
            .map
            .spawns_for(crate::entities::SpawnTeam::Ct)
            .map(|(_, s)| s.position)
            .collect();

        for p in room.players.values_mut() {
            let bonus = if p.team == Team::T { bonus_t } else { bonus_ct };
            let money = room.config.economy.clamp_money(p.money + bonus);
            let spawn = match p.team {
                Team::T if !t_spawns.is_empty() => {
                    let s = t_spawns[t_spawn_idx % t_spawns.len()];
                    t_spawn_idx += 1;
                    s
                }
                Team::Ct if !ct_spawns.is_empty() => {
                    let s = ct_spawns[ct_spawn_idx % ct_spawns.len()];
                    ct_spawn_idx += 1;
                    s
                }
                _ => Vec3::new(0.0, PLAYER_HEIGHT, 0.0),
            };
            p.respawn(spawn.with_y(spawn.y + PLAYER_EYE_HEIGHT), 0.0, money);
        }
        for b in room.bots.values_mut() {
            let bonus = if b.base.team == Team::T { bonus_t } else { bonus_ct };
            let money = room.config.economy.clamp_money(b.base.money + bonus);
            let spawn = match b.base.team {
                Team::T if !t_spawns.is_empty() => {
                    let s = t_spawns[t_spawn_idx % t_spawns.len()];
                    t_spawn_idx += 1;
                    s
                }
                Team::Ct if !ct_spawns.is_empty() => {
                    let s = ct_spawns[ct_spawn_idx % ct_spawns.len()];
                    ct_spawn_idx += 1;
                    s
                }
                _ => Vec3::new(0.0, PLAYER_HEIGHT, 0.0),
            };
            b.base.respawn(spawn.with_y(spawn.y + PLAYER_EYE_HEIGHT), 0.0, money);
            b.forget_target();
        }
        room.dropped_weapons.clear();
    }

    fn end_round(&self, room: &mut Room, winner: Team, now_ms: f64) {
        match winner {
            Team::T => room.score_t += 1,
            Team::Ct => room.score_ct += 1,
            Team::Spectator => {}
        }
        room.phase = Phase::RoundEnd;
        room.phase_started_at_ms = now_ms;
    }

    pub fn build_snapshot(&self, room: &Room, now_ms: f64) -> Snapshot {
        Snapshot {
            room_id: room.id.clone(),
            phase: room.phase,
            round_number: room.round_number,
            score_t: room.score_t,
            score_ct: room.score_ct,
            phase_time_remaining_ms: phase_time_remaining(room, now_ms),
            players: room.players.values().map(PlayerSnapshot::from).collect(),
            bots: room.bots.values().map(BotSnapshot::from).collect(),
            dropped_weapons: room.dropped_weapons.clone(),
        }
    }
}

impl Default for GameRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn phase_time_remaining(room: &Room, now_ms: f64) -> f64 {
    let elapsed = now_ms - room.phase_started_at_ms;
    let total = match room.phase {
        Phase::Warmup => room.config.warmup_time_secs as f64 * 1000.0,
        Phase::Freeze => room.config.freeze_time_secs as f64 * 1000.0,
        Phase::Live => room.config.round_time_secs as f64 * 1000.0,
        Phase::RoundEnd => room.config.round_end_delay_secs as f64 * 1000.0,
        Phase::PreMatch | Phase::MatchEnd => 0.0,
    };
    (total - elapsed).max(0.0)
}

fn apply_spread(dir: Vec3, spread_deg: f32, rng: &mut impl Rng) -> Vec3 {
    if spread_deg <= 0.0 {
        return dir.normalized();
    }
    let max_rad = spread_deg.to_radians();
    let yaw_jitter = (rng.random::<f32>() - 0.5) * 2.0 * max_rad;
    let pitch_jitter = (rng.random::<f32>() - 0.5) * 2.0 * max_rad;
    let yaw = dir.x.atan2(dir.z) + yaw_jitter;
    let horizontal = dir.xz().length();
    let pitch = (-dir.y).atan2(horizontal) + pitch_jitter;
    Vec3::new(
        yaw.sin() * pitch.cos(),
        -pitch.sin(),
        yaw.cos() * pitch.cos(),
    )
    .normalized()
}

/// Approximates a standing capsule as a sphere centered on the torso for
/// hit-scan purposes: cheap, and close enough given `PLAYER_RADIUS` is
/// already a simplification of the player's real silhouette.
fn ray_hits_capsule(origin: Vec3, dir: Vec3, capsule_eye: Vec3, max_range: f32) -> Option<f32> {
    use crate::physics::PLAYER_RADIUS;
    let center = capsule_eye.with_y(capsule_eye.y - 0.3);
    let to_center = center - origin;
    let t_closest = to_center.dot(&dir);
    if t_closest < 0.0 || t_closest > max_range {
        return None;
    }
    let closest_point = origin + dir * t_closest;
    let dist_sq = closest_point.distance_squared(&center);
    let radius_sq = PLAYER_RADIUS * PLAYER_RADIUS;
    if dist_sq <= radius_sq {
        let half_chord = (radius_sq - dist_sq).sqrt();
        Some((t_closest - half_chord).max(0.0))
    } else {
        None
    }
}

fn all_combatant_positions(room: &Room, exclude_id: &str) -> Vec<(String, Vec3)> {
    room.players
        .values()
        .filter(|p| p.id != exclude_id && p.is_alive)
        .map(|p| (p.id.clone(), p.position))
        .chain(
            room.bots
                .values()
                .filter(|b| b.base.id != exclude_id && b.base.is_alive)
                .map(|b| (b.base.id.clone(), b.base.position)),
        )
        .collect()
}

fn lookup_player_or_bot_base<'a>(room: &'a Room, id: &str) -> Option<&'a Player> {
    room.players
        .get(id)
        .or_else(|| room.bots.get(id).map(|b| &b.base))
}

fn lookup_player_or_bot_base_mut<'a>(room: &'a mut Room, id: &str) -> Option<&'a mut Player> {
    if room.players.contains_key(id) {
        room.players.get_mut(id)
    } else {
        room.bots.get_mut(id).map(|b| &mut b.base)
    }
}

fn combatant_mut_lookup<'a>(room: &'a mut Room, id: &str) -> Option<&'a mut dyn CombatantMut> {
    if room.players.contains_key(id) {
        room.players.get_mut(id).map(|p| p as &mut dyn CombatantMut)
    } else {
        room.bots.get_mut(id).map(|b| b as &mut dyn CombatantMut)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub health: f32,
    pub armor: f32,
    pub is_alive: bool,
    pub current_weapon: Slot,
    pub money: i32,
    pub kills: u32,
    pub deaths: u32,
    pub last_input_sequence: u32,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            team: p.team,
            position: p.position,
            yaw: p.yaw,
            pitch: p.pitch,
            health: p.health,
            armor: p.armor,
            is_alive: p.is_alive,
            current_weapon: p.current_weapon,
            money: p.money,
            kills: p.kills,
            deaths: p.deaths,
            last_input_sequence: p.last_input_sequence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BotSnapshot {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub position: Vec3,
    pub yaw: f32,
    pub health: f32,
    pub is_alive: bool,
    pub state: crate::entities::BotState,
}

impl From<&crate::entities::Bot> for BotSnapshot {
    fn from(b: &crate::entities::Bot) -> Self {
        Self {
            id: b.base.id.clone(),
            name: b.base.name.clone(),
            team: b.base.team,
            position: b.base.position,
            yaw: b.base.yaw,
            health: b.base.health,
            is_alive: b.base.is_alive,
            state: b.state,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub room_id: String,
    pub phase: Phase,
    pub round_number: u32,
    pub score_t: u32,
    pub score_ct: u32,
    pub phase_time_remaining_ms: f64,
    pub players: Vec<PlayerSnapshot>,
    pub bots: Vec<BotSnapshot>,
    pub dropped_weapons: Vec<crate::entities::DroppedWeapon>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MapBounds, SpawnPoint, SpawnTeam};
    use crate::room::config::RoomConfig;

    fn test_map() -> MapData {
        MapData::load(
            MapBounds {
                min: Vec3::new(-50.0, 0.0, -50.0),
                max: Vec3::new(50.0, 10.0, 50.0),
            },
            vec![
                SpawnPoint { position: Vec3::new(-10.0, 0.0, 0.0), yaw: 0.0, team: SpawnTeam::T },
                SpawnPoint { position: Vec3::new(10.0, 0.0, 0.0), yaw: 0.0, team: SpawnTeam::Ct },
            ],
            &[
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
            ],
        )
    }

    use crate::entities::MapData;

    #[test]
    fn buy_gated_by_phase() {
        let mut room = Room::new("r1", RoomConfig::default(), test_map());
        room.add_player("p1", "Alice");
        let runner = GameRunner::new();
        room.phase = Phase::PreMatch;
        assert!(!runner.buy(&mut room, "p1", WeaponType::Rifle));
        room.phase = Phase::Freeze;
        assert!(runner.buy(&mut room, "p1", WeaponType::Rifle));
        assert!(room.players["p1"].weapons.contains_key(&Slot::Primary));
    }

    #[test]
    fn one_shot_sniper_headshot_kills() {
        let mut room = Room::new("r1", RoomConfig::default(), test_map());
        room.add_player("shooter", "S");
        room.add_player("victim", "V");
        room.phase = Phase::Live;

        {
            let shooter = room.players.get_mut("shooter").unwrap();
            shooter.position = Vec3::new(0.0, PLAYER_EYE_HEIGHT, 0.0);
            shooter.yaw = 0.0;
            shooter.pitch = 0.0;
            shooter.weapons.insert(Slot::Primary, WeaponInstance::fresh(WeaponType::Sniper));
            shooter.current_weapon = Slot::Primary;
        }
        {
            let victim = room.players.get_mut("victim").unwrap();
            victim.position = Vec3::new(0.0, PLAYER_EYE_HEIGHT, 10.0);
        }

        let mut runner = GameRunner::new();
        let outcome = runner.fire(&mut room, "shooter", 0.0);
        match outcome {
            FireOutcome::HitPlayer { killed, headshot, .. } => {
                assert!(killed);
                assert!(headshot);
            }
            other => panic!("expected a headshot kill, got {:?}", other),
        }
        assert!(!room.players["victim"].is_alive);
    }

    #[test]
    fn round_ends_by_elimination() {
        let mut room = Room::new("r1", RoomConfig::default(), test_map());
        room.add_player("p1", "Alice");
        room.add_player("p2", "Bob");
        room.phase = Phase::Live;
        room.phase_started_at_ms = 0.0;
        let team_p1 = room.players["p1"].team;
        let team_p2 = room.players["p2"].team;
        assert_ne!(team_p1, team_p2);
        room.players.get_mut("p2").unwrap().is_alive = false;
        room.players.get_mut("p2").unwrap().health = 0.0;

        let runner = GameRunner::new();
        let changed = runner.tick_phase(&mut room, 1000.0);
        assert!(changed);
        assert_eq!(room.phase, Phase::RoundEnd);
        let expected_score = if team_p1 == Team::T { room.score_t } else { room.score_ct };
        assert_eq!(expected_score, 1);
    }

    #[test]
    fn reload_completes_after_reload_time() {
        let mut room = Room::new("r1", RoomConfig::default(), test_map());
        room.add_player("p1", "Alice");
        room.phase = Phase::Live;
        {
            let p = room.players.get_mut("p1").unwrap();
            p.weapons.get_mut(&Slot::Sidearm).unwrap().current_ammo = 3;
        }
        let runner = GameRunner::new();
        assert!(runner.start_reload(&mut room, "p1", 0.0));
        let def = weapon_def(WeaponType::Pistol);
        runner.tick_reloads(&mut room, def.reload_time as f64 * 1000.0 + 1.0);
        let inst = room.players["p1"].weapons[&Slot::Sidearm];
        assert!(!inst.is_reloading);
        assert_eq!(inst.current_ammo, 12);
    }
}
