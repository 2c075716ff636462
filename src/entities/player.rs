use crate::math::Vec3;
use crate::physics::MotionState;
use crate::weapons::{Slot, WeaponInstance, WeaponType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    T,
    Ct,
    Spectator,
}

/// The fields every combat participant exposes to damage resolution and
/// bot targeting, independent of whether it's a human player or a bot.
/// Keeps `Bot` from needing a back-pointer to treat itself as "a player
/// with AI bolted on" — damage code takes `&dyn Combatant`/`&mut dyn
/// Combatant` instead of matching on an enum of participant kinds.
pub trait Combatant {
    fn id(&self) -> &str;
    fn eye_position(&self) -> Vec3;
    fn team(&self) -> Team;
    fn is_alive(&self) -> bool;
    fn health(&self) -> f32;
    fn armor(&self) -> f32;
}

pub trait CombatantMut: Combatant {
    fn apply_damage(&mut self, raw_damage: f32) -> f32;
    fn record_kill(&mut self);
    fn record_death(&mut self);
}

/// Authoritative per-connected-client record, exclusively owned by the
/// `Room` it's joined to.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub health: f32,
    pub armor: f32,
    pub is_alive: bool,
    pub current_weapon: Slot,
    pub weapons: HashMap<Slot, WeaponInstance>,
    pub money: i32,
    pub kills: u32,
    pub deaths: u32,
    pub last_input_sequence: u32,
    pub ready: bool,
    pub motion: MotionState,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: Team, money: i32) -> Self {
        let mut weapons = HashMap::new();
        weapons.insert(Slot::Melee, WeaponInstance::fresh(WeaponType::Knife));
        weapons.insert(Slot::Sidearm, WeaponInstance::fresh(WeaponType::Pistol));
        Self {
            id: id.into(),
            name: name.into(),
            team,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            health: 100.0,
            armor: 0.0,
            is_alive: true,
            current_weapon: Slot::Sidearm,
            weapons,
            money,
            kills: 0,
            deaths: 0,
            last_input_sequence: 0,
            ready: false,
            motion: MotionState::default(),
        }
    }

    pub fn respawn(&mut self, position: Vec3, yaw: f32, money: i32) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.yaw = yaw;
        self.pitch = 0.0;
        self.health = 100.0;
        self.armor = 0.0;
        self.is_alive = true;
        self.weapons.clear();
        self.weapons
            .insert(Slot::Melee, WeaponInstance::fresh(WeaponType::Knife));
        self.weapons
            .insert(Slot::Sidearm, WeaponInstance::fresh(WeaponType::Pistol));
        self.current_weapon = Slot::Sidearm;
        self.money = money;
        self.motion = MotionState::default();
    }

    pub fn current_weapon_instance(&self) -> Option<&WeaponInstance> {
        self.weapons.get(&self.current_weapon)
    }

    pub fn current_weapon_instance_mut(&mut self) -> Option<&mut WeaponInstance> {
        self.weapons.get_mut(&self.current_weapon)
    }

    /// Upper ~25% of the capsule counts as a headshot: eye height minus a
    /// 0.2m margin, matching the spec's headshot criterion verbatim.
    pub fn is_headshot_height(&self, hit_y: f32) -> bool {
        hit_y > self.eye_y() - 0.2
    }

    fn eye_y(&self) -> f32 {
        self.position.y
    }
}

impl Combatant for Player {
    fn id(&self) -> &str {
        &self.id
    }
    fn eye_position(&self) -> Vec3 {
        self.position
    }
    fn team(&self) -> Team {
        self.team
    }
    fn is_alive(&self) -> bool {
        self.is_alive
    }
    fn health(&self) -> f32 {
        self.health
    }
    fn armor(&self) -> f32 {
        self.armor
    }
}

/// Armor formula preserved verbatim from the source per SPEC_FULL §9: the
/// residual damage is slightly higher than typical CS-style rules because
/// armor only absorbs half of `min(armor, damage/2)` rather than half of
/// the full hit.
pub fn apply_damage(health: &mut f32, armor: &mut f32, damage: f32) -> f32 {
    let absorbed = armor.min(damage / 2.0);
    let actual = damage - absorbed * 0.5;
    *armor -= absorbed;
    *health -= actual;
    actual
}

impl CombatantMut for Player {
    fn apply_damage(&mut self, raw_damage: f32) -> f32 {
        let actual = apply_damage(&mut self.health, &mut self.armor, raw_damage);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.is_alive = false;
        }
        actual
    }

    fn record_kill(&mut self) {
        self.kills += 1;
    }

    fn record_death(&mut self) {
        self.deaths += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_player_is_alive_with_starting_loadout() {
        let p = Player::new("p1", "Alice", Team::Ct, 800);
        assert!(p.is_alive);
        assert_eq!(p.health, 100.0);
        assert!(p.weapons.contains_key(&Slot::Melee));
        assert!(p.weapons.contains_key(&Slot::Sidearm));
    }

    #[test]
    fn damage_reducing_health_to_zero_kills() {
        let mut p = Player::new("p1", "Alice", Team::Ct, 800);
        p.apply_damage(150.0);
        assert_eq!(p.health, 0.0);
        assert!(!p.is_alive);
    }

    #[test]
    fn armor_formula_matches_spec_verbatim() {
        let mut health = 100.0;
        let mut armor = 50.0;
        let actual = apply_damage(&mut health, &mut armor, 40.0);
        // absorbed = min(50, 20) = 20; actual = 40 - 10 = 30; armor -= 20
        assert_eq!(actual, 30.0);
        assert_eq!(armor, 30.0);
        assert_eq!(health, 70.0);
    }

    #[test]
    fn headshot_sniper_scenario() {
        let mut attacker = Player::new("atk", "A", Team::T, 800);
        attacker.position = Vec3::new(0.0, 1.7, 0.0);
        let mut target = Player::new("tgt", "B", Team::Ct, 800);
        target.position = Vec3::new(0.0, 1.7, 5.0);

        let damage = 115.0 * 2.5;
        let actual = target.apply_damage(damage);
        assert_eq!(actual, damage);
        assert_eq!(target.health, 0.0);
        assert!(!target.is_alive);
    }
}
