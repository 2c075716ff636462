use crate::entities::player::{Combatant, CombatantMut, Player, Team};
use crate::math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotState {
    Idle,
    Patrol,
    Chase,
    Attack,
    Flee,
    Dead,
}

/// A bot "is a" player with AI bolted on, per the source's inheritance
/// relationship, but composition replaces inheritance: `base` carries
/// everything a human-controlled participant has, and the AI fields live
/// alongside it rather than inside it.
#[derive(Debug, Clone)]
pub struct Bot {
    pub base: Player,
    pub difficulty: Difficulty,
    pub state: BotState,
    pub target_id: Option<String>,
    pub patrol_target: Option<Vec3>,
    pub last_decision_time: f64,
    pub last_known_target_pos: Option<Vec3>,
    /// When the current `state` was entered; drives the time-based
    /// transitions (idle→attack after reactionTime, flee→patrol after 3s, …).
    pub state_entered_at: f64,
    /// When a target was last actually seen (in LOS and in FOV), distinct
    /// from `last_decision_time`; drives the "remembered target" windows.
    pub last_seen_target_at: f64,
    /// Bot-specific fire cooldown, layered on top of the weapon's own
    /// fire-rate limit to simulate reaction overhead between shots.
    pub next_fire_time: f64,
}

impl Bot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: Team, difficulty: Difficulty) -> Self {
        Self {
            base: Player::new(id, name, team, 0),
            difficulty,
            state: BotState::Idle,
            target_id: None,
            patrol_target: None,
            last_decision_time: 0.0,
            last_known_target_pos: None,
            state_entered_at: 0.0,
            last_seen_target_at: f64::NEG_INFINITY,
            next_fire_time: 0.0,
        }
    }

    pub fn forget_target(&mut self) {
        self.target_id = None;
        self.last_known_target_pos = None;
        self.state = BotState::Idle;
    }
}

impl Combatant for Bot {
    fn id(&self) -> &str {
        self.base.id()
    }
    fn eye_position(&self) -> Vec3 {
        self.base.eye_position()
    }
    fn team(&self) -> Team {
        self.base.team()
    }
    fn is_alive(&self) -> bool {
        self.base.is_alive()
    }
    fn health(&self) -> f32 {
        self.base.health()
    }
    fn armor(&self) -> f32 {
        self.base.armor()
    }
}

impl CombatantMut for Bot {
    fn apply_damage(&mut self, raw_damage: f32) -> f32 {
        let actual = self.base.apply_damage(raw_damage);
        if !self.base.is_alive {
            self.state = BotState::Dead;
        }
        actual
    }

    fn record_kill(&mut self) {
        self.base.record_kill();
    }

    fn record_death(&mut self) {
        self.base.record_death();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_starts_idle_and_alive() {
        let b = Bot::new("bot1", "Bot Alice", Team::T, Difficulty::Medium);
        assert_eq!(b.state, BotState::Idle);
        assert!(b.is_alive());
    }

    #[test]
    fn lethal_damage_transitions_to_dead_state() {
        let mut b = Bot::new("bot1", "Bot Alice", Team::T, Difficulty::Hard);
        b.apply_damage(500.0);
        assert_eq!(b.state, BotState::Dead);
        assert!(!b.is_alive());
    }

    #[test]
    fn forget_target_resets_to_idle() {
        let mut b = Bot::new("bot1", "Bot Alice", Team::T, Difficulty::Easy);
        b.target_id = Some("p1".into());
        b.state = BotState::Chase;
        b.forget_target();
        assert!(b.target_id.is_none());
        assert_eq!(b.state, BotState::Idle);
    }
}
