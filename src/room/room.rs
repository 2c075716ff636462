use crate::entities::{Bot, DroppedWeapon, MapData, Player, SpawnTeam, Team};
use crate::los::LosPool;
use crate::room::config::RoomConfig;
use crate::room::phase::Phase;
use std::collections::HashMap;

/// A single in-progress match. Owned exclusively by its `GameRunner` task;
/// nothing outside the room's own tick loop ever mutates it, which is what
/// lets the server run many rooms concurrently without locking.
pub struct Room {
    pub id: String,
    pub config: RoomConfig,
    pub map: MapData,
    pub phase: Phase,
    pub phase_started_at_ms: f64,
    pub round_number: u32,
    pub score_t: u32,
    pub score_ct: u32,
    pub players: HashMap<String, Player>,
    pub bots: HashMap<String, Bot>,
    pub dropped_weapons: Vec<DroppedWeapon>,
    pub los_pool: LosPool,
}

impl Room {
    pub fn new(id: impl Into<String>, config: RoomConfig, map: MapData) -> Self {
        let los_pool = LosPool::new(map.mesh.clone());
        Self {
            id: id.into(),
            config,
            map,
            phase: Phase::PreMatch,
            phase_started_at_ms: 0.0,
            round_number: 0,
            score_t: 0,
            score_ct: 0,
            players: HashMap::new(),
            bots: HashMap::new(),
            dropped_weapons: Vec::new(),
            los_pool,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len() + self.bots.len()
    }

    pub fn is_full(&self) -> bool {
        self.player_count() >= self.config.max_players
    }

    pub fn smaller_team(&self) -> Team {
        let t_count = self
            .players
            .values()
            .filter(|p| p.team == Team::T)
            .count()
            + self.bots.values().filter(|b| b.base.team == Team::T).count();
        let ct_count = self
            .players
            .values()
            .filter(|p| p.team == Team::Ct)
            .count()
            + self
                .bots
                .values()
                .filter(|b| b.base.team == Team::Ct)
                .count();
        if t_count <= ct_count {
            Team::T
        } else {
            Team::Ct
        }
    }

    pub fn add_player(&mut self, id: impl Into<String>, name: impl Into<String>) -> &mut Player {
        let team = self.smaller_team();
        let id = id.into();
        let money = self.config.economy.starting_money;
        let player = Player::new(id.clone(), name, team, money);
        self.players.entry(id.clone()).or_insert(player);
        self.players.get_mut(&id).unwrap()
    }

    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn alive_count(&self, team: Team) -> usize {
        let p = self
            .players
            .values()
            .filter(|p| p.team == team && p.is_alive)
            .count();
        let b = self
            .bots
            .values()
            .filter(|b| b.base.team == team && b.base.is_alive)
            .count();
        p + b
    }

    pub fn spawn_team(&self, team: Team) -> SpawnTeam {
        match team {
            Team::T => SpawnTeam::T,
            Team::Ct => SpawnTeam::Ct,
            Team::Spectator => SpawnTeam::Dm,
        }
    }

    pub fn all_ready(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MapBounds, SpawnPoint};
    use crate::math::Vec3;

    fn test_map() -> MapData {
        MapData::load(
            MapBounds {
                min: Vec3::new(-50.0, 0.0, -50.0),
                max: Vec3::new(50.0, 10.0, 50.0),
            },
            vec![SpawnPoint {
                position: Vec3::new(0.0, 1.0, 0.0),
                yaw: 0.0,
                team: SpawnTeam::T,
            }],
            &[],
        )
    }

    #[test]
    fn new_players_balance_teams() {
        let mut room = Room::new("r1", RoomConfig::default(), test_map());
        room.add_player("p1", "Alice");
        room.add_player("p2", "Bob");
        let teams: Vec<Team> = room.players.values().map(|p| p.team).collect();
        assert_ne!(teams[0], teams[1]);
    }

    #[test]
    fn all_ready_requires_non_empty_roster() {
        let room = Room::new("r1", RoomConfig::default(), test_map());
        assert!(!room.all_ready());
    }
}
