use crate::weapons::{EconomyConfig, DEFAULT_ECONOMY_CONFIG};
use serde::{Deserialize, Serialize};

/// Team mode pits T against CT; deathmatch is every player for themselves
/// with a shorter freeze time and a higher rounds-to-win target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Competitive,
    Deathmatch,
}

impl GameMode {
    /// Targeting scope for bot AI: team mode only considers the other
    /// team an enemy, deathmatch considers everyone else an enemy.
    pub fn is_team_based(&self) -> bool {
        matches!(self, GameMode::Competitive)
    }
}

/// Per-room tunables set at creation time; immutable for the room's
/// lifetime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomConfig {
    pub tick_rate_hz: u32,
    pub broadcast_rate_hz: u32,
    pub max_players: usize,
    pub mode: GameMode,
    pub warmup_time_secs: u32,
    pub freeze_time_secs: u32,
    pub round_time_secs: u32,
    pub round_end_delay_secs: u32,
    pub rounds_to_win: u32,
    pub economy: EconomyConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            broadcast_rate_hz: 20,
            max_players: 10,
            mode: GameMode::Competitive,
            warmup_time_secs: 5,
            freeze_time_secs: 15,
            round_time_secs: 120,
            round_end_delay_secs: 3,
            rounds_to_win: 7,
            economy: DEFAULT_ECONOMY_CONFIG,
        }
    }
}

impl RoomConfig {
    /// Builds a default config for `mode`, with freeze time and
    /// rounds-to-win set to that mode's literal values (competitive: 15s/7,
    /// deathmatch: 5s/10).
    pub fn new(mode: GameMode) -> Self {
        let (freeze_time_secs, rounds_to_win) = match mode {
            GameMode::Competitive => (15, 7),
            GameMode::Deathmatch => (5, 10),
        };
        Self { mode, freeze_time_secs, rounds_to_win, ..Self::default() }
    }

    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz as f32
    }

    pub fn broadcast_interval_ms(&self) -> f64 {
        1000.0 / self.broadcast_rate_hz as f64
    }
}
