use serde::{Deserialize, Serialize};

/// Round lifecycle. `PreMatch` is the lobby state where players ready up
/// and pick teams; `Warmup` is a one-time countdown before the first
/// round; every round after that enters `Freeze` directly. Buying is
/// permitted during `Warmup` and `Freeze`; combat input is only applied
/// during `Live`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PreMatch,
    Warmup,
    Freeze,
    Live,
    RoundEnd,
    MatchEnd,
}

impl Phase {
    pub fn allows_buy(&self) -> bool {
        matches!(self, Phase::Warmup | Phase::Freeze)
    }

    pub fn allows_combat_input(&self) -> bool {
        matches!(self, Phase::Live)
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Phase::PreMatch => 0,
            Phase::Warmup => 1,
            Phase::Freeze => 2,
            Phase::Live => 3,
            Phase::RoundEnd => 4,
            Phase::MatchEnd => 5,
        }
    }

    pub fn from_u8(v: u8) -> Phase {
        match v {
            1 => Phase::Warmup,
            2 => Phase::Freeze,
            3 => Phase::Live,
            4 => Phase::RoundEnd,
            5 => Phase::MatchEnd,
            _ => Phase::PreMatch,
        }
    }
}
