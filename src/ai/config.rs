use crate::entities::Difficulty;

/// Tunables that scale bot competence by difficulty tier.
#[derive(Debug, Clone, Copy)]
pub struct AiConfig {
    pub reaction_time_ms: f64,
    pub accuracy: f32,
    pub aggressiveness: f32,
    pub fov_deg: f32,
    pub sight_range: f32,
}

/// Every bot re-evaluates its FSM at this fixed cadence regardless of
/// difficulty; continuous motion between think ticks reuses the cached
/// move target from the last decision.
pub const THINK_INTERVAL_MS: f64 = 100.0;

/// Beyond this range, a line-of-sight ray query is skipped during target
/// acquisition and the FOV test alone decides visibility.
pub const MAX_LOS_DISTANCE: f32 = 40.0;

pub fn ai_config(difficulty: Difficulty) -> AiConfig {
    match difficulty {
        Difficulty::Easy => AiConfig {
            reaction_time_ms: 500.0,
            accuracy: 0.3,
            aggressiveness: 0.3,
            fov_deg: 90.0,
            sight_range: 30.0,
        },
        Difficulty::Medium => AiConfig {
            reaction_time_ms: 300.0,
            accuracy: 0.6,
            aggressiveness: 0.6,
            fov_deg: 110.0,
            sight_range: 50.0,
        },
        Difficulty::Hard => AiConfig {
            reaction_time_ms: 150.0,
            accuracy: 0.85,
            aggressiveness: 0.8,
            fov_deg: 130.0,
            sight_range: 70.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_is_strictly_more_capable_than_easy() {
        let easy = ai_config(Difficulty::Easy);
        let hard = ai_config(Difficulty::Hard);
        assert!(hard.accuracy > easy.accuracy);
        assert!(hard.reaction_time_ms < easy.reaction_time_ms);
        assert!(hard.sight_range > easy.sight_range);
    }
}
