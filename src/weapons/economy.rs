/// Round/kill money rules. A `Room`'s `RoomConfig` carries one of these;
/// `DEFAULT_ECONOMY_CONFIG` is used unless the room overrides it.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct EconomyConfig {
    pub starting_money: i32,
    pub max_money: i32,
    pub round_win_bonus: i32,
    pub round_lose_bonus: i32,
}

pub const DEFAULT_ECONOMY_CONFIG: EconomyConfig = EconomyConfig {
    starting_money: 800,
    max_money: 16_000,
    round_win_bonus: 3_250,
    round_lose_bonus: 1_400,
};

impl EconomyConfig {
    pub fn clamp_money(&self, money: i32) -> i32 {
        money.clamp(0, self.max_money)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_caps_at_max_money() {
        let econ = DEFAULT_ECONOMY_CONFIG;
        assert_eq!(econ.clamp_money(999_999), econ.max_money);
        assert_eq!(econ.clamp_money(-5), 0);
    }
}
