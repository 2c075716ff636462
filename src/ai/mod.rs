pub mod brain;
pub mod config;

pub use brain::{think, BotIntent, VisibleCombatant};
pub use config::{ai_config, AiConfig, MAX_LOS_DISTANCE, THINK_INTERVAL_MS};
