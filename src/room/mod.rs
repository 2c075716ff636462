pub mod config;
pub mod phase;
pub mod room;
pub mod runner;

pub use config::{GameMode, RoomConfig};
pub use phase::Phase;
pub use room::Room;
pub use runner::{FireOutcome, GameRunner, Snapshot, JUMP_VELOCITY, PLAYER_EYE_HEIGHT, PLAYER_MOVE_SPEED};
