mod actor;
mod manager;

pub use manager::{RoomCommand, RoomManager};
