use crate::room::Snapshot;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RoomListEntry {
    pub room_id: String,
    pub player_count: usize,
    pub max_players: usize,
    pub phase: crate::room::Phase,
}

/// Outbound server frames, tagged the same way as [`ClientMsg`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Joined { player_id: String, room_id: String },
    RoomList { rooms: Vec<RoomListEntry> },
    Snapshot(Box<Snapshot>),
    InputAck { sequence: u32, position: crate::math::Vec3 },
    Chat { from: String, text: String },
    Error { message: String },
    KickedFromRoom { reason: String },
}
