use crate::entities::{Input, Team};
use crate::room::RoomConfig;
use crate::weapons::{Slot, WeaponType};
use serde::{Deserialize, Serialize};

/// Inbound client frames. Internally tagged on `type` so the wire form is
/// `{"type": "input", ...}` rather than a bare array/tuple — easier to
/// extend and to read in a packet capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    ListRooms,
    CreateRoom { config: RoomConfig },
    JoinRoom { room_id: Option<String>, name: String },
    Ready { ready: bool },
    ChangeTeam { team: Team },
    StartGame,
    Input(Input),
    Fire,
    Reload,
    Buy { weapon_type: WeaponType },
    SelectWeapon { slot: Slot },
    DropWeapon { slot: Slot },
    PickupWeapon { dropped_id: String },
    Chat { text: String },
    AddBot { difficulty: crate::entities::Difficulty },
    Leave,
}
