use crate::config::ServerConfig;
use crate::entities::{Difficulty, MapData, Team};
use crate::error::SimError;
use crate::protocol::{RoomListEntry, ServerMsg};
use crate::room::{Phase, Room, RoomConfig};
use crate::weapons::{Slot, WeaponType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// One inbound action routed to a room's actor task. Mirrors [`ClientMsg`]
/// one-to-one, plus the plumbing fields (`player_id`, the outbound sender
/// handed over on join) that don't belong on the wire type.
pub enum RoomCommand {
    Join {
        player_id: String,
        name: String,
        outbound: mpsc::UnboundedSender<ServerMsg>,
    },
    Leave {
        player_id: String,
    },
    Ready {
        player_id: String,
        ready: bool,
    },
    ChangeTeam {
        player_id: String,
        team: Team,
    },
    StartGame {
        player_id: String,
    },
    Input {
        player_id: String,
        input: crate::entities::Input,
    },
    Fire {
        player_id: String,
    },
    Reload {
        player_id: String,
    },
    Buy {
        player_id: String,
        weapon_type: WeaponType,
    },
    SelectWeapon {
        player_id: String,
        slot: Slot,
    },
    DropWeapon {
        player_id: String,
        slot: Slot,
    },
    PickupWeapon {
        player_id: String,
        dropped_id: String,
    },
    Chat {
        player_id: String,
        text: String,
    },
    AddBot {
        difficulty: Difficulty,
    },
}

struct RoomHandle {
    tx: mpsc::UnboundedSender<RoomCommand>,
    max_players: usize,
    player_count: Arc<AtomicUsize>,
    phase: Arc<AtomicU8>,
}

/// Owns every room's actor task and routes client actions to the right
/// one. Rooms run independently — nothing here ever reaches into a
/// `Room`'s fields directly; everything crosses a channel.
pub struct RoomManager {
    rooms: RwLock<HashMap<String, RoomHandle>>,
    config: ServerConfig,
    map: MapData,
    next_room_id: AtomicUsize,
}

impl RoomManager {
    pub fn new(config: ServerConfig, map: MapData) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
            map,
            next_room_id: AtomicUsize::new(1),
        }
    }

    pub async fn room_list(&self) -> Vec<RoomListEntry> {
        let rooms = self.rooms.read().await;
        rooms
            .iter()
            .map(|(id, h)| RoomListEntry {
                room_id: id.clone(),
                player_count: h.player_count.load(Ordering::Relaxed),
                max_players: h.max_players,
                phase: Phase::from_u8(h.phase.load(Ordering::Relaxed)),
            })
            .collect()
    }

    /// Finds a non-full room, or creates a fresh one if every existing
    /// room is full (subject to `max_rooms`), and returns its command
    /// channel so the caller can route subsequent actions directly.
    pub async fn join_or_create(&self, requested_room: Option<&str>) -> Result<String, SimError> {
        let rooms = self.rooms.read().await;
        if let Some(id) = requested_room {
            return match rooms.get(id) {
                Some(h) if h.player_count.load(Ordering::Relaxed) < h.max_players => Ok(id.to_string()),
                Some(_) => Err(SimError::RoomFull(id.to_string())),
                None => Err(SimError::RoomNotFound(id.to_string())),
            };
        }
        if let Some((id, _)) = rooms
            .iter()
            .find(|(_, h)| h.player_count.load(Ordering::Relaxed) < h.max_players)
        {
            return Ok(id.clone());
        }
        drop(rooms);
        self.create_room(None).await
    }

    /// Creates a fresh room. `override_config`, when supplied by a
    /// client's `create_room` request, replaces the server-derived
    /// defaults wholesale except for the operator-fixed rate/capacity
    /// fields, which always come from `ServerConfig`.
    pub async fn create_room(&self, override_config: Option<RoomConfig>) -> Result<String, SimError> {
        let mut rooms = self.rooms.write().await;
        if rooms.len() >= self.config.max_rooms {
            return Err(SimError::ServerFull(self.config.max_rooms));
        }
        let id = format!("room-{}", self.next_room_id.fetch_add(1, Ordering::Relaxed));
        let room_config = RoomConfig {
            tick_rate_hz: self.config.tick_rate_hz,
            broadcast_rate_hz: self.config.broadcast_rate_hz,
            max_players: self.config.max_players_per_room,
            ..override_config.unwrap_or_default()
        };
        let room = Room::new(id.clone(), room_config, self.map.clone());
        let player_count = Arc::new(AtomicUsize::new(0));
        let phase = Arc::new(AtomicU8::new(Phase::PreMatch.to_u8()));
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = super::actor::RoomActor::new(room, rx, player_count.clone(), phase.clone());
        tokio::spawn(actor.run());

        rooms.insert(
            id.clone(),
            RoomHandle {
                tx,
                max_players: self.config.max_players_per_room,
                player_count,
                phase,
            },
        );
        log::info!("created room {id}");
        Ok(id)
    }

    pub async fn send(&self, room_id: &str, cmd: RoomCommand) -> Result<(), SimError> {
        let rooms = self.rooms.read().await;
        let handle = rooms
            .get(room_id)
            .ok_or_else(|| SimError::RoomNotFound(room_id.to_string()))?;
        handle
            .tx
            .send(cmd)
            .map_err(|_| SimError::RoomNotFound(room_id.to_string()))
    }

    /// Drops rooms whose actor task has exited (its `tx` channel is
    /// closed). Called periodically by the server harness, not on every
    /// disconnect, since a room that just emptied out may fill back up.
    pub async fn sweep_closed_rooms(&self) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|id, h| {
            let alive = !h.tx.is_closed();
            if !alive {
                log::info!("reaping closed room {id}");
            }
            alive
        });
    }
}
