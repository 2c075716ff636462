use super::manager::RoomCommand;
use crate::entities::Bot;
use crate::protocol::ServerMsg;
use crate::room::{GameRunner, Phase, Room};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs one room's authoritative loop as a standalone task: drains queued
/// commands, advances physics/AI/phase at the room's tick rate, and
/// broadcasts a snapshot at its (slower) broadcast rate. Exits when the
/// command channel closes, which drops `tx` on the manager side and marks
/// the room for reaping.
pub struct RoomActor {
    room: Room,
    runner: GameRunner,
    rx: mpsc::UnboundedReceiver<RoomCommand>,
    outbound: HashMap<String, mpsc::UnboundedSender<ServerMsg>>,
    player_count: Arc<AtomicUsize>,
    phase: Arc<AtomicU8>,
    start: tokio::time::Instant,
}

impl RoomActor {
    pub fn new(
        room: Room,
        rx: mpsc::UnboundedReceiver<RoomCommand>,
        player_count: Arc<AtomicUsize>,
        phase: Arc<AtomicU8>,
    ) -> Self {
        Self {
            room,
            runner: GameRunner::new(),
            rx,
            outbound: HashMap::new(),
            player_count,
            phase,
            start: tokio::time::Instant::now(),
        }
    }

    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub async fn run(mut self) {
        let tick_dt = self.room.config.tick_dt();
        let mut ticker = tokio::time::interval(Duration::from_secs_f32(tick_dt));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut ticks_since_broadcast = 0u32;
        let ticks_per_broadcast = (self.room.config.tick_rate_hz / self.room.config.broadcast_rate_hz).max(1);

        loop {
            tokio::select! {
                biased;
                cmd = self.rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd),
                        None => {
                            log::info!("room {} command channel closed, shutting down", self.room.id);
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let now = self.now_ms();
                    self.tick(now, tick_dt);
                    ticks_since_broadcast += 1;
                    if ticks_since_broadcast >= ticks_per_broadcast {
                        ticks_since_broadcast = 0;
                        self.broadcast_snapshot(now);
                    }
                    if self.outbound.is_empty() && self.room.phase != Phase::PreMatch {
                        log::info!("room {} emptied out, shutting down", self.room.id);
                        break;
                    }
                }
            }
        }
    }

    fn tick(&mut self, now_ms: f64, dt: f32) {
        self.runner.tick_reloads(&mut self.room, now_ms);
        self.runner.tick_bots(&mut self.room, now_ms, dt);
        if self.runner.tick_phase(&mut self.room, now_ms) {
            self.phase.store(self.room.phase.to_u8(), Ordering::Relaxed);
            self.broadcast_snapshot(now_ms);
        }
    }

    fn broadcast_snapshot(&self, now_ms: f64) {
        let snapshot = self.runner.build_snapshot(&self.room, now_ms);
        let msg = ServerMsg::Snapshot(Box::new(snapshot));
        for tx in self.outbound.values() {
            let _ = tx.send(msg.clone());
        }
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        let now = self.now_ms();
        match cmd {
            RoomCommand::Join { player_id, name, outbound } => {
                if self.room.is_full() {
                    let _ = outbound.send(ServerMsg::Error { message: "room is full".into() });
                    return;
                }
                self.room.add_player(&player_id, name);
                self.outbound.insert(player_id.clone(), outbound.clone());
                self.player_count.store(self.room.player_count(), Ordering::Relaxed);
                let _ = outbound.send(ServerMsg::Joined { player_id, room_id: self.room.id.clone() });
            }
            RoomCommand::Leave { player_id } => self.drop_player(&player_id),
            RoomCommand::Ready { player_id, ready } => {
                if let Some(p) = self.room.players.get_mut(&player_id) {
                    p.ready = ready;
                }
            }
            RoomCommand::ChangeTeam { player_id, team } => {
                if self.room.phase == Phase::PreMatch {
                    if let Some(p) = self.room.players.get_mut(&player_id) {
                        p.team = team;
                    }
                }
            }
            RoomCommand::StartGame { player_id } => {
                if self.room.phase == Phase::PreMatch && self.room.players.contains_key(&player_id) {
                    for p in self.room.players.values_mut() {
                        p.ready = true;
                    }
                }
            }
            RoomCommand::Input { player_id, input } => {
                let tick_dt = self.room.config.tick_dt();
                self.runner.apply_input(&mut self.room, &player_id, &input, tick_dt);
            }
            RoomCommand::Fire { player_id } => {
                self.runner.fire(&mut self.room, &player_id, now);
            }
            RoomCommand::Reload { player_id } => {
                self.runner.start_reload(&mut self.room, &player_id, now);
            }
            RoomCommand::Buy { player_id, weapon_type } => {
                self.runner.buy(&mut self.room, &player_id, weapon_type);
            }
            RoomCommand::SelectWeapon { player_id, slot } => {
                self.runner.select_weapon(&mut self.room, &player_id, slot);
            }
            RoomCommand::DropWeapon { player_id, slot } => {
                self.runner.drop_weapon(&mut self.room, &player_id, slot, now);
            }
            RoomCommand::PickupWeapon { player_id, dropped_id } => {
                self.runner.pickup_weapon(&mut self.room, &player_id, &dropped_id);
            }
            RoomCommand::Chat { player_id, text } => {
                let from = self
                    .room
                    .players
                    .get(&player_id)
                    .map(|p| p.name.clone())
                    .unwrap_or(player_id);
                let msg = ServerMsg::Chat { from, text };
                for tx in self.outbound.values() {
                    let _ = tx.send(msg.clone());
                }
            }
            RoomCommand::AddBot { difficulty } => {
                let team = self.room.smaller_team();
                let bot_id = format!("bot-{}", self.room.bots.len() + 1);
                let bot = Bot::new(bot_id.clone(), format!("Bot {}", self.room.bots.len() + 1), team, difficulty);
                self.room.bots.insert(bot_id, bot);
            }
        }
    }

    fn drop_player(&mut self, player_id: &str) {
        self.room.remove_player(player_id);
        self.outbound.remove(player_id);
        self.player_count.store(self.room.player_count(), Ordering::Relaxed);
    }
}
