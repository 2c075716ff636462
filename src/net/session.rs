use crate::entities::Team;
use crate::manager::{RoomCommand, RoomManager};
use crate::protocol::{ClientMsg, RoomListEntry, ServerMsg};
use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use tokio::sync::mpsc;

/// Upgrades the connection and spawns the bridge task. One WS connection
/// maps to at most one room membership at a time; `JoinRoom` establishes
/// it, `Leave`/disconnect tears it down.
pub async fn ws_entry(
    req: HttpRequest,
    body: web::Payload,
    manager: web::Data<RoomManager>,
) -> actix_web::Result<HttpResponse> {
    let (response, session, stream) = actix_ws::handle(&req, body)?;
    actix_web::rt::spawn(bridge(manager.into_inner(), session, stream));
    Ok(response)
}

async fn bridge(
    manager: std::sync::Arc<RoomManager>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerMsg>();
    let mut joined: Option<(String, String)> = None; // (room_id, player_id)

    'sesh: loop {
        tokio::select! {
            biased;
            outgoing = out_rx.recv() => match outgoing {
                Some(msg) => {
                    let json = match serde_json::to_string(&msg) {
                        Ok(j) => j,
                        Err(e) => { log::warn!("failed to serialize outbound frame: {e}"); continue 'sesh; }
                    };
                    if session.text(json).await.is_err() {
                        break 'sesh;
                    }
                }
                None => break 'sesh,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(actix_ws::Message::Text(text))) => {
                    handle_client_text(&manager, &mut joined, &out_tx, &text).await;
                }
                Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break 'sesh;
                    }
                }
                Some(Err(_)) | None => break 'sesh,
                _ => continue 'sesh,
            },
        }
    }

    if let Some((room_id, player_id)) = joined {
        let _ = manager.send(&room_id, RoomCommand::Leave { player_id }).await;
    }
}

async fn handle_client_text(
    manager: &RoomManager,
    joined: &mut Option<(String, String)>,
    out_tx: &mpsc::UnboundedSender<ServerMsg>,
    text: &str,
) {
    let msg: ClientMsg = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            let _ = out_tx.send(ServerMsg::Error { message: format!("bad frame: {e}") });
            return;
        }
    };

    match msg {
        ClientMsg::ListRooms => {
            let rooms: Vec<RoomListEntry> = manager.room_list().await;
            let _ = out_tx.send(ServerMsg::RoomList { rooms });
        }
        ClientMsg::CreateRoom { config } => match manager.create_room(Some(config)).await {
            Ok(_) => {
                let rooms = manager.room_list().await;
                let _ = out_tx.send(ServerMsg::RoomList { rooms });
            }
            Err(e) => {
                let _ = out_tx.send(ServerMsg::Error { message: e.to_string() });
            }
        },
        ClientMsg::JoinRoom { room_id, name } => {
            if joined.is_some() {
                let _ = out_tx.send(ServerMsg::Error { message: "already joined a room".into() });
                return;
            }
            match manager.join_or_create(room_id.as_deref()).await {
                Ok(room_id) => {
                    let player_id = uuid_like();
                    let cmd = RoomCommand::Join {
                        player_id: player_id.clone(),
                        name,
                        outbound: out_tx.clone(),
                    };
                    if manager.send(&room_id, cmd).await.is_ok() {
                        *joined = Some((room_id, player_id));
                    }
                }
                Err(e) => {
                    let _ = out_tx.send(ServerMsg::Error { message: e.to_string() });
                }
            }
        }
        other => {
            let Some((room_id, player_id)) = joined.clone() else {
                let _ = out_tx.send(ServerMsg::Error { message: "join a room first".into() });
                return;
            };
            route_in_room(manager, &room_id, &player_id, other, out_tx).await;
        }
    }
}

async fn route_in_room(
    manager: &RoomManager,
    room_id: &str,
    player_id: &str,
    msg: ClientMsg,
    out_tx: &mpsc::UnboundedSender<ServerMsg>,
) {
    let cmd = match msg {
        ClientMsg::ListRooms | ClientMsg::CreateRoom { .. } | ClientMsg::JoinRoom { .. } => return,
        ClientMsg::Ready { ready } => RoomCommand::Ready { player_id: player_id.to_string(), ready },
        ClientMsg::ChangeTeam { team } => change_team_cmd(player_id, team),
        ClientMsg::StartGame => RoomCommand::StartGame { player_id: player_id.to_string() },
        ClientMsg::Input(input) => RoomCommand::Input { player_id: player_id.to_string(), input },
        ClientMsg::Fire => RoomCommand::Fire { player_id: player_id.to_string() },
        ClientMsg::Reload => RoomCommand::Reload { player_id: player_id.to_string() },
        ClientMsg::Buy { weapon_type } => RoomCommand::Buy { player_id: player_id.to_string(), weapon_type },
        ClientMsg::SelectWeapon { slot } => RoomCommand::SelectWeapon { player_id: player_id.to_string(), slot },
        ClientMsg::DropWeapon { slot } => RoomCommand::DropWeapon { player_id: player_id.to_string(), slot },
        ClientMsg::PickupWeapon { dropped_id } => {
            RoomCommand::PickupWeapon { player_id: player_id.to_string(), dropped_id }
        }
        ClientMsg::Chat { text } => RoomCommand::Chat { player_id: player_id.to_string(), text },
        ClientMsg::AddBot { difficulty } => RoomCommand::AddBot { difficulty },
        ClientMsg::Leave => RoomCommand::Leave { player_id: player_id.to_string() },
    };
    if let Err(e) = manager.send(room_id, cmd).await {
        let _ = out_tx.send(ServerMsg::Error { message: e.to_string() });
    }
}

fn change_team_cmd(player_id: &str, team: Team) -> RoomCommand {
    RoomCommand::ChangeTeam { player_id: player_id.to_string(), team }
}

/// Session-scoped player id. Not cryptographically unique, only unique
/// enough to distinguish concurrent connections to the same room; good
/// enough since it never crosses a trust boundary by itself.
fn uuid_like() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("p-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}
