use crate::config::ServerConfig;
use crate::manager::RoomManager;
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(config: ServerConfig, manager: Arc<RoomManager>) -> std::io::Result<()> {
        let bind_addr = config.bind_addr;
        let data = web::Data::from(manager);
        log::info!("starting arena server on {bind_addr}");

        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
                .app_data(data.clone())
                .route("/ws", web::get().to(super::session::ws_entry))
                .route("/rooms", web::get().to(room_list))
                .route("/healthz", web::get().to(health))
        })
        .bind(bind_addr)?
        .run()
        .await
    }
}

async fn room_list(manager: web::Data<RoomManager>) -> impl Responder {
    let rooms = manager.room_list().await;
    HttpResponse::Ok().json(serde_json::json!({ "rooms": rooms }))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}
