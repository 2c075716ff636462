use arenafps::config::ServerConfig;
use arenafps::entities::{MapBounds, MapData, SpawnPoint, SpawnTeam};
use arenafps::manager::RoomManager;
use arenafps::math::Vec3;
use arenafps::net::Server;
use std::sync::Arc;

/// Built-in demo arena: a flat floor bounded by low walls, with T/CT
/// spawn points at opposite ends. Loading maps from an external format is
/// out of scope; this is the only map the server currently ships.
fn demo_map() -> MapData {
    let half = 40.0;
    let wall_height = 4.0;
    let mut triangles = vec![
        // floor
        (
            Vec3::new(-half, 0.0, -half),
            Vec3::new(half, 0.0, -half),
            Vec3::new(-half, 0.0, half),
        ),
        (
            Vec3::new(half, 0.0, -half),
            Vec3::new(half, 0.0, half),
            Vec3::new(-half, 0.0, half),
        ),
    ];
    // perimeter walls, one quad per side
    let corners = [
        (Vec3::new(-half, 0.0, -half), Vec3::new(half, 0.0, -half)),
        (Vec3::new(half, 0.0, -half), Vec3::new(half, 0.0, half)),
        (Vec3::new(half, 0.0, half), Vec3::new(-half, 0.0, half)),
        (Vec3::new(-half, 0.0, half), Vec3::new(-half, 0.0, -half)),
    ];
    for (a, b) in corners {
        let a_top = a.with_y(wall_height);
        let b_top = b.with_y(wall_height);
        triangles.push((a, b, a_top));
        triangles.push((b, b_top, a_top));
    }

    let spawn_points = vec![
        SpawnPoint { position: Vec3::new(-half + 5.0, 0.0, 0.0), yaw: std::f32::consts::FRAC_PI_2, team: SpawnTeam::T },
        SpawnPoint { position: Vec3::new(-half + 5.0, 0.0, 10.0), yaw: std::f32::consts::FRAC_PI_2, team: SpawnTeam::T },
        SpawnPoint { position: Vec3::new(half - 5.0, 0.0, 0.0), yaw: -std::f32::consts::FRAC_PI_2, team: SpawnTeam::Ct },
        SpawnPoint { position: Vec3::new(half - 5.0, 0.0, 10.0), yaw: -std::f32::consts::FRAC_PI_2, team: SpawnTeam::Ct },
    ];

    MapData::load(
        MapBounds { min: Vec3::new(-half, 0.0, -half), max: Vec3::new(half, wall_height, half) },
        spawn_points,
        &triangles,
    )
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    arenafps::init_logging();
    let config = ServerConfig::from_env()?;
    log::info!("config: {config:?}");

    let manager = Arc::new(RoomManager::new(config.clone(), demo_map()));
    let sweep_handle = {
        let manager = manager.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
            loop {
                interval.tick().await;
                manager.sweep_closed_rooms().await;
            }
        })
    };

    tokio::select! {
        result = Server::run(config, manager) => {
            result?;
        }
        _ = arenafps::wait_for_shutdown_signal() => {
            log::info!("shut down cleanly");
        }
    }

    sweep_handle.abort();
    Ok(())
}
