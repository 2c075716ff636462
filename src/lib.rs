pub mod ai;
pub mod config;
pub mod entities;
pub mod error;
pub mod manager;
pub mod math;
pub mod mesh;
pub mod net;
pub mod physics;
pub mod protocol;
pub mod room;
pub mod weapons;
pub mod los;

/// Initializes combined terminal + file logging, matching the format and
/// log levels used across the rest of the stack: `Info` and above on the
/// terminal, `Debug` and above to a timestamped file under `logs/`.
pub fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log")).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Waits for Ctrl-C, then gives in-flight room actors a fixed window to
/// finish their current tick and flush outbound snapshots before the
/// process exits.
pub async fn wait_for_shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
    log::warn!("shutdown requested, draining rooms for {:?}", DRAIN_WINDOW);
    tokio::time::sleep(DRAIN_WINDOW).await;
}

pub const DRAIN_WINDOW: std::time::Duration = std::time::Duration::from_secs(5);
