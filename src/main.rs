//! locater - device location resolution service
//!
//! Composition root: loads configuration, sets up logging and runs the
//! resolution server until a shutdown signal arrives.

use locater::config::load_config;
use locater::infrastructure::{shutdown_signal, ShutdownController};
use locater::ResolutionServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    tracing::info!(
        "starting locater store={} trigger_interval={}s",
        cfg.store_addr,
        cfg.trigger_interval_secs
    );

    let controller = ShutdownController::new();
    let token = controller.token();
    tokio::spawn(shutdown_signal(controller));

    ResolutionServer::start(&cfg, token).await
}
