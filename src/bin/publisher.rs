//! Development position publisher.
//!
//! Serves `GET /api/ws/robot` with a simulated agent wandering over the
//! configured bounds.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use geofence_tracker::app_state::PublisherState;
use geofence_tracker::config::PublisherConfig;
use geofence_tracker::publisher::{PositionHub, RandomGenerator, build_app, spawn_ticker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = PublisherConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting position-publisher");

    let hub = Arc::new(PositionHub::new(config.channel_capacity));
    let _ticker = spawn_ticker(
        Arc::clone(&hub),
        Arc::new(RandomGenerator::from_config(&config)),
        config.update_interval,
    );

    let app = build_app(PublisherState::new(hub));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
