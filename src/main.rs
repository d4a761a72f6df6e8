//! geofence-tracker entry point.
//!
//! Connects to the position publisher, keeps the session alive and logs
//! connectivity, position and containment as they change.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use geofence_tracker::config::{LogFormat, TrackerConfig};
use geofence_tracker::domain::{EventBus, PositionStore, TrackerEvent};
use geofence_tracker::geometry::{ContainmentEngine, GeometryHandle};
use geofence_tracker::service::TrackerService;
use geofence_tracker::ws::{ConnectionManager, SessionObserver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = TrackerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(endpoint = %config.endpoint, "starting geofence-tracker");

    // Boundary geometry arrives in the background
    let geometry = GeometryHandle::unavailable();
    let _loader = geometry.spawn_load(config.geometry_path.clone());

    // Build service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let service = TrackerService::new(
        Arc::new(PositionStore::new()),
        ContainmentEngine::new(geometry, config.coord_max),
        event_bus.clone(),
    );
    let observer: Arc<dyn SessionObserver> = Arc::new(service);

    // Presentation: log every tracker event
    let mut events = event_bus.subscribe();
    let presenter = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => present(&event),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "presenter lagged behind tracker events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Start the session
    let manager = ConnectionManager::from_config(&config, observer);
    manager.start()?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    manager.stop();
    presenter.abort();

    Ok(())
}

fn present(event: &TrackerEvent) {
    match event {
        TrackerEvent::ConnectivityChanged { connected, .. } => {
            tracing::info!(connected, "connectivity changed");
        }
        TrackerEvent::PositionUpdated {
            position,
            contained,
            ..
        } => {
            tracing::info!(
                x = position.x,
                y = position.y,
                timestamp = position.timestamp,
                inside = contained,
                "position"
            );
        }
        TrackerEvent::DecodeFailed { message, .. } => {
            tracing::warn!(%message, "bad frame");
        }
        TrackerEvent::SessionFailed { message, .. } => {
            tracing::warn!(%message, "session failed");
        }
    }
}
