//! Periodic position emission.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::generator::PositionGenerator;
use super::hub::PositionHub;

/// Spawns a task publishing one generated position per `interval`.
///
/// Ticks with no registered subscriber are skipped.
pub fn spawn_ticker(
    hub: Arc<PositionHub>,
    generator: Arc<dyn PositionGenerator>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if hub.connection_count() == 0 {
                continue;
            }
            let position = generator.generate();
            let reached = hub.publish_position(&position);
            tracing::trace!(x = position.x, y = position.y, reached, "position published");
        }
    })
}
