//! Tracker service: routes session notifications into the store and
//! re-evaluates containment.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{EventBus, Position, PositionStore, TrackerEvent, TrackerSnapshot};
use crate::error::{DecodeError, TrackerError};
use crate::geometry::ContainmentEngine;
use crate::ws::SessionObserver;

/// Single writer of the [`PositionStore`].
///
/// Installed as the [`SessionObserver`] of a
/// [`crate::ws::ConnectionManager`]. Every notification follows the
/// pattern: update store → derive containment → emit event.
#[derive(Debug, Clone)]
pub struct TrackerService {
    store: Arc<PositionStore>,
    engine: ContainmentEngine,
    event_bus: EventBus,
}

impl TrackerService {
    /// Creates a new `TrackerService`.
    #[must_use]
    pub fn new(store: Arc<PositionStore>, engine: ContainmentEngine, event_bus: EventBus) -> Self {
        Self {
            store,
            engine,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`PositionStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<PositionStore> {
        &self.store
    }

    /// Returns a copy of the current store contents.
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.store.snapshot()
    }

    /// Evaluates containment of the stored position against the current
    /// geometry. `None` until a position has been accepted.
    #[must_use]
    pub fn containment(&self) -> Option<bool> {
        self.store
            .position()
            .map(|position| self.engine.contains(&position))
    }
}

impl SessionObserver for TrackerService {
    fn on_connectivity(&self, connected: bool) {
        self.store.set_connected(connected);
        let _ = self.event_bus.publish(TrackerEvent::ConnectivityChanged {
            connected,
            timestamp: Utc::now(),
        });
    }

    fn on_position(&self, position: Position) {
        self.store.update(position);
        let shape = self.engine.locate_id(&position);
        tracing::debug!(
            x = position.x,
            y = position.y,
            shape = shape.as_deref().unwrap_or("-"),
            "position accepted"
        );
        let _ = self.event_bus.publish(TrackerEvent::PositionUpdated {
            position,
            contained: shape.is_some(),
            timestamp: Utc::now(),
        });
    }

    fn on_decode_error(&self, error: &DecodeError) {
        let message = format!("malformed message: {error}");
        self.store.set_error(message.clone());
        let _ = self.event_bus.publish(TrackerEvent::DecodeFailed {
            message,
            timestamp: Utc::now(),
        });
    }

    fn on_session_error(&self, error: &TrackerError) {
        let message = error.to_string();
        self.store.set_error(message.clone());
        let _ = self.event_bus.publish(TrackerEvent::SessionFailed {
            message,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::ConnectionState;
    use crate::geometry::{
        FillRule, GeometryHandle, Point, PolygonBoundary, Shape, Viewport,
    };
    use crate::ws::transport::scripted::ScriptedTransport;
    use crate::ws::{ConnectionManager, MessageDecoder};

    fn boundary() -> GeometryHandle {
        let square = Shape::new(
            "zone",
            FillRule::NonZero,
            vec![vec![
                Point::new(0.0, 0.0),
                Point::new(5.0, 0.0),
                Point::new(5.0, 5.0),
                Point::new(0.0, 5.0),
            ]],
        );
        let Ok(boundary) = PolygonBoundary::new(Viewport::new(10.0, 10.0), vec![square]) else {
            panic!("valid boundary");
        };
        GeometryHandle::with_geometry(Arc::new(boundary))
    }

    fn make_service(geometry: GeometryHandle) -> TrackerService {
        TrackerService::new(
            Arc::new(PositionStore::new()),
            ContainmentEngine::new(geometry, 100.0),
            EventBus::new(64),
        )
    }

    #[tokio::test]
    async fn position_emits_event_with_containment() {
        let service = make_service(boundary());
        let mut rx = service.event_bus().subscribe();

        service.on_position(Position::new(20.0, 30.0, 1000.0));

        let Ok(TrackerEvent::PositionUpdated {
            position,
            contained,
            ..
        }) = rx.recv().await
        else {
            panic!("expected position event");
        };
        assert_eq!(position, Position::new(20.0, 30.0, 1000.0));
        assert!(contained);
        assert_eq!(service.containment(), Some(true));
    }

    #[test]
    fn containment_follows_latest_position() {
        let service = make_service(boundary());
        assert_eq!(service.containment(), None);

        service.on_position(Position::new(20.0, 30.0, 1.0));
        assert_eq!(service.containment(), Some(true));
        assert_eq!(service.containment(), Some(true));

        service.on_position(Position::new(80.0, 80.0, 2.0));
        assert_eq!(service.containment(), Some(false));
    }

    #[test]
    fn containment_is_false_without_geometry() {
        let service = make_service(GeometryHandle::unavailable());
        service.on_position(Position::new(20.0, 30.0, 1.0));
        assert_eq!(service.containment(), Some(false));
    }

    #[test]
    fn errors_are_recorded_and_cleared_on_connect() {
        let service = make_service(boundary());
        service.on_decode_error(&DecodeError::MissingEvent);
        assert_eq!(
            service.snapshot().last_error.as_deref(),
            Some("malformed message: missing event field")
        );

        service.on_session_error(&TrackerError::Construction("refused".to_string()));
        assert!(service.snapshot().last_error.is_some());

        service.on_connectivity(true);
        let snap = service.snapshot();
        assert!(snap.connected);
        assert_eq!(snap.last_error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn connected_then_position_flows_into_store() {
        let service = make_service(boundary());
        let mut rx = service.event_bus().subscribe();
        let observer: Arc<dyn SessionObserver> = Arc::new(service.clone());
        let mgr = ConnectionManager::new(
            ScriptedTransport::new(),
            "ws://tracker.test/ws",
            Duration::from_secs(5),
            MessageDecoder::new(100.0),
            observer,
        );
        let frames = mgr.transport().accept();

        assert!(mgr.start().is_ok());
        assert!(
            frames
                .send(Ok(r#"{"event":"connected","data":{"message":"ok"}}"#.to_string()))
                .is_ok()
        );
        tokio::time::sleep(Duration::from_millis(1)).await;

        let snap = service.snapshot();
        assert_eq!(mgr.state(), ConnectionState::Open);
        assert!(snap.connected);
        assert_eq!(snap.position, None);

        assert!(
            frames
                .send(Ok(
                    r#"{"event":"position_update","data":{"x":20,"y":30,"timestamp":1000}}"#
                        .to_string()
                ))
                .is_ok()
        );
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(
            service.snapshot().position,
            Some(Position::new(20.0, 30.0, 1000.0))
        );
        assert_eq!(service.containment(), Some(true));

        let Ok(first) = rx.recv().await else {
            panic!("expected connectivity event");
        };
        assert_eq!(first.event_type_str(), "connectivity_changed");
        let Ok(second) = rx.recv().await else {
            panic!("expected position event");
        };
        assert_eq!(second.event_type_str(), "position_updated");
    }
}
