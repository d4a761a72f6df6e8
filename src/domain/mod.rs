//! Domain layer: position, connectivity state, store, and event system.
//!
//! This module contains the client-side domain model: the tracked
//! [`Position`], the session [`ConnectionState`], the single-writer
//! [`PositionStore`] and the [`EventBus`] used to notify observers.

pub mod connection_id;
pub mod connection_state;
pub mod event_bus;
pub mod position;
pub mod position_store;
pub mod tracker_event;

pub use connection_id::ConnectionId;
pub use connection_state::ConnectionState;
pub use event_bus::EventBus;
pub use position::Position;
pub use position_store::{PositionStore, TrackerSnapshot};
pub use tracker_event::TrackerEvent;
