//! # geofence-tracker
//!
//! Streams the live location of a single tracked agent over a persistent
//! WebSocket session and decides whether it currently lies inside a fixed
//! boundary made of vector shapes.
//!
//! The session recovers by itself: any failure to connect, transport error
//! or peer close schedules exactly one reconnect after a fixed delay, until
//! [`ws::ConnectionManager::stop`] is called.
//!
//! ## Architecture
//!
//! ```text
//! Publisher (WebSocket)
//!     │ text frame
//!     ├── ConnectionManager (ws/)   state machine, owns the session
//!     ├── MessageDecoder (ws/)      frame → InboundEvent
//!     │
//!     ├── TrackerService (service/) SessionObserver
//!     │     ├── PositionStore (domain/)
//!     │     └── ContainmentEngine (geometry/) ◀── BoundaryGeometry (injected)
//!     │
//!     └── EventBus (domain/) ──▶ presentation
//! ```
//!
//! A development publisher speaking the same protocol lives in
//! [`publisher`].

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod publisher;
pub mod service;
pub mod ws;
