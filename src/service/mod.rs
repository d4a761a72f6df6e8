//! Service layer: wiring between the session, the store and containment.

pub mod tracker_service;

pub use tracker_service::TrackerService;
