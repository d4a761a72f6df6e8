//! WebSocket client layer: wire messages, decoding, transport, session.
//!
//! [`ConnectionManager`] is the only component that creates or destroys a
//! session. Frames it receives go through [`MessageDecoder`] and the
//! results are reported to a [`SessionObserver`].

pub mod connection;
pub mod decoder;
pub mod messages;
pub mod observer;
pub mod transport;

pub use connection::ConnectionManager;
pub use decoder::MessageDecoder;
pub use messages::{InboundEvent, WireMessage};
pub use observer::SessionObserver;
pub use transport::{Session, Transport, WsSession, WsTransport};
