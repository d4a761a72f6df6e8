//! Transport seam between the session state machine and the network.
//!
//! [`ConnectionManager`](super::ConnectionManager) only ever talks to a
//! [`Transport`] and the [`Session`] it hands out, so the state machine can
//! be driven by the real `tokio-tungstenite` client ([`WsTransport`]) or by
//! a scripted in-memory transport in tests.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::DEFAULT_CONNECT_TIMEOUT;
use crate::error::TrackerError;

/// How long [`WsSession::close`] waits for the peer's close acknowledgement.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Factory for sessions against an endpoint.
pub trait Transport: Send + Sync + fmt::Debug + 'static {
    /// Session type produced by a successful connect.
    type Session: Session;

    /// Establishes one session.
    ///
    /// Failures are reported as [`TrackerError::Construction`].
    fn connect(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<Self::Session, TrackerError>> + Send;
}

/// One live duplex text session.
pub trait Session: Send + 'static {
    /// Waits for the next text frame.
    ///
    /// `None` means the peer closed the session; `Some(Err(_))` is a
    /// transport failure. Either ends the session.
    fn next_frame(&mut self) -> impl Future<Output = Option<Result<String, TrackerError>>> + Send;

    /// Closes the session, best effort.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// WebSocket transport backed by `tokio-tungstenite`.
///
/// A handshake that does not complete within the connect timeout is a
/// construction failure, so a blackholed endpoint feeds the reconnect
/// schedule instead of holding the manager in `Connecting`.
#[derive(Debug, Clone, Copy)]
pub struct WsTransport {
    connect_timeout: Duration,
}

impl WsTransport {
    /// Creates a transport whose handshakes give up after `connect_timeout`.
    #[must_use]
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// Returns the handshake bound.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Transport for WsTransport {
    type Session = WsSession;

    async fn connect(&self, endpoint: &str) -> Result<WsSession, TrackerError> {
        let handshake = tokio::time::timeout(self.connect_timeout, connect_async(endpoint));
        let (stream, _response) = handshake
            .await
            .map_err(|_| {
                TrackerError::Construction(format!(
                    "handshake timed out after {}ms",
                    self.connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| TrackerError::Construction(e.to_string()))?;
        Ok(WsSession { stream })
    }
}

/// A live WebSocket session.
pub struct WsSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl fmt::Debug for WsSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsSession").finish_non_exhaustive()
    }
}

impl Session for WsSession {
    async fn next_frame(&mut self) -> Option<Result<String, TrackerError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => {
                    // Not part of the protocol; let the decoder reject it.
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "peer closed session");
                    return None;
                }
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(TrackerError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "session close failed");
        }
        // Drain until the peer acknowledges the close.
        let drain = async { while let Some(Ok(_)) = self.stream.next().await {} };
        if tokio::time::timeout(CLOSE_GRACE, drain).await.is_err() {
            tracing::debug!("peer did not acknowledge close");
        }
    }
}


#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn stalled_handshake_is_a_construction_failure() {
        // Accepts TCP but never answers the upgrade request.
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind loopback");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local addr");
        };
        let _silent_peer = tokio::spawn(async move {
            let held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(held);
        });

        let transport = WsTransport::new(Duration::from_millis(100));
        let started = std::time::Instant::now();
        let result = transport.connect(&format!("ws://{addr}/api/ws/robot")).await;

        assert!(matches!(result, Err(TrackerError::Construction(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn default_transport_uses_default_timeout() {
        assert_eq!(
            WsTransport::default().connect_timeout(),
            DEFAULT_CONNECT_TIMEOUT
        );
    }
}
