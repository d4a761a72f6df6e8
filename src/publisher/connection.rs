//! Per-subscriber WebSocket loop on the publisher side.
//!
//! Greets the client with a `connected` frame, then forwards every frame
//! from the [`PositionHub`] until the client leaves or a send fails.
//! Anything the client sends is read and ignored.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::hub::PositionHub;
use crate::ws::WireMessage;

/// Greeting sent once after a session is accepted.
pub const GREETING: &str = "connected to position publisher";

/// Runs the read/write loop for a single subscriber.
pub async fn run_connection(socket: WebSocket, hub: Arc<PositionHub>) {
    let (id, mut frames) = hub.register();
    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::info!(connection = %id, "subscriber connected");

    let greeting = serde_json::to_string(&WireMessage::connected(GREETING)).unwrap_or_default();
    if ws_tx.send(Message::text(greeting)).await.is_ok() {
        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                        Some(Ok(Message::Text(text))) => {
                            tracing::trace!(connection = %id, len = text.as_str().len(), "ignoring client frame");
                        }
                        Some(Ok(_)) => {}
                    }
                }
                frame = frames.recv() => {
                    match frame {
                        Ok(frame) => {
                            if ws_tx.send(Message::text(frame)).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(connection = %id, lagged = n, "subscriber lagged behind publisher");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    hub.unregister(id);
    tracing::info!(connection = %id, "subscriber disconnected");
}
