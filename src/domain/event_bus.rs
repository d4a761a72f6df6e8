//! Broadcast channel for tracker events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The tracker
//! service publishes every [`TrackerEvent`] through the bus from inside the
//! session's observer callbacks, so publishing must never wait on a
//! consumer.
//!
//! # Lag
//!
//! A consumer that falls more than `capacity` events behind loses the
//! oldest ones: its next `recv()` yields `RecvError::Lagged(n)` and the
//! following `recv()` resumes at the oldest event still buffered. Positions
//! are snapshots, not deltas, so a lagged presenter only needs to log the
//! gap and keep reading; the [`PositionStore`](super::PositionStore) always
//! holds the latest state regardless.

use tokio::sync::broadcast;

use super::TrackerEvent;

/// Broadcast bus for [`TrackerEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TrackerEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per lagging receiver.
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all current subscribers without blocking.
    ///
    /// Returns how many receivers the event was queued for; `0` when no
    /// presenter is subscribed, in which case the event is dropped.
    pub fn publish(&self, event: TrackerEvent) -> usize {
        let kind = event.event_type_str();
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::trace!(event = kind, receivers, "tracker event published");
        receivers
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
