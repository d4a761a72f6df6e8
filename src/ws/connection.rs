//! Session lifecycle state machine with fixed-delay reconnect.
//!
//! [`ConnectionManager`] owns exactly one logical session against its
//! endpoint. A single driver task per `start()` walks the states:
//!
//! - `Connecting`: awaits [`Transport::connect`].
//! - `Open`: decodes frames in arrival order and reports them.
//! - `ReconnectScheduled`: sleeps the fixed delay, then back to `Connecting`.
//!
//! Every driver carries the generation it was spawned with. `stop()` and a
//! superseding `start()` bump the generation under the state lock, so a
//! stale driver can neither transition state nor reach the observer, even
//! if it wakes up later. The driver is also told to shut down so it closes
//! its socket instead of lingering.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::decoder::MessageDecoder;
use super::messages::InboundEvent;
use super::observer::SessionObserver;
use super::transport::{Session, Transport, WsTransport};
use crate::config::TrackerConfig;
use crate::domain::ConnectionState;
use crate::error::TrackerError;

/// Maintains one self-healing session and reports what it receives.
#[derive(Debug)]
pub struct ConnectionManager<T: Transport = WsTransport> {
    endpoint: Arc<str>,
    reconnect_delay: Duration,
    decoder: MessageDecoder,
    transport: Arc<T>,
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    cell: Mutex<SessionCell>,
    observer: Arc<dyn SessionObserver>,
}

#[derive(Debug, Default)]
struct SessionCell {
    state: ConnectionState,
    generation: u64,
    reconnect_at: Option<Instant>,
    driver: Option<DriverHandle>,
}

#[derive(Debug)]
struct DriverHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Everything a driver task needs, detached from the manager.
struct Driver<T: Transport> {
    generation: u64,
    endpoint: Arc<str>,
    reconnect_delay: Duration,
    decoder: MessageDecoder,
    transport: Arc<T>,
    shared: Arc<Shared>,
}

enum SessionEnd {
    Failed(TrackerError),
    Superseded,
}

impl ConnectionManager<WsTransport> {
    /// Creates a WebSocket manager from tracker configuration.
    #[must_use]
    pub fn from_config(config: &TrackerConfig, observer: Arc<dyn SessionObserver>) -> Self {
        Self::new(
            WsTransport::new(config.connect_timeout),
            config.endpoint.as_str(),
            config.reconnect_delay,
            MessageDecoder::new(config.coord_max),
            observer,
        )
    }
}

impl<T: Transport> ConnectionManager<T> {
    /// Creates a stopped manager.
    #[must_use]
    pub fn new(
        transport: T,
        endpoint: &str,
        reconnect_delay: Duration,
        decoder: MessageDecoder,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            endpoint: Arc::from(endpoint),
            reconnect_delay,
            decoder,
            transport: Arc::new(transport),
            shared: Arc::new(Shared {
                cell: Mutex::new(SessionCell::default()),
                observer,
            }),
        }
    }

    /// Returns the transport sessions are opened through.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.cell.lock().state
    }

    /// Returns when the pending reconnect attempt fires, if one is scheduled.
    #[must_use]
    pub fn pending_reconnect(&self) -> Option<Instant> {
        self.shared.cell.lock().reconnect_at
    }

    /// Begins connecting unless already `Connecting` or `Open`.
    ///
    /// From `ReconnectScheduled` the pending timer is canceled and a new
    /// attempt starts immediately.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoRuntime`] when called outside a Tokio
    /// runtime.
    pub fn start(&self) -> Result<(), TrackerError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| TrackerError::NoRuntime)?;

        let mut cell = self.shared.cell.lock();
        if cell.state.is_active() {
            tracing::debug!(state = %cell.state, "start ignored; session already active");
            return Ok(());
        }

        cell.generation += 1;
        if let Some(previous) = cell.driver.take() {
            previous.cancel();
        }
        cell.state = ConnectionState::Connecting;
        cell.reconnect_at = None;

        let (shutdown, shutdown_rx) = oneshot::channel();
        let driver = Driver {
            generation: cell.generation,
            endpoint: Arc::clone(&self.endpoint),
            reconnect_delay: self.reconnect_delay,
            decoder: self.decoder,
            transport: Arc::clone(&self.transport),
            shared: Arc::clone(&self.shared),
        };
        tracing::info!(
            endpoint = %self.endpoint,
            generation = cell.generation,
            "connecting"
        );
        let task = runtime.spawn(driver.run(shutdown_rx));
        cell.driver = Some(DriverHandle { shutdown, task });
        Ok(())
    }

    /// Cancels any session and any pending reconnect and goes `Disconnected`.
    ///
    /// Nothing from the canceled session reaches the observer after this
    /// returns.
    pub fn stop(&self) {
        let mut cell = self.shared.cell.lock();
        cell.generation += 1;
        if let Some(driver) = cell.driver.take() {
            driver.cancel();
        }
        let was_open = cell.state == ConnectionState::Open;
        if cell.state != ConnectionState::Disconnected {
            tracing::info!(endpoint = %self.endpoint, from = %cell.state, "stopped");
        }
        cell.state = ConnectionState::Disconnected;
        cell.reconnect_at = None;
        if was_open {
            self.shared.observer.on_connectivity(false);
        }
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl DriverHandle {
    fn cancel(self) {
        // The driver may already have exited on its own.
        let _ = self.shutdown.send(());
        drop(self.task);
    }
}

impl Shared {
    /// `Connecting -> Open`.
    fn opened(&self, generation: u64) -> bool {
        let mut cell = self.cell.lock();
        if cell.generation != generation {
            return false;
        }
        cell.state = ConnectionState::Open;
        cell.reconnect_at = None;
        tracing::info!(generation, "session open");
        self.observer.on_connectivity(true);
        true
    }

    /// Decodes and reports one frame. Returns `false` for a stale driver.
    fn deliver(&self, generation: u64, decoder: &MessageDecoder, frame: &str) -> bool {
        let decoded = decoder.decode(frame);
        let cell = self.cell.lock();
        if cell.generation != generation {
            return false;
        }
        match decoded {
            Ok(InboundEvent::PositionUpdate(position)) => {
                tracing::trace!(x = position.x, y = position.y, "position frame");
                self.observer.on_position(position);
            }
            Ok(InboundEvent::Connected { message }) => {
                tracing::info!(message = message.as_deref().unwrap_or(""), "publisher greeting");
            }
            Ok(InboundEvent::Other { event }) => {
                tracing::debug!(%event, "ignoring unknown event");
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping undecodable frame");
                self.observer.on_decode_error(&e);
            }
        }
        drop(cell);
        true
    }

    /// `Connecting | Open -> ReconnectScheduled`.
    fn schedule_reconnect(&self, generation: u64, error: &TrackerError, delay: Duration) -> bool {
        let mut cell = self.cell.lock();
        if cell.generation != generation {
            return false;
        }
        let was_open = cell.state == ConnectionState::Open;
        cell.state = ConnectionState::ReconnectScheduled;
        cell.reconnect_at = Some(Instant::now() + delay);
        tracing::warn!(
            generation,
            error = %error,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "session lost; reconnect scheduled"
        );
        if was_open {
            self.observer.on_connectivity(false);
        }
        self.observer.on_session_error(error);
        true
    }

    /// `ReconnectScheduled -> Connecting`.
    fn reconnecting(&self, generation: u64) -> bool {
        let mut cell = self.cell.lock();
        if cell.generation != generation {
            return false;
        }
        cell.state = ConnectionState::Connecting;
        cell.reconnect_at = None;
        tracing::info!(generation, "reconnecting");
        true
    }
}

impl<T: Transport> Driver<T> {
    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            let connected = tokio::select! {
                biased;
                _ = &mut shutdown => return,
                result = self.transport.connect(&self.endpoint) => result,
            };

            let failure = match connected {
                Ok(mut session) => {
                    if !self.shared.opened(self.generation) {
                        session.close().await;
                        return;
                    }
                    let ended = tokio::select! {
                        biased;
                        _ = &mut shutdown => None,
                        end = self.pump(&mut session) => Some(end),
                    };
                    match ended {
                        Some(SessionEnd::Failed(error)) => error,
                        Some(SessionEnd::Superseded) | None => {
                            session.close().await;
                            return;
                        }
                    }
                }
                Err(error) => error,
            };

            if !self
                .shared
                .schedule_reconnect(self.generation, &failure, self.reconnect_delay)
            {
                return;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => return,
                () = tokio::time::sleep(self.reconnect_delay) => {}
            }

            if !self.shared.reconnecting(self.generation) {
                return;
            }
        }
    }

    async fn pump(&self, session: &mut T::Session) -> SessionEnd {
        loop {
            match session.next_frame().await {
                Some(Ok(frame)) => {
                    if !self.shared.deliver(self.generation, &self.decoder, &frame) {
                        return SessionEnd::Superseded;
                    }
                }
                Some(Err(error)) => return SessionEnd::Failed(error),
                None => {
                    return SessionEnd::Failed(TrackerError::Transport(
                        "session closed by peer".to_string(),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use parking_lot::Mutex as SyncMutex;

    use super::*;
    use crate::domain::Position;
    use crate::error::DecodeError;
    use crate::ws::transport::scripted::ScriptedTransport;

    const DELAY: Duration = Duration::from_secs(5);

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Connectivity(bool),
        Position(Position),
        DecodeError,
        SessionError,
    }

    #[derive(Debug, Default)]
    struct Recorder {
        seen: SyncMutex<Vec<Seen>>,
    }

    impl Recorder {
        fn seen(&self) -> Vec<Seen> {
            self.seen.lock().clone()
        }
    }

    impl SessionObserver for Recorder {
        fn on_connectivity(&self, connected: bool) {
            self.seen.lock().push(Seen::Connectivity(connected));
        }
        fn on_position(&self, position: Position) {
            self.seen.lock().push(Seen::Position(position));
        }
        fn on_decode_error(&self, _error: &DecodeError) {
            self.seen.lock().push(Seen::DecodeError);
        }
        fn on_session_error(&self, _error: &TrackerError) {
            self.seen.lock().push(Seen::SessionError);
        }
    }

    fn manager() -> (ConnectionManager<ScriptedTransport>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn SessionObserver> = Arc::clone(&recorder) as Arc<dyn SessionObserver>;
        let mgr = ConnectionManager::new(
            ScriptedTransport::new(),
            "ws://tracker.test/ws",
            DELAY,
            MessageDecoder::new(100.0),
            observer,
        );
        (mgr, recorder)
    }

    /// Lets spawned tasks run until they block, without moving far in time.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn new_manager_is_disconnected() {
        let (mgr, _) = manager();
        let transport = mgr.transport();
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
        assert_eq!(mgr.pending_reconnect(), None);
        assert_eq!(transport.attempt_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_connect_opens() {
        let (mgr, recorder) = manager();
        let transport = mgr.transport();
        let _frames = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;

        assert_eq!(mgr.state(), ConnectionState::Open);
        assert_eq!(recorder.seen(), vec![Seen::Connectivity(true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connect_schedules_exactly_one_reconnect() {
        let (mgr, recorder) = manager();
        let transport = mgr.transport();
        transport.refuse();
        let started = Instant::now();

        assert!(mgr.start().is_ok());
        settle().await;

        assert_eq!(mgr.state(), ConnectionState::ReconnectScheduled);
        assert_eq!(mgr.pending_reconnect(), Some(started + DELAY));
        assert_eq!(transport.attempt_count(), 1);
        assert_eq!(recorder.seen(), vec![Seen::SessionError]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_timer_prevents_reconnect() {
        let (mgr, _) = manager();
        let transport = mgr.transport();
        transport.refuse();

        assert!(mgr.start().is_ok());
        settle().await;
        assert_eq!(mgr.state(), ConnectionState::ReconnectScheduled);

        mgr.stop();
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
        assert_eq!(mgr.pending_reconnect(), None);

        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
        assert_eq!(transport.attempt_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_waits_the_full_delay() {
        let (mgr, _) = manager();
        let transport = mgr.transport();
        let frames = transport.accept();
        let _second = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;
        assert_eq!(mgr.state(), ConnectionState::Open);

        let closed_at = Instant::now();
        drop(frames);
        settle().await;
        assert_eq!(mgr.state(), ConnectionState::ReconnectScheduled);

        tokio::time::sleep_until(closed_at + DELAY - Duration::from_millis(10)).await;
        assert_eq!(transport.attempt_count(), 1);

        tokio::time::sleep_until(closed_at + DELAY + Duration::from_millis(10)).await;
        assert_eq!(transport.attempt_count(), 2);
        assert_eq!(mgr.state(), ConnectionState::Open);

        let attempts = transport.attempts();
        let Some(second) = attempts.get(1) else {
            panic!("expected a second attempt");
        };
        assert_eq!(second.duration_since(closed_at), DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_indefinitely_at_fixed_interval() {
        let (mgr, _) = manager();
        let transport = mgr.transport();
        let started = Instant::now();

        assert!(mgr.start().is_ok());
        tokio::time::sleep(DELAY * 4 + Duration::from_millis(1)).await;

        let offsets: Vec<Duration> = transport
            .attempts()
            .iter()
            .map(|at| at.duration_since(started))
            .collect();
        assert_eq!(offsets, vec![Duration::ZERO, DELAY, DELAY * 2, DELAY * 3, DELAY * 4]);
        assert_eq!(mgr.state(), ConnectionState::ReconnectScheduled);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_open_is_noop() {
        let (mgr, recorder) = manager();
        let transport = mgr.transport();
        let _frames = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;
        assert!(mgr.start().is_ok());
        settle().await;

        assert_eq!(mgr.state(), ConnectionState::Open);
        assert_eq!(transport.attempt_count(), 1);
        assert_eq!(recorder.seen(), vec![Seen::Connectivity(true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_scheduled_connects_immediately() {
        let (mgr, _) = manager();
        let transport = mgr.transport();
        transport.refuse();
        let _frames = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;
        assert_eq!(mgr.state(), ConnectionState::ReconnectScheduled);

        assert!(mgr.start().is_ok());
        settle().await;
        assert_eq!(mgr.state(), ConnectionState::Open);
        assert_eq!(transport.attempt_count(), 2);

        // The canceled timer must not produce a third attempt.
        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(transport.attempt_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_reported_in_order() {
        let (mgr, recorder) = manager();
        let transport = mgr.transport();
        let frames = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;

        for (x, t) in [(10, 1), (20, 2), (30, 3)] {
            let frame = format!(
                r#"{{"event":"position_update","data":{{"x":{x},"y":5,"timestamp":{t}}}}}"#
            );
            assert!(frames.send(Ok(frame)).is_ok());
        }
        settle().await;

        assert_eq!(
            recorder.seen(),
            vec![
                Seen::Connectivity(true),
                Seen::Position(Position::new(10.0, 5.0, 1.0)),
                Seen::Position(Position::new(20.0, 5.0, 2.0)),
                Seen::Position(Position::new(30.0, 5.0, 3.0)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn decode_failure_keeps_session_open() {
        let (mgr, recorder) = manager();
        let transport = mgr.transport();
        let frames = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;

        assert!(frames.send(Ok("{not json".to_string())).is_ok());
        assert!(frames.send(Ok(r#"{"event":"mystery"}"#.to_string())).is_ok());
        assert!(
            frames
                .send(Ok(
                    r#"{"event":"position_update","data":{"x":1,"y":2,"timestamp":3}}"#
                        .to_string()
                ))
                .is_ok()
        );
        settle().await;

        assert_eq!(mgr.state(), ConnectionState::Open);
        assert_eq!(transport.attempt_count(), 1);
        assert_eq!(
            recorder.seen(),
            vec![
                Seen::Connectivity(true),
                Seen::DecodeError,
                Seen::Position(Position::new(1.0, 2.0, 3.0)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_reports_disconnect_then_retries() {
        let (mgr, recorder) = manager();
        let transport = mgr.transport();
        let frames = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;
        assert!(
            frames
                .send(Err(TrackerError::Transport("reset by peer".to_string())))
                .is_ok()
        );
        settle().await;

        assert_eq!(mgr.state(), ConnectionState::ReconnectScheduled);
        assert_eq!(
            recorder.seen(),
            vec![
                Seen::Connectivity(true),
                Seen::Connectivity(false),
                Seen::SessionError,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_discards_stale_frames_and_closes_session() {
        let (mgr, recorder) = manager();
        let transport = mgr.transport();
        let frames = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;
        mgr.stop();

        let _ = frames.send(Ok(
            r#"{"event":"position_update","data":{"x":1,"y":2,"timestamp":3}}"#.to_string(),
        ));
        settle().await;

        assert_eq!(mgr.state(), ConnectionState::Disconnected);
        assert_eq!(transport.closed_sessions(), 1);
        assert_eq!(
            recorder.seen(),
            vec![Seen::Connectivity(true), Seen::Connectivity(false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_uses_fresh_session() {
        let (mgr, _) = manager();
        let transport = mgr.transport();
        let _first = transport.accept();
        let _second = transport.accept();

        assert!(mgr.start().is_ok());
        settle().await;
        mgr.stop();
        assert!(mgr.start().is_ok());
        settle().await;

        assert_eq!(mgr.state(), ConnectionState::Open);
        assert_eq!(transport.attempt_count(), 2);
        assert_eq!(transport.closed_sessions(), 1);
    }

    #[test]
    fn start_outside_runtime_fails() {
        let (mgr, _) = manager();
        assert!(matches!(mgr.start(), Err(TrackerError::NoRuntime)));
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
    }
}
