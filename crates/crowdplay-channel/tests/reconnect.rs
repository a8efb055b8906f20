//! Reconnection state-machine tests.
//!
//! These run against a scripted connector instead of a live server, and
//! on the paused tokio clock, so the backoff schedule can be asserted to
//! the second.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crowdplay_channel::{
    ChannelConfig, ChannelError, ConnectionState, Connector, EventChannel,
};
use crowdplay_protocol::{events, Frame};
use crowdplay_transport::{ConnectParams, TransportError, WireTransport};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Error as WsError;

// =========================================================================
// Scripted connector and transport
// =========================================================================

/// A transport the test feeds by hand.
struct MockTransport {
    wire_rx: mpsc::UnboundedReceiver<Result<Option<Frame>, TransportError>>,
    sent_tx: mpsc::UnboundedSender<Frame>,
}

impl WireTransport for MockTransport {
    async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.sent_tx
            .send(frame.clone())
            .map_err(|_| TransportError::Send(WsError::ConnectionClosed))
    }

    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        match self.wire_rx.recv().await {
            Some(result) => result,
            // Test dropped the wire handle: behave like a clean close.
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// The test's side of a [`MockTransport`].
struct WireHandle {
    wire_tx: mpsc::UnboundedSender<Result<Option<Frame>, TransportError>>,
    sent_rx: mpsc::UnboundedReceiver<Frame>,
}

impl WireHandle {
    fn push(&self, frame: Frame) {
        self.wire_tx.send(Ok(Some(frame))).unwrap();
    }

    /// Simulates the server dropping the connection.
    fn drop_connection(&self) {
        self.wire_tx.send(Ok(None)).unwrap();
    }
}

fn wired() -> (MockTransport, WireHandle) {
    let (wire_tx, wire_rx) = mpsc::unbounded_channel();
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    (
        MockTransport { wire_rx, sent_tx },
        WireHandle { wire_tx, sent_rx },
    )
}

#[derive(Default)]
struct MockState {
    /// Outcomes for upcoming dials; an empty script means every further
    /// dial fails.
    script: Mutex<VecDeque<MockTransport>>,
    dial_count: AtomicUsize,
    dial_times: Mutex<Vec<Instant>>,
}

/// Pops one scripted outcome per dial and records when each dial happened.
#[derive(Clone, Default)]
struct MockConnector(Arc<MockState>);

impl MockConnector {
    /// Queues a dial that will succeed with a fresh scripted transport.
    fn expect_dial(&self) -> WireHandle {
        let (transport, handle) = wired();
        self.0.script.lock().unwrap().push_back(transport);
        handle
    }

    fn dials(&self) -> usize {
        self.0.dial_count.load(Ordering::SeqCst)
    }

    fn dial_times(&self) -> Vec<Instant> {
        self.0.dial_times.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(
        &self,
        _config: &ChannelConfig,
    ) -> Result<MockTransport, TransportError> {
        self.0.dial_count.fetch_add(1, Ordering::SeqCst);
        self.0.dial_times.lock().unwrap().push(Instant::now());
        self.0
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Handshake("scripted dial failure".into()))
    }
}

fn config() -> ChannelConfig {
    ChannelConfig::new(ConnectParams {
        channel_url: "ws://localhost:9000/events".into(),
        access_token: "token".into(),
        app_id: "app".into(),
        game_id: "game".into(),
        arena_game_id: "arena-1".into(),
    })
}

fn channel(connector: &MockConnector) -> EventChannel<MockConnector> {
    EventChannel::with_connector(config(), connector.clone())
}

async fn wait_for_state(
    channel: &EventChannel<MockConnector>,
    wanted: ConnectionState,
) {
    let mut rx = channel.watch_state();
    rx.wait_for(|s| *s == wanted).await.unwrap();
}

// =========================================================================
// Happy path
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_connect_delivers_events_and_lifecycle() {
    let connector = MockConnector::default();
    let wire = connector.expect_dial();
    let channel = channel(&connector);

    let mut connects = channel.subscribe(events::CONNECT);
    let mut drops = channel.subscribe("immediate-item-drop");

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    assert_eq!(connects.recv().await.unwrap().event, events::CONNECT);

    wire.push(Frame::new(
        "immediate-item-drop",
        json!({ "itemType": "powerup" }),
    ));
    let event = drops.recv().await.unwrap();
    assert_eq!(event.event, "immediate-item-drop");
    assert_eq!(event.data["itemType"], "powerup");
}

#[tokio::test(start_paused = true)]
async fn test_send_while_connected_reaches_the_wire() {
    let connector = MockConnector::default();
    let mut wire = connector.expect_dial();
    let channel = channel(&connector);

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    channel.send("player-action", json!({ "kind": "jump" }));

    let sent = wire.sent_rx.recv().await.unwrap();
    assert_eq!(sent.event, "player-action");
    assert_eq!(sent.data["kind"], "jump");
}

#[tokio::test(start_paused = true)]
async fn test_connect_twice_is_rejected() {
    let connector = MockConnector::default();
    let _wire = connector.expect_dial();
    let channel = channel(&connector);

    channel.connect().unwrap();
    assert!(matches!(
        channel.connect(),
        Err(ChannelError::AlreadyConnected)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_send_while_disconnected_is_a_no_op() {
    let connector = MockConnector::default();
    let channel = channel(&connector);

    // Never connected: must not panic and must not dial anything.
    channel.send("player-action", json!({}));

    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert_eq!(connector.dials(), 0);
}

// =========================================================================
// Reconnection
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_per_failed_attempt() {
    let connector = MockConnector::default();
    let wire = connector.expect_dial();
    let channel = channel(&connector);

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    // Two failing retries, then a third that succeeds.
    let dropped_at = Instant::now();
    wire.drop_connection();
    // The script is empty while retries 1 and 2 fire (2s and 4s in); only
    // then queue the transport that retry 3 will get.
    tokio::time::sleep(Duration::from_secs(6) + Duration::from_millis(1))
        .await;
    let _wire2 = connector.expect_dial();
    wait_for_state(&channel, ConnectionState::Connected).await;

    let times = connector.dial_times();
    assert_eq!(times.len(), 4);
    // 2s to the first retry, then 4s, then 8s.
    assert_eq!(times[1] - dropped_at, Duration::from_secs(2));
    assert_eq!(times[2] - times[1], Duration::from_secs(4));
    assert_eq!(times[3] - times[2], Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_resets_after_successful_reconnect() {
    let connector = MockConnector::default();
    let wire = connector.expect_dial();
    let channel = channel(&connector);

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    // First drop: one 2s retry that succeeds.
    let wire2 = connector.expect_dial();
    wire.drop_connection();
    wait_for_state(&channel, ConnectionState::Reconnecting { attempt: 1 })
        .await;
    wait_for_state(&channel, ConnectionState::Connected).await;

    // Second drop: the schedule must start over at 2s, not continue at 4s.
    let dropped_again_at = Instant::now();
    let _wire3 = connector.expect_dial();
    wire2.drop_connection();
    wait_for_state(&channel, ConnectionState::Reconnecting { attempt: 1 })
        .await;
    wait_for_state(&channel, ConnectionState::Connected).await;

    let times = connector.dial_times();
    assert_eq!(times.len(), 3);
    assert_eq!(*times.last().unwrap() - dropped_again_at, Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_park_in_permanently_failed() {
    let connector = MockConnector::default();
    let wire = connector.expect_dial();
    let channel = channel(&connector);
    let mut errors = channel.subscribe(events::ERROR);

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    // Script is now empty: every retry fails.
    wire.drop_connection();
    wait_for_state(&channel, ConnectionState::PermanentlyFailed).await;

    // Initial dial plus exactly five retries; no sixth attempt.
    assert_eq!(connector.dials(), 6);

    let error = errors.recv().await.unwrap();
    assert!(error.data["message"]
        .as_str()
        .unwrap()
        .contains("after 5 attempts"));

    // Sending in the terminal state stays a no-op.
    channel.send("player-action", json!({}));
    assert_eq!(connector.dials(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_backoff_aborts_the_reconnect() {
    let connector = MockConnector::default();
    let wire = connector.expect_dial();
    let channel = channel(&connector);

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    wire.drop_connection();
    wait_for_state(&channel, ConnectionState::Reconnecting { attempt: 1 })
        .await;

    // The driver is now sleeping out the first 2s backoff. Disconnecting
    // here must cancel the queued dial, not race it.
    channel.disconnect().await;

    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert_eq!(connector.dials(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_disabled_goes_straight_to_disconnected() {
    let connector = MockConnector::default();
    let wire = connector.expect_dial();
    let channel = EventChannel::with_connector(
        config().without_reconnect(),
        connector.clone(),
    );

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    wire.drop_connection();
    wait_for_state(&channel, ConnectionState::Disconnected).await;

    assert_eq!(connector.dials(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_initial_dial_failure_reports_and_stays_down() {
    let connector = MockConnector::default();
    let channel = channel(&connector);
    let mut errors = channel.subscribe(events::ERROR);

    // Empty script: the first dial fails outright. No retries for the
    // initial connection.
    channel.connect().unwrap();

    let error = errors.recv().await.unwrap();
    assert!(error.data["message"]
        .as_str()
        .unwrap()
        .contains("scripted dial failure"));

    let mut rx = channel.watch_state();
    rx.wait_for(|s| *s == ConnectionState::Disconnected)
        .await
        .unwrap();
    assert_eq!(connector.dials(), 1);
}

// =========================================================================
// Lifecycle events
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_disconnect_emits_lifecycle_event() {
    let connector = MockConnector::default();
    let _wire = connector.expect_dial();
    let channel = channel(&connector);
    let mut disconnects = channel.subscribe(events::DISCONNECT);

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    channel.disconnect().await;

    assert_eq!(
        disconnects.recv().await.unwrap().event,
        events::DISCONNECT
    );
    assert_eq!(channel.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_can_follow_permanent_failure() {
    let connector = MockConnector::default();
    let wire = connector.expect_dial();
    let channel = channel(&connector);

    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;
    wire.drop_connection();
    wait_for_state(&channel, ConnectionState::PermanentlyFailed).await;

    // An explicit connect() starts a fresh run and counts attempts
    // from zero again.
    let _wire2 = connector.expect_dial();
    channel.connect().unwrap();
    wait_for_state(&channel, ConnectionState::Connected).await;

    assert_eq!(connector.dials(), 7);
}
