//! The channel handle and its shared state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crowdplay_protocol::{Frame, InboundEvent};
use serde_json::Value;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;

use crate::connector::{Connector, WsConnector};
use crate::{driver, ChannelConfig, ChannelError, ConnectionState};

/// State shared between the handle and the driver task.
pub(crate) struct Shared {
    pub(crate) config: ChannelConfig,
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    routes: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<InboundEvent>>>>,
    /// Cleared by `disconnect` before the driver is woken, so a pending
    /// backoff never turns into a reconnect.
    pub(crate) auto_reconnect: AtomicBool,
    pub(crate) shutdown: Notify,
}

impl Shared {
    pub(crate) fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub(crate) fn set_state(&self, next: ConnectionState) {
        let prev = *self.state_rx.borrow();
        if prev != next {
            tracing::debug!(from = %prev, to = %next, "channel state change");
            // Receivers may all be gone; state is still readable here.
            let _ = self.state_tx.send(next);
        }
    }

    /// Routes one event to its subscribers, pruning dead receivers.
    pub(crate) fn dispatch(&self, event: InboundEvent) {
        let mut routes = self.routes.lock().expect("route table poisoned");
        let Some(senders) = routes.get_mut(&event.event) else {
            tracing::trace!(event = %event.event, "no subscriber for event");
            return;
        };
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        if senders.is_empty() {
            routes.remove(&event.event);
        }
    }

    /// Emits a lifecycle event (`connect`, `disconnect`, `error`) into the
    /// same routes that wire events use.
    pub(crate) fn emit(&self, event: &str, data: Value) {
        self.dispatch(InboundEvent {
            event: event.to_string(),
            data,
        });
    }
}

/// Handle to the realtime event channel.
///
/// `connect` spawns a background driver that owns the transport; this
/// handle only ever touches shared state, so it is cheap to use from
/// anywhere. Generic over the [`Connector`] purely so tests can script
/// connections; production code uses the [`WsConnector`] default.
pub struct EventChannel<C: Connector = WsConnector> {
    connector: Arc<C>,
    shared: Arc<Shared>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Frame>>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl EventChannel<WsConnector> {
    /// A channel dialing real WebSockets per the config.
    pub fn new(config: ChannelConfig) -> Self {
        Self::with_connector(config, WsConnector)
    }
}

impl<C: Connector> EventChannel<C> {
    /// A channel using a custom connection strategy.
    pub fn with_connector(config: ChannelConfig, connector: C) -> Self {
        let auto_reconnect = config.auto_reconnect;
        let (state_tx, state_rx) = watch::channel(ConnectionState::default());
        Self {
            connector: Arc::new(connector),
            shared: Arc::new(Shared {
                config,
                state_tx,
                state_rx,
                routes: Mutex::new(HashMap::new()),
                auto_reconnect: AtomicBool::new(auto_reconnect),
                shutdown: Notify::new(),
            }),
            outbound: Mutex::new(None),
            driver: Mutex::new(None),
        }
    }

    /// Starts the connection driver.
    ///
    /// Returns immediately; the outcome of the connection attempt arrives
    /// through [`state`](Self::state) transitions and the `connect` /
    /// `error` lifecycle events. A previous `PermanentlyFailed` run is
    /// cleared and retried from scratch.
    ///
    /// # Errors
    /// [`ChannelError::AlreadyConnected`] if a driver is already running.
    pub fn connect(&self) -> Result<(), ChannelError> {
        let mut driver = self.driver.lock().expect("driver slot poisoned");
        if driver.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(ChannelError::AlreadyConnected);
        }

        self.shared
            .auto_reconnect
            .store(self.shared.config.auto_reconnect, Ordering::SeqCst);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        *self.outbound.lock().expect("outbound slot poisoned") =
            Some(outbound_tx);

        let handle = tokio::spawn(driver::run(
            self.connector.clone(),
            self.shared.clone(),
            outbound_rx,
        ));
        *driver = Some(handle);
        Ok(())
    }

    /// Tears the connection down.
    ///
    /// Clears the auto-reconnect flag *first*, so a reconnect queued
    /// behind a backoff delay is aborted instead of racing the shutdown.
    /// Waits for the driver to finish; idempotent when nothing is running.
    pub async fn disconnect(&self) {
        self.shared.auto_reconnect.store(false, Ordering::SeqCst);

        let handle = self.driver.lock().expect("driver slot poisoned").take();
        let Some(handle) = handle else {
            return;
        };
        self.shared.shutdown.notify_one();
        if handle.await.is_err() {
            tracing::warn!("channel driver task panicked during shutdown");
        }
        self.outbound.lock().expect("outbound slot poisoned").take();
    }

    /// Sends a named event to the platform.
    ///
    /// A logged no-op unless the channel is `Connected` — events sent
    /// while connecting, reconnecting, or down are dropped, not queued.
    pub fn send(&self, event: &str, data: Value) {
        if !self.shared.state().is_connected() {
            tracing::warn!(
                event,
                state = %self.shared.state(),
                "dropping outbound event: channel not connected"
            );
            return;
        }
        let outbound = self.outbound.lock().expect("outbound slot poisoned");
        let delivered = outbound
            .as_ref()
            .is_some_and(|tx| tx.send(Frame::new(event, data)).is_ok());
        if !delivered {
            tracing::warn!(event, "dropping outbound event: driver gone");
        }
    }

    /// Subscribes to one named event. Every matching event (including the
    /// synthesized `connect` / `disconnect` / `error` lifecycle events)
    /// is delivered to the returned receiver.
    pub fn subscribe(
        &self,
        event: &str,
    ) -> mpsc::UnboundedReceiver<InboundEvent> {
        self.subscribe_many(&[event])
    }

    /// Subscribes one receiver to several named events at once.
    pub fn subscribe_many(
        &self,
        events: &[&str],
    ) -> mpsc::UnboundedReceiver<InboundEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut routes =
            self.shared.routes.lock().expect("route table poisoned");
        for event in events {
            routes.entry((*event).to_string()).or_default().push(tx.clone());
        }
        rx
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// A watcher over state transitions, for callers that need to react
    /// to lifecycle changes rather than poll.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use crowdplay_protocol::events;
    use crowdplay_transport::ConnectParams;

    use super::*;

    fn shared() -> Shared {
        let config = ChannelConfig::new(ConnectParams {
            channel_url: "ws://localhost:9000/events".into(),
            access_token: "t".into(),
            app_id: "a".into(),
            game_id: "g".into(),
            arena_game_id: "ag".into(),
        });
        let (state_tx, state_rx) = watch::channel(ConnectionState::default());
        Shared {
            auto_reconnect: AtomicBool::new(config.auto_reconnect),
            config,
            state_tx,
            state_rx,
            routes: Mutex::new(HashMap::new()),
            shutdown: Notify::new(),
        }
    }

    fn event(name: &str) -> InboundEvent {
        InboundEvent {
            event: name.to_string(),
            data: Value::Null,
        }
    }

    #[test]
    fn test_dispatch_routes_to_matching_subscriber_only() {
        let shared = shared();
        let (gem_tx, mut gem_rx) = mpsc::unbounded_channel();
        let (boost_tx, mut boost_rx) = mpsc::unbounded_channel();
        shared
            .routes
            .lock()
            .unwrap()
            .insert("immediate-item-drop".into(), vec![gem_tx]);
        shared
            .routes
            .lock()
            .unwrap()
            .insert(events::PLAYER_BOOST_ACTIVATED.into(), vec![boost_tx]);

        shared.dispatch(event("immediate-item-drop"));

        assert_eq!(gem_rx.try_recv().unwrap().event, "immediate-item-drop");
        assert!(boost_rx.try_recv().is_err());
    }

    #[test]
    fn test_dispatch_prunes_dropped_receivers() {
        let shared = shared();
        let (tx, rx) = mpsc::unbounded_channel();
        shared
            .routes
            .lock()
            .unwrap()
            .insert("countdown-update".into(), vec![tx]);
        drop(rx);

        shared.dispatch(event("countdown-update"));

        // The dead entry is removed, not retried forever.
        assert!(shared
            .routes
            .lock()
            .unwrap()
            .get("countdown-update")
            .is_none());
    }

    #[test]
    fn test_dispatch_without_subscriber_is_silent() {
        let shared = shared();
        shared.dispatch(event("nobody-listens"));
    }

    #[test]
    fn test_set_state_skips_redundant_transitions() {
        let shared = shared();
        let mut rx = shared.state_rx.clone();
        assert!(!rx.has_changed().unwrap());

        shared.set_state(ConnectionState::Disconnected);
        assert!(!rx.has_changed().unwrap());

        shared.set_state(ConnectionState::Connecting);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Connecting);
    }
}
