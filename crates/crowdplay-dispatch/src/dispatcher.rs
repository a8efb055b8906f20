//! Event routing and command dispatch.

use std::sync::Arc;

use crowdplay_arena::SessionHandle;
use crowdplay_channel::{Connector, EventChannel};
use crowdplay_protocol::{events, Command, InboundEvent};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::GameCallbacks;

/// Every event name the dispatcher listens for.
const VOCABULARY: &[&str] = &[
    events::CONNECT,
    events::DISCONNECT,
    events::ERROR,
    events::COUNTDOWN_STARTED,
    events::COUNTDOWN_UPDATE,
    events::ARENA_BEGINS,
    events::PLAYER_BOOST_ACTIVATED,
    events::PACKAGE_DROP,
    events::IMMEDIATE_ITEM_DROP,
];

/// Routes viewer events into [`GameCallbacks`] invocations.
///
/// One dispatcher serves one arena session. [`attach`](Self::attach)
/// subscribes it to a channel and consumes events on a background task;
/// [`inject`](Self::inject) feeds it a single event directly — the same
/// code path, usable by tests and debug tooling without a live channel.
pub struct CommandDispatcher<G: GameCallbacks> {
    callbacks: Arc<G>,
    session: SessionHandle,
}

impl<G: GameCallbacks> CommandDispatcher<G> {
    /// Creates a dispatcher for the given collaborators and session view.
    pub fn new(callbacks: G, session: SessionHandle) -> Self {
        Self {
            callbacks: Arc::new(callbacks),
            session,
        }
    }

    /// Subscribes to the full event vocabulary on `channel` and consumes
    /// events until the channel drops the subscription.
    pub fn attach<C: Connector>(
        &self,
        channel: &EventChannel<C>,
    ) -> JoinHandle<()> {
        let mut rx = channel.subscribe_many(VOCABULARY);
        let callbacks = self.callbacks.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle(&*callbacks, &session, event);
            }
            tracing::debug!("event subscription closed, dispatcher stopping");
        })
    }

    /// Processes one event as if it had arrived on the channel.
    pub fn inject(&self, event: InboundEvent) {
        handle(&*self.callbacks, &self.session, event);
    }
}

/// The single routing point. Never panics and never returns an error:
/// anything malformed is logged and dropped.
fn handle<G: GameCallbacks>(
    callbacks: &G,
    session: &SessionHandle,
    event: InboundEvent,
) {
    tracing::trace!(event = %event.event, "dispatching");
    match event.event.as_str() {
        events::CONNECT => callbacks.on_channel_connected(),
        events::DISCONNECT => callbacks.on_channel_disconnected(),
        events::ERROR => {
            let message = event
                .data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown channel error");
            callbacks.on_channel_error(message);
        }
        events::COUNTDOWN_STARTED => {
            session.mark_countdown_started();
            callbacks.on_countdown_started();
        }
        events::COUNTDOWN_UPDATE => {
            match event.data.get("secondsRemaining").and_then(Value::as_u64) {
                Some(seconds) => callbacks
                    .on_countdown_update(seconds.min(u64::from(u32::MAX)) as u32),
                None => tracing::warn!(
                    data = %event.data,
                    "countdown-update without secondsRemaining"
                ),
            }
        }
        events::ARENA_BEGINS => match session.mark_arena_active() {
            Some(updated) => callbacks.on_arena_game_started(&updated),
            None => {
                tracing::warn!("arena-begins received with no active session")
            }
        },
        events::PLAYER_BOOST_ACTIVATED => {
            let player_id =
                event.data.get("playerId").and_then(Value::as_str);
            let points = event.data.get("points").and_then(Value::as_i64);
            match (player_id, points) {
                (Some(player_id), Some(points)) => {
                    callbacks.on_player_boost_activated(player_id, points);
                }
                _ => tracing::warn!(
                    data = %event.data,
                    "malformed player-boost-activated payload"
                ),
            }
        }
        events::PACKAGE_DROP => {
            let package_id =
                event.data.get("packageId").and_then(Value::as_str);
            let item_id = event.data.get("itemId").and_then(Value::as_str);
            match (package_id, item_id) {
                (Some(package_id), Some(item_id)) => {
                    callbacks.on_package_drop(package_id, item_id);
                }
                _ => tracing::warn!(
                    data = %event.data,
                    "malformed package-drop payload"
                ),
            }
        }
        events::IMMEDIATE_ITEM_DROP => {
            match Command::from_item_drop(&event.data) {
                Ok(command) => dispatch_command(callbacks, command),
                Err(e) => tracing::warn!(
                    error = %e,
                    data = %event.data,
                    "dropping unparseable item-drop event"
                ),
            }
        }
        other => tracing::debug!(event = other, "unrecognized event type"),
    }
}

fn dispatch_command<G: GameCallbacks>(callbacks: &G, command: Command) {
    match command {
        Command::Powerup { kind } => callbacks.on_powerup_command(kind),
        Command::Gemstone { kind, quantity } => {
            // One call per stone, by contract.
            for _ in 0..quantity {
                callbacks.on_gemstone_command(kind);
            }
        }
        Command::Effect { kind } => callbacks.on_effect_command(kind),
    }
}
