//! Inbound event types and the fixed event-name vocabulary.
//!
//! Every message that arrives on the realtime channel is decoded only far
//! enough to extract its type discriminator; the full raw payload travels
//! with it untouched. The channel routes by name and never needs to
//! understand every payload shape — that is the dispatcher's job, and even
//! there parsing is best-effort.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known event names.
///
/// The channel synthesizes the first three itself; the rest arrive from the
/// platform. Unrecognized names are logged and dropped — non-fatal.
pub mod events {
    /// Channel established (initial connect or successful reconnect).
    pub const CONNECT: &str = "connect";
    /// Channel closed (explicit disconnect or terminal failure).
    pub const DISCONNECT: &str = "disconnect";
    /// Channel-level error (handshake failure, reconnect exhaustion).
    pub const ERROR: &str = "error";

    /// Pre-game countdown has started.
    pub const COUNTDOWN_STARTED: &str = "countdown-started";
    /// Countdown tick (seconds remaining).
    pub const COUNTDOWN_UPDATE: &str = "countdown-update";
    /// The arena round has begun.
    pub const ARENA_BEGINS: &str = "arena-begins";
    /// A viewer boosted a player's score.
    pub const PLAYER_BOOST_ACTIVATED: &str = "player-boost-activated";
    /// A purchased package was scheduled for a future drop.
    pub const PACKAGE_DROP: &str = "package-drop";
    /// A viewer-triggered item must spawn now.
    pub const IMMEDIATE_ITEM_DROP: &str = "immediate-item-drop";
}

/// A decoded wire frame: the discriminator plus whatever rode along with it.
///
/// Both wire strategies (self-describing type-tagged frames and the
/// named-event multiplexing protocol) normalize to this shape, so everything
/// above the transport is strategy-agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// The event-name discriminator.
    pub event: String,
    /// The raw payload, opaque at this layer.
    #[serde(default)]
    pub data: Value,
}

impl Frame {
    /// Builds a frame from a name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// An event as delivered to channel subscribers.
///
/// Transient: produced by the channel, consumed exactly once by whoever
/// subscribed to this event name. Identical in shape to [`Frame`]; the
/// distinction is lifecycle — a `Frame` is on the wire, an `InboundEvent`
/// has been routed.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// The event-name discriminator.
    pub event: String,
    /// The raw payload exactly as received.
    pub data: Value,
}

impl From<Frame> for InboundEvent {
    fn from(frame: Frame) -> Self {
        Self {
            event: frame.event,
            data: frame.data,
        }
    }
}

impl InboundEvent {
    /// Builds an event from a name and payload.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}
