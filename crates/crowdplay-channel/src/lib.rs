//! The realtime event channel.
//!
//! This crate keeps one persistent connection to the platform alive for
//! the duration of an arena session and fans incoming events out to
//! subscribers:
//!
//! - [`EventChannel`] — the handle: subscribe, send, connect, disconnect.
//! - A background driver task owns the transport and runs the
//!   reconnection state machine: on an unexpected drop it retries with
//!   exponential backoff (attempt *n* waits 2^n seconds) up to a bounded
//!   number of attempts, then parks in
//!   [`ConnectionState::PermanentlyFailed`].
//! - [`ConnectionState`] transitions are observable through a watch
//!   channel, and the synthesized `connect` / `disconnect` / `error`
//!   lifecycle events flow through the same subscriptions as wire events.
//!
//! An explicit [`disconnect`](EventChannel::disconnect) always wins over
//! a pending reconnect: the retry flag is cleared before the driver is
//! woken, so a backoff in flight is abandoned rather than raced.

mod channel;
mod config;
mod connector;
mod driver;
mod error;
mod state;

pub use channel::EventChannel;
pub use config::{ChannelConfig, DEFAULT_MAX_RECONNECT_ATTEMPTS};
pub use connector::{Connector, WsConnector};
pub use error::ChannelError;
pub use state::ConnectionState;
