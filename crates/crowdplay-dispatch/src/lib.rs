//! The command dispatcher: the terminal consumer of viewer events.
//!
//! Subscribes to the fixed event vocabulary on the realtime channel,
//! parses each payload into a typed [`Command`], and invokes the game's
//! [`GameCallbacks`]. Input here is untrusted and best-effort: every
//! parse or routing problem is logged and swallowed — nothing propagates
//! past the dispatcher, and a malformed payload never takes the event
//! loop down with it.

mod callbacks;
mod dispatcher;

pub use callbacks::{GameCallbacks, NoopCallbacks};
pub use dispatcher::CommandDispatcher;
