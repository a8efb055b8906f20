//! The arena session service.
//!
//! Sits between the authenticated session and the realtime channel:
//!
//! - [`ArenaService::initialize_game`] creates a server-side session and
//!   builds the realtime channel for the URL the server hands back;
//!   [`ArenaService::open_channel`] dials it once subscribers are wired.
//! - [`ArenaService::boost_player`] / [`ArenaService::drop_immediate_item`]
//!   forward viewer purchases into the running game.
//! - [`SessionHandle`] is the shared view of the cached [`GameSession`]:
//!   the service refreshes it from the server, the dispatcher flips its
//!   countdown/arena flags when the matching events arrive.
//!
//! Every operation requires an access token (via [`TokenSource`]) and
//! fails fast with [`ArenaError::NotAuthenticated`] without one.

mod backend;
mod error;
mod model;
mod service;

pub use backend::{ArenaBackend, HttpArenaBackend};
pub use error::ArenaError;
pub use model::{
    BoostOutcome, DropReceipt, GameSession, GameStatus, RosterEntry,
    ScheduledPackage,
};
pub use service::{ArenaService, SessionHandle, TokenSource};
