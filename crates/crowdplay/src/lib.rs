//! # Crowdplay
//!
//! Turns live-stream viewer actions into in-game events.
//!
//! Crowdplay connects a running game to its audience: viewers buy boosts,
//! gemstones, and effects on the streaming platform, and the stack here
//! authenticates the player, creates an arena session, holds a realtime
//! channel open (reconnecting with bounded backoff when it drops), and
//! dispatches each viewer event as a typed command into the game.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crowdplay::prelude::*;
//!
//! # async fn run() -> Result<(), CrowdplayError> {
//! let client = CrowdplayClient::builder(
//!     "https://api.platform.example",
//!     "my-app-id",
//!     "my-game-id",
//! )
//! .build();
//!
//! client.login("player@example.com", "hunter2").await?;
//! let (session, _dispatcher) = client
//!     .start_game("https://stream.example/live", MyCallbacks)
//!     .await?;
//! # Ok(())
//! # }
//! # struct MyCallbacks;
//! # impl GameCallbacks for MyCallbacks {}
//! ```

mod client;
mod error;
mod telemetry;

pub use client::{CrowdplayClient, CrowdplayClientBuilder};
pub use error::CrowdplayError;
pub use telemetry::init_tracing;

/// The types most integrations need, in one import.
pub mod prelude {
    pub use crate::{CrowdplayClient, CrowdplayClientBuilder, CrowdplayError};
    pub use crowdplay_arena::{ArenaService, GameSession, GameStatus};
    pub use crowdplay_auth::{
        AuthListener, AuthManager, FileTokenStorage, LoginOutcome,
        MemoryTokenStorage, TokenPair, UserProfile,
    };
    pub use crowdplay_channel::{ChannelConfig, ConnectionState, EventChannel};
    pub use crowdplay_dispatch::{CommandDispatcher, GameCallbacks};
    pub use crowdplay_protocol::{
        events, Command, EffectKind, GemstoneKind, InboundEvent, PowerupKind,
    };
    pub use crowdplay_transport::WireProtocol;
}
