//! Unified error type for the Crowdplay stack.

use crowdplay_arena::ArenaError;
use crowdplay_auth::AuthError;
use crowdplay_channel::ChannelError;
use crowdplay_protocol::ProtocolError;
use crowdplay_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `crowdplay` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CrowdplayError {
    /// An authentication error (login, tokens, profile).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An arena-session error (game init, boost, drop).
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A realtime-channel error (connect, reconnect exhaustion).
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A wire-transport error (socket, handshake).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol error (payload parsing).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
