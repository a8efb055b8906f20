//! Wire transport strategies for the Crowdplay realtime channel.
//!
//! Two protocols can back the persistent connection to the platform, and
//! both hide behind the same [`WireTransport`] trait so the channel above
//! never cares which one is configured:
//!
//! - [`RawFrameTransport`] — self-describing, type-tagged JSON frames over
//!   a plain WebSocket. Credentials travel in the connect URL; every frame
//!   carries its own discriminator.
//! - [`EventSocketTransport`] — a named-event multiplexing protocol with an
//!   explicit authentication handshake (token + game/app identifiers) at
//!   connect time, followed by an explicit room-join message. Control
//!   frames (pings, acks) are consumed internally and batched event frames
//!   are drained one at a time.
//!
//! The concrete strategy is selected with [`WireProtocol`] and constructed
//! through [`AnyTransport::connect`].

mod error;
mod event_socket;
mod raw;

pub use error::TransportError;
pub use event_socket::EventSocketTransport;
pub use raw::RawFrameTransport;

use std::future::Future;

use crowdplay_protocol::Frame;

/// Everything a transport needs to establish an authorized connection.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    /// The channel URL returned by game init (`ws://` or `wss://`).
    pub channel_url: String,
    /// The current access token.
    pub access_token: String,
    /// Application identifier issued by the platform.
    pub app_id: String,
    /// Game identifier issued by the platform.
    pub game_id: String,
    /// The specific arena session to join.
    pub arena_game_id: String,
}

/// Which wire protocol backs the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireProtocol {
    /// Self-describing type-tagged frames ([`RawFrameTransport`]).
    #[default]
    RawFrames,
    /// Named-event multiplexing with an auth handshake
    /// ([`EventSocketTransport`]).
    EventSocket,
}

/// A connected, bidirectional frame stream.
///
/// Implementations own their socket; the channel driver is the single
/// caller, so methods take `&mut self` and no internal locking is needed.
/// Methods are declared as `impl Future + Send` (implementations just
/// write `async fn`) so the driver task that polls them can be spawned.
pub trait WireTransport: Send + 'static {
    /// Sends one frame to the platform.
    fn send(
        &mut self,
        frame: &Frame,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next event frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. Protocol
    /// control traffic never surfaces here — strategies that have it
    /// handle it internally.
    fn recv(
        &mut self,
    ) -> impl Future<Output = Result<Option<Frame>, TransportError>> + Send;

    /// Closes the connection.
    fn close(
        &mut self,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A [`WireTransport`] whose concrete strategy was chosen at runtime.
pub enum AnyTransport {
    /// Type-tagged frames.
    Raw(RawFrameTransport),
    /// Named-event multiplexing.
    EventSocket(EventSocketTransport),
}

impl AnyTransport {
    /// Connects using the given strategy.
    ///
    /// # Errors
    /// Returns [`TransportError::Connect`] when the socket cannot be
    /// established and [`TransportError::Handshake`] when the event-socket
    /// auth exchange is rejected or times out.
    pub async fn connect(
        protocol: WireProtocol,
        params: &ConnectParams,
    ) -> Result<Self, TransportError> {
        match protocol {
            WireProtocol::RawFrames => {
                RawFrameTransport::connect(params).await.map(Self::Raw)
            }
            WireProtocol::EventSocket => EventSocketTransport::connect(params)
                .await
                .map(Self::EventSocket),
        }
    }
}

impl WireTransport for AnyTransport {
    async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        match self {
            Self::Raw(t) => t.send(frame).await,
            Self::EventSocket(t) => t.send(frame).await,
        }
    }

    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        match self {
            Self::Raw(t) => t.recv().await,
            Self::EventSocket(t) => t.recv().await,
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self {
            Self::Raw(t) => t.close().await,
            Self::EventSocket(t) => t.close().await,
        }
    }
}
