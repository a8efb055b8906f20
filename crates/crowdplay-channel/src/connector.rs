//! The connection-establishment seam.
//!
//! The driver re-dials through a [`Connector`] rather than calling
//! [`AnyTransport::connect`] directly, so reconnection tests can script
//! connect outcomes without a server.

use std::future::Future;

use crowdplay_transport::{AnyTransport, TransportError, WireTransport};

use crate::ChannelConfig;

/// Establishes a fresh transport for the configured session.
///
/// Called once for the initial connection and once per reconnect attempt.
pub trait Connector: Send + Sync + 'static {
    /// The transport this connector produces.
    type Transport: WireTransport;

    /// Dials and completes whatever handshake the protocol requires.
    fn connect(
        &self,
        config: &ChannelConfig,
    ) -> impl Future<Output = Result<Self::Transport, TransportError>> + Send;
}

/// The production connector: dials the configured WebSocket protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Transport = AnyTransport;

    async fn connect(
        &self,
        config: &ChannelConfig,
    ) -> Result<AnyTransport, TransportError> {
        AnyTransport::connect(config.protocol, &config.params).await
    }
}
