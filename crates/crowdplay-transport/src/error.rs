//! Error types for the transport layer.

use tokio_tungstenite::tungstenite::Error as WsError;

/// Errors that can occur on the wire.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Establishing the socket failed (DNS, TCP, TLS, or the WebSocket
    /// upgrade itself).
    #[error("connect failed: {0}")]
    Connect(#[source] WsError),

    /// The event-socket authentication exchange was rejected or timed out.
    #[error("handshake rejected: {0}")]
    Handshake(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] WsError),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] WsError),
}
