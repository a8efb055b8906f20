//! The background task that owns the transport.
//!
//! One driver runs per `connect()` call. It dials, pumps frames between
//! the wire and the route table, and — when the connection drops out from
//! under it — walks the bounded exponential backoff schedule: attempt *n*
//! waits 2^n seconds (2s, 4s, 8s, 16s, 32s), and once the ceiling is
//! passed the channel parks in `PermanentlyFailed`.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crowdplay_protocol::{events, Frame};
use crowdplay_transport::{TransportError, WireTransport};
use serde_json::json;
use tokio::sync::mpsc;

use crate::channel::Shared;
use crate::connector::Connector;
use crate::{ChannelError, ConnectionState};

/// Why the frame pump stopped.
enum PumpEnd {
    /// `disconnect()` was called.
    Shutdown,
    /// The wire closed or errored.
    ConnectionLost,
}

pub(crate) async fn run<C: Connector>(
    connector: Arc<C>,
    shared: Arc<Shared>,
    mut outbound_rx: mpsc::UnboundedReceiver<Frame>,
) {
    shared.set_state(ConnectionState::Connecting);
    let mut transport = match connector.connect(&shared.config).await {
        Ok(t) => t,
        Err(e) => {
            // The very first dial failing is not retried: the caller finds
            // out immediately instead of behind half a minute of backoff.
            tracing::warn!(error = %e, "initial connection failed");
            shared.emit(events::ERROR, json!({ "message": e.to_string() }));
            shared.set_state(ConnectionState::Disconnected);
            return;
        }
    };
    shared.set_state(ConnectionState::Connected);
    shared.emit(events::CONNECT, json!(null));
    tracing::info!("channel connected");

    let max_attempts = shared.config.max_reconnect_attempts;
    let mut attempt: u32 = 0;

    loop {
        match pump(&mut transport, &shared, &mut outbound_rx).await {
            PumpEnd::Shutdown => {
                if let Err(e) = transport.close().await {
                    tracing::debug!(error = %e, "close after shutdown failed");
                }
                shared.emit(events::DISCONNECT, json!(null));
                shared.set_state(ConnectionState::Disconnected);
                tracing::info!("channel disconnected");
                return;
            }
            PumpEnd::ConnectionLost => {
                shared.emit(events::DISCONNECT, json!(null));
            }
        }

        if !shared.auto_reconnect.load(Ordering::SeqCst) {
            shared.set_state(ConnectionState::Disconnected);
            return;
        }

        // Reconnect with exponential backoff until one dial succeeds.
        loop {
            attempt += 1;
            if attempt > max_attempts {
                let err = ChannelError::Exhausted {
                    attempts: max_attempts,
                };
                tracing::error!(%err, "giving up on reconnection");
                shared.emit(
                    events::ERROR,
                    json!({ "message": err.to_string() }),
                );
                shared.set_state(ConnectionState::PermanentlyFailed);
                return;
            }
            shared.set_state(ConnectionState::Reconnecting { attempt });

            let delay = Duration::from_secs(1u64 << attempt);
            tracing::info!(attempt, delay_secs = delay.as_secs(), "reconnecting");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shared.shutdown.notified() => {
                    shared.set_state(ConnectionState::Disconnected);
                    return;
                }
            }
            // disconnect() may have landed while we slept.
            if !shared.auto_reconnect.load(Ordering::SeqCst) {
                shared.set_state(ConnectionState::Disconnected);
                return;
            }

            match connector.connect(&shared.config).await {
                Ok(t) => {
                    transport = t;
                    attempt = 0;
                    shared.set_state(ConnectionState::Connected);
                    shared.emit(events::CONNECT, json!(null));
                    tracing::info!("channel reconnected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "reconnect failed");
                }
            }
        }
    }
}

/// Pumps frames in both directions until the wire drops or shutdown is
/// requested.
async fn pump<T: WireTransport>(
    transport: &mut T,
    shared: &Shared,
    outbound_rx: &mut mpsc::UnboundedReceiver<Frame>,
) -> PumpEnd {
    enum Step {
        Shutdown,
        Outbound(Option<Frame>),
        Inbound(Result<Option<Frame>, TransportError>),
    }

    loop {
        let step = tokio::select! {
            _ = shared.shutdown.notified() => Step::Shutdown,
            frame = outbound_rx.recv() => Step::Outbound(frame),
            result = transport.recv() => Step::Inbound(result),
        };

        match step {
            Step::Shutdown => return PumpEnd::Shutdown,
            // The handle dropped its sender; treat like a shutdown.
            Step::Outbound(None) => return PumpEnd::Shutdown,
            Step::Outbound(Some(frame)) => {
                if let Err(e) = transport.send(&frame).await {
                    tracing::warn!(error = %e, "send failed, connection lost");
                    return PumpEnd::ConnectionLost;
                }
            }
            Step::Inbound(Ok(Some(frame))) => shared.dispatch(frame.into()),
            Step::Inbound(Ok(None)) => {
                tracing::info!("server closed the connection");
                return PumpEnd::ConnectionLost;
            }
            Step::Inbound(Err(e)) => {
                tracing::warn!(error = %e, "receive failed, connection lost");
                shared.emit(
                    events::ERROR,
                    json!({ "message": e.to_string() }),
                );
                return PumpEnd::ConnectionLost;
            }
        }
    }
}
