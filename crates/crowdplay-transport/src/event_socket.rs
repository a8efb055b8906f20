//! Named-event multiplexing transport.
//!
//! The platform's richer wire protocol. Every message is an
//! `{ "event": ..., "data": ... }` pair, and the connection is only usable
//! after an explicit exchange:
//!
//! ```text
//! client ──auth {token, gameId, appId, arenaGameId}──→ server
//! client ←───────────────auth-ack────────────────────  server
//! client ──join {room}───────────────────────────────→ server
//! ```
//!
//! Because a reconnecting channel constructs a fresh transport, the auth
//! and join messages are naturally re-sent on every reconnect.
//!
//! Control traffic (`ping`, `join-ack`) is consumed inside [`recv`] and
//! never surfaces to the channel. Servers may also batch several frames
//! into one message as a JSON array; the batch is buffered and drained one
//! frame per `recv` call.
//!
//! [`recv`]: EventSocketTransport::recv

use std::collections::VecDeque;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

use crowdplay_protocol::Frame;

use crate::{ConnectParams, TransportError, WireTransport};

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// How long the server gets to acknowledge the auth message.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// A [`WireTransport`] speaking the named-event protocol.
pub struct EventSocketTransport {
    ws: WsStream,
    /// Frames decoded from a batch message, drained before the socket is
    /// polled again.
    buffered: VecDeque<Frame>,
}

impl EventSocketTransport {
    /// Connects, authenticates, and joins the arena room.
    ///
    /// # Errors
    /// - [`TransportError::Connect`] — the socket could not be established.
    /// - [`TransportError::Handshake`] — the server rejected the auth
    ///   payload, closed during the exchange, or did not ack in time.
    pub async fn connect(
        params: &ConnectParams,
    ) -> Result<Self, TransportError> {
        let (ws, _) = tokio_tungstenite::connect_async(&params.channel_url)
            .await
            .map_err(TransportError::Connect)?;

        let mut transport = Self {
            ws,
            buffered: VecDeque::new(),
        };

        transport
            .send(&Frame::new(
                "auth",
                json!({
                    "token": params.access_token,
                    "gameId": params.game_id,
                    "appId": params.app_id,
                    "arenaGameId": params.arena_game_id,
                }),
            ))
            .await?;

        transport.await_auth_ack().await?;

        transport
            .send(&Frame::new(
                "join",
                json!({ "room": params.arena_game_id }),
            ))
            .await?;

        tracing::debug!(
            url = %params.channel_url,
            room = %params.arena_game_id,
            "event socket authenticated and joined"
        );
        Ok(transport)
    }

    /// Waits for the server to acknowledge the auth message.
    async fn await_auth_ack(&mut self) -> Result<(), TransportError> {
        let ack = tokio::time::timeout(HANDSHAKE_TIMEOUT, self.next_frame())
            .await
            .map_err(|_| {
                TransportError::Handshake("auth ack timed out".into())
            })?;

        match ack? {
            Some(frame) if frame.event == "auth-ack" => Ok(()),
            Some(frame) if frame.event == "auth-error" => {
                let reason = frame
                    .data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("authentication rejected");
                Err(TransportError::Handshake(reason.to_string()))
            }
            Some(frame) => Err(TransportError::Handshake(format!(
                "expected auth-ack, got `{}`",
                frame.event
            ))),
            None => Err(TransportError::Handshake(
                "connection closed during handshake".into(),
            )),
        }
    }

    /// Pulls the next decodable frame off the socket, replying to pings
    /// along the way. Does not consult the batch buffer.
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            let msg = match self.ws.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(TransportError::Receive(e)),
                None => return Ok(None),
            };

            let text = match msg {
                Message::Text(text) => text.to_string(),
                Message::Binary(data) => {
                    String::from_utf8_lossy(&data).into_owned()
                }
                Message::Close(_) => return Ok(None),
                _ => continue,
            };

            match serde_json::from_str::<Value>(&text) {
                // Batched frames: queue them all, hand back the first.
                Ok(Value::Array(items)) => {
                    for item in items {
                        match serde_json::from_value::<Frame>(item) {
                            Ok(frame) => self.buffered.push_back(frame),
                            Err(e) => tracing::debug!(
                                error = %e,
                                "dropping undecodable frame in batch"
                            ),
                        }
                    }
                    if let Some(frame) = self.buffered.pop_front() {
                        return Ok(Some(frame));
                    }
                }
                Ok(value) => match serde_json::from_value::<Frame>(value) {
                    Ok(frame) => {
                        if frame.event == "ping" {
                            self.send(&Frame::new("pong", Value::Null))
                                .await?;
                            continue;
                        }
                        return Ok(Some(frame));
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "dropping undecodable frame");
                    }
                },
                Err(e) => {
                    tracing::debug!(error = %e, "dropping non-JSON message");
                }
            }
        }
    }
}

impl WireTransport for EventSocketTransport {
    async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let text = serde_json::to_string(frame)
            .expect("Frame always serializes");
        self.ws
            .send(Message::Text(text.into()))
            .await
            .map_err(TransportError::Send)
    }

    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            // Drain the batch buffer before touching the socket.
            if let Some(frame) = self.buffered.pop_front() {
                if frame.event == "join-ack" {
                    tracing::debug!("room join acknowledged");
                    continue;
                }
                return Ok(Some(frame));
            }

            match self.next_frame().await? {
                Some(frame) if frame.event == "join-ack" => {
                    tracing::debug!("room join acknowledged");
                }
                other => return Ok(other),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.ws.close(None).await.map_err(TransportError::Send)
    }
}
