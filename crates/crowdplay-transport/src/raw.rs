//! Self-describing type-tagged frame transport.
//!
//! The simplest of the two strategies: every WebSocket text message is a
//! JSON object whose `type` field is the event discriminator and whose
//! entire body is the payload. There is no connect-time handshake —
//! credentials ride along as query parameters on the channel URL, so the
//! platform authorizes the upgrade request itself.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use crowdplay_protocol::Frame;

use crate::{ConnectParams, TransportError, WireTransport};

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// A [`WireTransport`] speaking type-tagged frames.
pub struct RawFrameTransport {
    ws: WsStream,
}

impl RawFrameTransport {
    /// Connects to the channel URL with credentials as query parameters.
    pub async fn connect(
        params: &ConnectParams,
    ) -> Result<Self, TransportError> {
        let url = authorized_url(params);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .map_err(TransportError::Connect)?;
        tracing::debug!(url = %params.channel_url, "raw frame transport connected");
        Ok(Self { ws })
    }
}

impl WireTransport for RawFrameTransport {
    async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let body = tag_frame(frame);
        let text = body.to_string();
        self.ws
            .send(Message::Text(text.into()))
            .await
            .map_err(TransportError::Send)
    }

    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
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
                _ => continue, // ping/pong/raw frame
            };

            let value: Value = match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    tracing::debug!(error = %e, "dropping undecodable frame");
                    continue;
                }
            };

            // Decode only far enough to pull the discriminator out; the
            // whole object stays attached as the raw payload.
            match value.get("type").and_then(Value::as_str) {
                Some(event) => {
                    return Ok(Some(Frame::new(event.to_string(), value)));
                }
                None => {
                    tracing::debug!("dropping frame without type tag");
                    continue;
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.ws.close(None).await.map_err(TransportError::Send)
    }
}

/// Appends token and identifier query parameters to the channel URL.
///
/// A bare-authority URL (`ws://host:port`) gets a `/` path inserted
/// first: a query glued straight onto the authority is not a valid
/// request target, and the server would reject the upgrade.
fn authorized_url(params: &ConnectParams) -> String {
    let mut url = params.channel_url.clone();
    if let Some(scheme_end) = url.find("://") {
        let authority = scheme_end + 3;
        match url[authority..].find(['/', '?']).map(|i| authority + i) {
            Some(i) if url.as_bytes()[i] == b'?' => url.insert(i, '/'),
            None => url.push('/'),
            Some(_) => {}
        }
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}token={}&appId={}&gameId={}&arenaGameId={}",
        url,
        sep,
        params.access_token,
        params.app_id,
        params.game_id,
        params.arena_game_id,
    )
}

/// Produces the on-wire object for an outbound frame.
///
/// Object payloads get the `type` tag injected alongside their own fields;
/// anything else is wrapped so the tag always has somewhere to live.
fn tag_frame(frame: &Frame) -> Value {
    match &frame.data {
        Value::Object(fields) => {
            let mut fields = fields.clone();
            fields.insert("type".into(), Value::String(frame.event.clone()));
            Value::Object(fields)
        }
        other => serde_json::json!({
            "type": frame.event,
            "data": other,
        }),
    }
}
