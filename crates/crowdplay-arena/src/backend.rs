//! The HTTP seam for in-game operations.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{ArenaError, BoostOutcome, DropReceipt, GameSession};

/// Reaches the platform's game endpoints. Every call is authorized with
/// the caller-supplied access token; the service layer is responsible for
/// having one.
pub trait ArenaBackend: Send + Sync + 'static {
    /// `POST /games/init` — creates a session for the given stream.
    fn initialize_game(
        &self,
        access_token: &str,
        stream_url: &str,
    ) -> impl Future<Output = Result<GameSession, ArenaError>> + Send;

    /// `POST /games/boost/player/{game_id}/{player_id}`.
    fn boost_player(
        &self,
        access_token: &str,
        game_id: &str,
        player_id: &str,
        amount: u32,
        username: &str,
    ) -> impl Future<Output = Result<BoostOutcome, ArenaError>> + Send;

    /// `POST /items/drop/{game_id}`.
    fn drop_item(
        &self,
        access_token: &str,
        game_id: &str,
        item_id: &str,
        target_player: &str,
    ) -> impl Future<Output = Result<DropReceipt, ArenaError>> + Send;

    /// `GET /games/{game_id}` — the current server-side session state.
    fn game_details(
        &self,
        access_token: &str,
        game_id: &str,
    ) -> impl Future<Output = Result<GameSession, ArenaError>> + Send;
}

async fn decode_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ArenaError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message").and_then(Value::as_str).map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(ArenaError::Status {
            code: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ArenaError::Parse(e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitRequest<'a> {
    stream_url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoostRequest<'a> {
    amount: u32,
    username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DropRequest<'a> {
    item_id: &'a str,
    target_player: &'a str,
}

/// [`ArenaBackend`] over the platform's REST API.
#[derive(Debug, Clone)]
pub struct HttpArenaBackend {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    game_id: String,
}

impl HttpArenaBackend {
    /// Creates a backend for the given API base URL and identifiers. The
    /// `game_id` here is the platform-issued game registration, not an
    /// individual session id.
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        game_id: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            app_id: app_id.into(),
            game_id: game_id.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    fn authorized(
        &self,
        req: reqwest::RequestBuilder,
        access_token: &str,
    ) -> reqwest::RequestBuilder {
        req.bearer_auth(access_token)
            .header("x-app-id", &self.app_id)
            .header("x-game-id", &self.game_id)
    }
}

impl ArenaBackend for HttpArenaBackend {
    async fn initialize_game(
        &self,
        access_token: &str,
        stream_url: &str,
    ) -> Result<GameSession, ArenaError> {
        tracing::debug!(stream_url, "initializing game session");
        let req = self.http.post(self.url("/games/init"));
        let resp = self
            .authorized(req, access_token)
            .json(&InitRequest { stream_url })
            .send()
            .await?;
        decode_response(resp).await
    }

    async fn boost_player(
        &self,
        access_token: &str,
        game_id: &str,
        player_id: &str,
        amount: u32,
        username: &str,
    ) -> Result<BoostOutcome, ArenaError> {
        let req = self
            .http
            .post(self.url(&format!("/games/boost/player/{game_id}/{player_id}")));
        let resp = self
            .authorized(req, access_token)
            .json(&BoostRequest { amount, username })
            .send()
            .await?;
        decode_response(resp).await
    }

    async fn drop_item(
        &self,
        access_token: &str,
        game_id: &str,
        item_id: &str,
        target_player: &str,
    ) -> Result<DropReceipt, ArenaError> {
        let req = self.http.post(self.url(&format!("/items/drop/{game_id}")));
        let resp = self
            .authorized(req, access_token)
            .json(&DropRequest {
                item_id,
                target_player,
            })
            .send()
            .await?;
        decode_response(resp).await
    }

    async fn game_details(
        &self,
        access_token: &str,
        game_id: &str,
    ) -> Result<GameSession, ArenaError> {
        let req = self.http.get(self.url(&format!("/games/{game_id}")));
        let resp = self.authorized(req, access_token).send().await?;
        decode_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies_use_camel_case() {
        let body = serde_json::to_value(InitRequest {
            stream_url: "https://stream.example.test/live",
        })
        .unwrap();
        assert_eq!(body["streamUrl"], "https://stream.example.test/live");

        let body = serde_json::to_value(DropRequest {
            item_id: "gem",
            target_player: "p1",
        })
        .unwrap();
        assert_eq!(body["itemId"], "gem");
        assert_eq!(body["targetPlayer"], "p1");
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let backend =
            HttpArenaBackend::new("https://api.example.test/", "app", "game");
        assert_eq!(
            backend.url("/games/init"),
            "https://api.example.test/games/init"
        );
    }
}
