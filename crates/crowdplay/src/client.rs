//! `CrowdplayClient` builder and high-level flows.
//!
//! Ties the layers together: auth → arena session → realtime channel →
//! command dispatch. Services are built once here and handed to their
//! consumers explicitly; nothing in the stack reaches for a global.

use std::sync::Arc;

use crowdplay_arena::{ArenaService, GameSession, HttpArenaBackend};
use crowdplay_auth::{
    AuthListener, AuthManager, HttpAuthBackend, LoginOutcome,
    MemoryTokenStorage, TokenStorage, UserProfile,
};
use crowdplay_dispatch::{CommandDispatcher, GameCallbacks};
use crowdplay_transport::WireProtocol;

use crate::CrowdplayError;

/// Builder for configuring a [`CrowdplayClient`].
pub struct CrowdplayClientBuilder {
    api_base_url: String,
    app_id: String,
    game_id: String,
    protocol: WireProtocol,
    token_storage: Option<Box<dyn TokenStorage>>,
    auth_listener: Option<Arc<dyn AuthListener>>,
}

impl CrowdplayClientBuilder {
    /// Creates a builder for the given platform credentials.
    pub fn new(
        api_base_url: impl Into<String>,
        app_id: impl Into<String>,
        game_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            app_id: app_id.into(),
            game_id: game_id.into(),
            protocol: WireProtocol::default(),
            token_storage: None,
            auth_listener: None,
        }
    }

    /// Selects the realtime wire protocol.
    pub fn protocol(mut self, protocol: WireProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Persists tokens through the given storage instead of the default
    /// in-memory store.
    pub fn token_storage(mut self, storage: Box<dyn TokenStorage>) -> Self {
        self.token_storage = Some(storage);
        self
    }

    /// Observes login/logout boundaries.
    pub fn auth_listener(mut self, listener: Arc<dyn AuthListener>) -> Self {
        self.auth_listener = Some(listener);
        self
    }

    /// Builds the client.
    pub fn build(self) -> CrowdplayClient {
        let storage = self
            .token_storage
            .unwrap_or_else(|| Box::new(MemoryTokenStorage::new()));

        let mut auth = AuthManager::new(
            HttpAuthBackend::new(self.api_base_url.clone(), self.app_id.clone()),
            storage,
        );
        if let Some(listener) = self.auth_listener {
            auth = auth.with_listener(listener);
        }
        let auth = Arc::new(auth);

        let arena = ArenaService::new(
            HttpArenaBackend::new(
                self.api_base_url,
                self.app_id.clone(),
                self.game_id.clone(),
            ),
            auth.clone(),
            self.app_id,
            self.game_id,
        )
        .protocol(self.protocol);

        CrowdplayClient { auth, arena }
    }
}

/// The assembled client: one authenticated session, one arena session.
pub struct CrowdplayClient {
    auth: Arc<AuthManager<HttpAuthBackend>>,
    arena: ArenaService<HttpArenaBackend>,
}

impl CrowdplayClient {
    /// Creates a builder.
    pub fn builder(
        api_base_url: impl Into<String>,
        app_id: impl Into<String>,
        game_id: impl Into<String>,
    ) -> CrowdplayClientBuilder {
        CrowdplayClientBuilder::new(api_base_url, app_id, game_id)
    }

    /// Logs in; may require a follow-up [`verify_otp`](Self::verify_otp).
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, CrowdplayError> {
        Ok(self.auth.login(email, password).await?)
    }

    /// Completes an OTP login.
    pub async fn verify_otp(
        &self,
        email: &str,
        code: &str,
    ) -> Result<UserProfile, CrowdplayError> {
        Ok(self.auth.verify_otp(email, code).await?)
    }

    /// Whether an access token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Ends the authenticated session. Any running game keeps its channel
    /// until [`stop_game`](Self::stop_game).
    pub fn logout(&self) {
        self.auth.logout();
    }

    /// Creates a game session for the stream, wires the given callbacks
    /// to the realtime channel, and opens it.
    ///
    /// The dispatcher subscribes before the connection is initiated, so
    /// frames arriving right after the handshake (the `connect` lifecycle
    /// event included) already have somewhere to go.
    ///
    /// Returns the session plus the dispatcher, whose
    /// [`inject`](CommandDispatcher::inject) entry point feeds synthetic
    /// events through the same path wire events take.
    pub async fn start_game<G: GameCallbacks>(
        &self,
        stream_url: &str,
        callbacks: G,
    ) -> Result<(GameSession, CommandDispatcher<G>), CrowdplayError> {
        let session = self.arena.initialize_game(stream_url).await?;
        let dispatcher =
            CommandDispatcher::new(callbacks, self.arena.session());
        if let Some(channel) = self.arena.channel() {
            dispatcher.attach(&channel);
        }
        self.arena.open_channel()?;
        Ok((session, dispatcher))
    }

    /// Tears down the channel and clears the game session.
    pub async fn stop_game(&self) {
        self.arena.disconnect().await;
    }

    /// The auth layer, for profile refresh and listeners.
    pub fn auth(&self) -> &AuthManager<HttpAuthBackend> {
        &self.auth
    }

    /// The arena layer, for boosts, drops, and session details.
    pub fn arena(&self) -> &ArenaService<HttpArenaBackend> {
        &self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assembles_unauthenticated_client() {
        let client = CrowdplayClient::builder(
            "https://api.example.test",
            "app-1",
            "game-1",
        )
        .protocol(WireProtocol::EventSocket)
        .build();

        assert!(!client.is_authenticated());
        assert!(client.arena().channel().is_none());
    }

    #[tokio::test]
    async fn test_start_game_without_login_fails_fast() {
        let client = CrowdplayClient::builder(
            "https://api.example.test",
            "app-1",
            "game-1",
        )
        .build();

        let err = client
            .start_game(
                "https://stream.example.test/live",
                crowdplay_dispatch::NoopCallbacks,
            )
            .await;

        assert!(matches!(
            err,
            Err(CrowdplayError::Arena(
                crowdplay_arena::ArenaError::NotAuthenticated
            ))
        ));
    }
}
