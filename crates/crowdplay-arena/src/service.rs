//! The arena session service.
//!
//! Owns the current [`GameSession`] and the realtime channel attached to
//! it. HTTP operations go through the [`ArenaBackend`] seam; the access
//! token comes from a [`TokenSource`] (in production, the auth manager),
//! and every operation fails fast when no token is present.

use std::sync::{Arc, Mutex};

use crowdplay_auth::{AuthBackend, AuthManager};
use crowdplay_channel::{ChannelConfig, Connector, EventChannel, WsConnector};
use crowdplay_transport::{ConnectParams, WireProtocol};

use crate::backend::ArenaBackend;
use crate::{ArenaError, BoostOutcome, DropReceipt, GameSession};

/// Supplies the current access token.
///
/// The arena layer never sees passwords or refresh tokens — just whether
/// an access token exists right now.
pub trait TokenSource: Send + Sync + 'static {
    /// The current access token, if authenticated.
    fn access_token(&self) -> Option<String>;
}

impl<B: AuthBackend> TokenSource for AuthManager<B> {
    fn access_token(&self) -> Option<String> {
        AuthManager::access_token(self)
    }
}

/// Shared, cloneable view of the cached session state.
///
/// The service writes it on init/refresh/teardown; the dispatcher flips
/// the two client-side flags when the matching channel events arrive.
#[derive(Clone, Default)]
pub struct SessionHandle(Arc<Mutex<Option<GameSession>>>);

impl SessionHandle {
    /// A handle pre-populated with a session, for wiring that doesn't go
    /// through [`ArenaService::initialize_game`] (tests, debug tooling).
    pub fn preloaded(session: GameSession) -> Self {
        let handle = Self::default();
        handle.set(session);
        handle
    }

    /// A copy of the current session, if one exists.
    pub fn snapshot(&self) -> Option<GameSession> {
        self.0.lock().expect("session state poisoned").clone()
    }

    /// Records that the pre-game countdown has begun.
    pub fn mark_countdown_started(&self) {
        if let Some(session) =
            self.0.lock().expect("session state poisoned").as_mut()
        {
            session.countdown_started = true;
        }
    }

    /// Records that the arena round is underway and returns the updated
    /// session for collaborators.
    pub fn mark_arena_active(&self) -> Option<GameSession> {
        let mut guard = self.0.lock().expect("session state poisoned");
        let session = guard.as_mut()?;
        session.arena_active = true;
        Some(session.clone())
    }

    fn set(&self, session: GameSession) {
        *self.0.lock().expect("session state poisoned") = Some(session);
    }

    /// Replaces the cached session with a server refresh, carrying over
    /// the client-side flags the server doesn't know about.
    fn refresh(&self, mut fresh: GameSession) -> GameSession {
        let mut guard = self.0.lock().expect("session state poisoned");
        if let Some(current) = guard.as_ref() {
            fresh.countdown_started = current.countdown_started;
            fresh.arena_active = current.arena_active;
        }
        *guard = Some(fresh.clone());
        fresh
    }

    fn clear(&self) {
        self.0.lock().expect("session state poisoned").take();
    }
}

/// Creates sessions, forwards in-game requests, and owns the channel.
///
/// Generic over the channel [`Connector`] purely so tests can swap the
/// wire out; production uses the default.
pub struct ArenaService<A: ArenaBackend, C: Connector + Clone = WsConnector> {
    backend: A,
    tokens: Arc<dyn TokenSource>,
    app_id: String,
    game_id: String,
    protocol: WireProtocol,
    connector: C,
    session: SessionHandle,
    channel: Mutex<Option<Arc<EventChannel<C>>>>,
}

impl<A: ArenaBackend> ArenaService<A, WsConnector> {
    /// A service dialing real WebSockets for its channel.
    pub fn new(
        backend: A,
        tokens: Arc<dyn TokenSource>,
        app_id: impl Into<String>,
        game_id: impl Into<String>,
    ) -> Self {
        Self::with_connector(backend, tokens, app_id, game_id, WsConnector)
    }
}

impl<A: ArenaBackend, C: Connector + Clone> ArenaService<A, C> {
    /// A service using a custom connection strategy for its channel.
    pub fn with_connector(
        backend: A,
        tokens: Arc<dyn TokenSource>,
        app_id: impl Into<String>,
        game_id: impl Into<String>,
        connector: C,
    ) -> Self {
        Self {
            backend,
            tokens,
            app_id: app_id.into(),
            game_id: game_id.into(),
            protocol: WireProtocol::default(),
            connector,
            session: SessionHandle::default(),
            channel: Mutex::new(None),
        }
    }

    /// Selects the wire protocol for the channel.
    pub fn protocol(mut self, protocol: WireProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Creates a game session for the given stream and builds the realtime
    /// channel for it.
    ///
    /// The channel is constructed but *not* dialed: subscribers (the
    /// dispatcher in particular) get a window to register before
    /// [`open_channel`](Self::open_channel) initiates the connection, so
    /// not even the first frame can arrive unrouted. A channel left over
    /// from a previous session is torn down first.
    pub async fn initialize_game(
        &self,
        stream_url: &str,
    ) -> Result<GameSession, ArenaError> {
        let token = self.require_token()?;
        let session = self.backend.initialize_game(&token, stream_url).await?;
        tracing::info!(session = %session.id, "game session created");

        if let Some(stale) = self.channel.lock().expect("channel slot poisoned").take()
        {
            tracing::debug!("tearing down channel from previous session");
            stale.disconnect().await;
        }

        self.session.set(session.clone());

        let config = ChannelConfig::new(ConnectParams {
            channel_url: session.channel_url.clone(),
            access_token: token,
            app_id: self.app_id.clone(),
            game_id: self.game_id.clone(),
            arena_game_id: session.id.clone(),
        })
        .protocol(self.protocol);

        let channel =
            Arc::new(EventChannel::with_connector(config, self.connector.clone()));
        *self.channel.lock().expect("channel slot poisoned") = Some(channel);

        Ok(session)
    }

    /// Initiates the channel connection for the current session.
    ///
    /// The connection is *initiated*, not awaited: this returns as soon
    /// as the driver is running, and connection problems surface later
    /// through the channel's own state and error events. A no-op when no
    /// session has been initialized.
    pub fn open_channel(&self) -> Result<(), ArenaError> {
        let channel =
            self.channel.lock().expect("channel slot poisoned").clone();
        match channel {
            Some(channel) => Ok(channel.connect()?),
            None => {
                tracing::warn!("open_channel called without a game session");
                Ok(())
            }
        }
    }

    /// Boosts a player's score on behalf of the viewer.
    pub async fn boost_player(
        &self,
        game_id: &str,
        player_id: &str,
        amount: u32,
        username: &str,
    ) -> Result<BoostOutcome, ArenaError> {
        let token = self.require_token()?;
        self.backend
            .boost_player(&token, game_id, player_id, amount, username)
            .await
    }

    /// Requests an immediate item drop.
    pub async fn drop_immediate_item(
        &self,
        game_id: &str,
        item_id: &str,
        target_player: &str,
    ) -> Result<DropReceipt, ArenaError> {
        let token = self.require_token()?;
        self.backend
            .drop_item(&token, game_id, item_id, target_player)
            .await
    }

    /// Refreshes the cached session from the server.
    ///
    /// The refresh is wholesale except for the client-side flags, which
    /// only channel events own.
    pub async fn game_details(
        &self,
        game_id: &str,
    ) -> Result<GameSession, ArenaError> {
        let token = self.require_token()?;
        let fresh = self.backend.game_details(&token, game_id).await?;
        Ok(self.session.refresh(fresh))
    }

    /// Tears down the channel and clears the session. Idempotent.
    pub async fn disconnect(&self) {
        let channel =
            self.channel.lock().expect("channel slot poisoned").take();
        if let Some(channel) = channel {
            channel.disconnect().await;
        }
        self.session.clear();
    }

    /// The channel for the current session, for subscribing.
    pub fn channel(&self) -> Option<Arc<EventChannel<C>>> {
        self.channel.lock().expect("channel slot poisoned").clone()
    }

    /// A shared handle to the cached session state.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    fn require_token(&self) -> Result<String, ArenaError> {
        self.tokens
            .access_token()
            .ok_or(ArenaError::NotAuthenticated)
    }
}
