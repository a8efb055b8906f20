//! Session lifecycle: login, OTP verification, profile cache, logout.
//!
//! [`AuthManager`] owns the in-memory session (token pair + cached
//! profile), keeps the [`TokenStorage`] in sync with it, and tells the
//! [`AuthListener`] about session boundaries. It is the only writer of
//! session state; everything else reads through its accessors.

use std::sync::{Arc, Mutex};

use crate::backend::AuthBackend;
use crate::hash::hash_password;
use crate::{AuthError, TokenPair, TokenStorage, UserProfile};

/// What a login attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Credentials accepted, but a one-time code must be verified before
    /// a session exists. Follow up with [`AuthManager::verify_otp`].
    OtpRequired,
    /// A full session was established.
    LoggedIn(UserProfile),
}

/// Observes session boundaries.
///
/// All methods default to no-ops so implementors only override what they
/// care about.
pub trait AuthListener: Send + Sync + 'static {
    /// A session was established (login or OTP verification).
    fn on_authenticated(&self, _profile: &UserProfile) {}

    /// The session ended via [`AuthManager::logout`].
    fn on_logged_out(&self) {}
}

/// The do-nothing listener; the default when none is installed.
#[derive(Debug, Default)]
pub struct NoopAuthListener;

impl AuthListener for NoopAuthListener {}

/// Manages the authenticated session against a pluggable [`AuthBackend`].
pub struct AuthManager<B: AuthBackend> {
    backend: B,
    storage: Box<dyn TokenStorage>,
    listener: Arc<dyn AuthListener>,
    tokens: Mutex<Option<TokenPair>>,
    profile: Mutex<Option<UserProfile>>,
}

impl<B: AuthBackend> AuthManager<B> {
    /// Creates a manager and restores any persisted token pair.
    ///
    /// A failure to read persisted tokens is logged and treated as "no
    /// session" rather than propagated — a corrupt token file must not
    /// brick startup.
    pub fn new(backend: B, storage: Box<dyn TokenStorage>) -> Self {
        let restored = match storage.load() {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "could not restore persisted tokens");
                None
            }
        };
        if restored.is_some() {
            tracing::info!("restored persisted session tokens");
        }

        Self {
            backend,
            storage,
            listener: Arc::new(NoopAuthListener),
            tokens: Mutex::new(restored),
            profile: Mutex::new(None),
        }
    }

    /// Installs a session listener, replacing the default no-op one.
    pub fn with_listener(mut self, listener: Arc<dyn AuthListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Logs in with an email and *plaintext* password.
    ///
    /// The password is digested before it leaves this function; the
    /// plaintext is never sent or stored. Depending on the account, the
    /// result is either a full session or a request for an OTP code.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let digest = hash_password(password)?;
        let resp = self.backend.login(email, &digest).await?;

        if resp.requires_otp {
            tracing::info!(email, "login requires otp verification");
            return Ok(LoginOutcome::OtpRequired);
        }

        // Not an OTP flow, so the response must carry the whole session.
        let profile = resp.user.ok_or(AuthError::Parse(
            "login response missing user".into(),
        ))?;
        let pair = match (resp.access_token, resp.refresh_token) {
            (Some(access_token), Some(refresh_token)) => TokenPair {
                access_token,
                refresh_token,
            },
            _ => {
                return Err(AuthError::Parse(
                    "login response missing token pair".into(),
                ))
            }
        };

        self.install_session(profile.clone(), pair);
        Ok(LoginOutcome::LoggedIn(profile))
    }

    /// Completes an OTP login with the emailed code.
    pub async fn verify_otp(
        &self,
        email: &str,
        code: &str,
    ) -> Result<UserProfile, AuthError> {
        let resp = self.backend.verify_otp(email, code).await?;
        let pair = TokenPair {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
        };
        self.install_session(resp.user.clone(), pair);
        Ok(resp.user)
    }

    /// Fetches a fresh profile from the backend and replaces the cache
    /// with it wholesale.
    ///
    /// Fails fast with [`AuthError::NotAuthenticated`] when no session
    /// exists — the backend is not contacted in that case.
    pub async fn profile(&self) -> Result<UserProfile, AuthError> {
        let token = self.access_token().ok_or(AuthError::NotAuthenticated)?;
        let fresh = self.backend.fetch_profile(&token).await?;
        *self.profile.lock().expect("profile cache poisoned") =
            Some(fresh.clone());
        Ok(fresh)
    }

    /// Ends the session: clears tokens (memory and storage) and the
    /// cached profile. Idempotent; the listener is only notified when a
    /// session actually existed.
    pub fn logout(&self) {
        let had_session = self
            .tokens
            .lock()
            .expect("token state poisoned")
            .take()
            .is_some();
        self.profile.lock().expect("profile cache poisoned").take();

        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "could not clear persisted tokens");
        }

        if had_session {
            tracing::info!("logged out");
            self.listener.on_logged_out();
        }
    }

    /// Whether a token pair is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.lock().expect("token state poisoned").is_some()
    }

    /// The current access token, if authenticated.
    pub fn access_token(&self) -> Option<String> {
        self.tokens
            .lock()
            .expect("token state poisoned")
            .as_ref()
            .map(|p| p.access_token.clone())
    }

    /// The last profile seen, without touching the network.
    pub fn cached_profile(&self) -> Option<UserProfile> {
        self.profile.lock().expect("profile cache poisoned").clone()
    }

    /// Swaps in a fresh session and notifies the listener exactly once.
    fn install_session(&self, profile: UserProfile, pair: TokenPair) {
        if let Err(e) = self.storage.store(&pair) {
            // The in-memory session still works; persistence is best effort.
            tracing::warn!(error = %e, "could not persist token pair");
        }
        *self.tokens.lock().expect("token state poisoned") = Some(pair);
        *self.profile.lock().expect("profile cache poisoned") =
            Some(profile.clone());

        tracing::info!(user = %profile.username, "session established");
        self.listener.on_authenticated(&profile);
    }
}
