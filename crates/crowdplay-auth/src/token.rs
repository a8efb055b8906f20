//! The token pair and its persistence.
//!
//! An authenticated session is proven by two tokens that live and die
//! together: the short-lived access token sent with every authorized
//! request, and the refresh token used to renew it. The invariant enforced
//! here is atomicity — a pair is always read, written, and cleared as a
//! unit, so the store can never hold half a session.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::AuthError;

/// The access/refresh credential pair proving an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Sent as a bearer token with every authorized request.
    pub access_token: String,
    /// Used to renew the access token; never sent on regular requests.
    pub refresh_token: String,
}

/// Persists the token pair between runs.
///
/// Implementations must treat the pair atomically: `store` replaces both
/// tokens, `clear` removes both, and `load` either yields a full pair or
/// nothing.
pub trait TokenStorage: Send + Sync + 'static {
    /// Replaces whatever is stored with the given pair.
    fn store(&self, pair: &TokenPair) -> Result<(), AuthError>;

    /// Reads the stored pair, if any.
    fn load(&self) -> Result<Option<TokenPair>, AuthError>;

    /// Removes the stored pair. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), AuthError>;
}

/// In-memory storage. Sessions do not survive the process; the default for
/// tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    inner: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn store(&self, pair: &TokenPair) -> Result<(), AuthError> {
        *self.inner.lock().expect("token store poisoned") =
            Some(pair.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<TokenPair>, AuthError> {
        Ok(self.inner.lock().expect("token store poisoned").clone())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.inner.lock().expect("token store poisoned") = None;
        Ok(())
    }
}

/// File-backed storage: one JSON document holding the whole pair.
///
/// The file is rewritten in full on every `store` and deleted on `clear`,
/// which is what keeps the pair atomic on disk.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Creates a store backed by the given file path. The file need not
    /// exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn store(&self, pair: &TokenPair) -> Result<(), AuthError> {
        let body = serde_json::to_vec_pretty(pair)
            .map_err(|e| AuthError::Parse(e.to_string()))?;
        fs::write(&self.path, body).map_err(AuthError::Storage)?;
        tracing::debug!(path = %self.path.display(), "token pair persisted");
        Ok(())
    }

    fn load(&self) -> Result<Option<TokenPair>, AuthError> {
        let body = match fs::read(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Storage(e)),
        };
        let pair = serde_json::from_slice(&body)
            .map_err(|e| AuthError::Parse(e.to_string()))?;
        Ok(Some(pair))
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Storage(e)),
        }
    }
}
