//! Authentication for Crowdplay.
//!
//! This crate handles everything between a viewer-facing login form and an
//! authorized API session:
//!
//! 1. **Credential hashing** — the password never leaves the process in
//!    plaintext ([`hash_password`]).
//! 2. **Token bookkeeping** — the access/refresh pair is read, written,
//!    and cleared strictly as a unit ([`TokenPair`], [`TokenStorage`]).
//! 3. **Session management** — login, one-time-code verification, profile
//!    refresh, logout ([`AuthManager`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Arena layer (above)  ← reads the access token for authorized requests
//!     ↕
//! Auth layer (this crate)  ← owns the token pair and current profile
//!     ↕
//! Platform HTTP API (below)  ← reached through the AuthBackend seam
//! ```
//!
//! The HTTP surface is behind the [`AuthBackend`] trait so tests (and
//! alternative platforms) can swap the wire out without touching session
//! logic.

mod backend;
mod error;
mod hash;
mod manager;
mod profile;
mod token;

pub use backend::{AuthBackend, HttpAuthBackend, LoginResponse, OtpResponse};
pub use error::AuthError;
pub use hash::hash_password;
pub use manager::{AuthListener, AuthManager, LoginOutcome, NoopAuthListener};
pub use profile::{UserProfile, WalletInfo};
pub use token::{FileTokenStorage, MemoryTokenStorage, TokenPair, TokenStorage};
