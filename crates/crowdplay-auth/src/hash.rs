//! One-way credential hashing.
//!
//! The platform never sees a plaintext password: the client hashes it
//! deterministically and sends the digest in its place. Determinism is the
//! whole point here — the same password must always produce the same
//! digest so the server can compare stored digests, which is why this is a
//! bare SHA-256 rather than a salted KDF (the server applies its own
//! storage-side hardening).

use ring::digest::{digest, SHA256};

use crate::AuthError;

/// Hashes a password into a lowercase hex SHA-256 digest.
///
/// Deterministic and side-effect free: `hash_password(p) == hash_password(p)`
/// for any `p`, across calls and across processes.
///
/// # Errors
/// Returns [`AuthError::InvalidArgument`] when the password is empty or
/// whitespace-only — an empty digest would otherwise look like a valid
/// credential downstream.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.trim().is_empty() {
        return Err(AuthError::InvalidArgument(
            "password must not be empty".into(),
        ));
    }

    let digest = digest(&SHA256, password.as_bytes());
    // Two hex chars per byte, zero-padded: 0x0A → "0a".
    Ok(digest.as_ref().iter().map(|b| format!("{b:02x}")).collect())
}
