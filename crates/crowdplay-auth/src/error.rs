//! Error types for the auth layer.
//!
//! The split between [`Network`](AuthError::Network) and
//! [`Parse`](AuthError::Parse) is deliberate: a transport failure and a
//! malformed body from a reachable server are different operational
//! problems and get reported distinctly.

/// Errors that can occur during authentication and token handling.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request never completed (DNS, connect, timeout, TLS).
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status. `message` is
    /// human-readable and safe to surface to the player.
    #[error("server returned {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Human-readable reason, taken from the body when present.
        message: String,
    },

    /// The server answered 2xx but the body didn't have the expected shape.
    #[error("malformed server response: {0}")]
    Parse(String),

    /// The operation requires an access token and none is present.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A caller-supplied value was unusable (e.g. an empty password).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading or writing the persisted token pair failed.
    #[error("token storage failed: {0}")]
    Storage(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_includes_code_and_message() {
        let err = AuthError::Status {
            code: 401,
            message: "bad credentials".into(),
        };
        assert_eq!(err.to_string(), "server returned 401: bad credentials");
    }

    #[test]
    fn test_parse_is_distinct_from_network() {
        let err = AuthError::Parse("missing field `user`".into());
        assert!(matches!(err, AuthError::Parse(_)));
        assert!(err.to_string().contains("malformed"));
    }
}
