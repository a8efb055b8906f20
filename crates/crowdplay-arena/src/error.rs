//! Error types for the arena layer.

use crowdplay_channel::ChannelError;

/// Errors from session creation and in-game HTTP operations.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The operation requires an access token and none is present.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The request never completed.
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
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

    /// The realtime channel could not be started.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
