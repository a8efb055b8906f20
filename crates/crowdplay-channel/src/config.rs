//! Channel configuration.

use crowdplay_transport::{ConnectParams, WireProtocol};

/// Default retry ceiling: five attempts, then permanent failure.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Everything the channel needs for one arena session.
///
/// Built fresh per session — the URL and token come out of game
/// initialization and are not reused across sessions.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// URL, credentials, and identifiers for the connection.
    pub params: ConnectParams,
    /// Which wire protocol to speak.
    pub protocol: WireProtocol,
    /// Whether a dropped connection is retried. Defaults to on.
    pub auto_reconnect: bool,
    /// How many reconnect attempts are allowed before giving up.
    pub max_reconnect_attempts: u32,
}

impl ChannelConfig {
    /// Configuration with the default protocol and retry policy.
    pub fn new(params: ConnectParams) -> Self {
        Self {
            params,
            protocol: WireProtocol::default(),
            auto_reconnect: true,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }

    /// Selects the wire protocol.
    pub fn protocol(mut self, protocol: WireProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Disables automatic reconnection; a dropped connection then goes
    /// straight to `Disconnected`.
    pub fn without_reconnect(mut self) -> Self {
        self.auto_reconnect = false;
        self
    }

    /// Overrides the retry ceiling.
    pub fn max_reconnect_attempts(mut self, max: u32) -> Self {
        self.max_reconnect_attempts = max;
        self
    }
}
