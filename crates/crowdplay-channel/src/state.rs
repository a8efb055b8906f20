//! The connection lifecycle.

use std::fmt;

/// Where the channel currently is in its lifecycle.
///
/// ```text
/// Disconnected ──connect()──▶ Connecting ──▶ Connected
///       ▲                         │              │ drop
///       │                         ▼              ▼
///       │◀──initial failure───────┘       Reconnecting {attempt}
///       │                                  │           │
///       │◀────────disconnect()─────────────┘           │ retries
///                                                      ▼ exhausted
///                                             PermanentlyFailed
/// ```
///
/// `PermanentlyFailed` is terminal for the driver: only an explicit new
/// `connect()` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection and no driver running.
    #[default]
    Disconnected,
    /// The first connection attempt is in flight.
    Connecting,
    /// Live connection; events flow and `send` works.
    Connected,
    /// The connection dropped; a retry is pending or in flight.
    Reconnecting {
        /// Which retry this is, starting at 1.
        attempt: u32,
    },
    /// Every allowed retry failed. The driver has stopped.
    PermanentlyFailed,
}

impl ConnectionState {
    /// Whether `send` is currently allowed.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting { attempt } => {
                write!(f, "reconnecting (attempt {attempt})")
            }
            Self::PermanentlyFailed => write!(f, "permanently failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_only_connected_allows_sending() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Reconnecting { attempt: 3 }.is_connected());
        assert!(!ConnectionState::PermanentlyFailed.is_connected());
    }

    #[test]
    fn test_display_names_the_attempt() {
        let state = ConnectionState::Reconnecting { attempt: 2 };
        assert_eq!(state.to_string(), "reconnecting (attempt 2)");
    }
}
