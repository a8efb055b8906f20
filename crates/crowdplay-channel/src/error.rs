//! Error types for the channel layer.

/// Errors from the realtime channel.
///
/// Transport failures never surface here: the driver reports them
/// through the channel's `error` lifecycle event instead.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// `connect` was called while a driver is already running.
    #[error("channel is already connected")]
    AlreadyConnected,

    /// Every allowed reconnect attempt failed.
    #[error("gave up reconnecting after {attempts} attempts")]
    Exhausted {
        /// How many attempts were made.
        attempts: u32,
    },
}
