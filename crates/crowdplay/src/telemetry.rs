//! Logging setup for binaries embedding the client.

use tracing_subscriber::EnvFilter;

/// Initializes a stdout `tracing` subscriber.
///
/// Filtering follows `RUST_LOG` when set, defaulting to `info`. Call once
/// at startup; embedding applications with their own subscriber should
/// skip this entirely.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
