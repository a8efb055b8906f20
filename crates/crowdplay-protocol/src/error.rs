//! Error types for the protocol layer.
//!
//! Each crate in Crowdplay defines its own error enum, so a
//! `ProtocolError` always means "an untrusted payload didn't parse" —
//! never a networking or HTTP problem. Every variant here is non-fatal by
//! contract: the dispatcher logs and drops, it never propagates.

/// Errors produced while interpreting inbound payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A frame body was not valid JSON or not the expected shape.
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field was absent from a payload.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// An `itemType` outside the `powerup`/`gemstone`/`effect` vocabulary.
    #[error("unknown item type `{0}`")]
    UnknownItemType(String),

    /// An effect id outside the fixed effect set. Effects have no default
    /// fallback, unlike powerups and gemstones.
    #[error("unknown effect id `{0}`")]
    UnknownEffect(String),
}
