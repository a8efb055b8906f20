//! Shared vocabulary for Crowdplay's realtime integration layer.
//!
//! This crate defines the "language" the rest of the stack speaks:
//!
//! - **Events** ([`InboundEvent`], [`Frame`], the [`events`] name table) —
//!   what arrives on the realtime channel.
//! - **Commands** ([`Command`], [`PowerupKind`], [`GemstoneKind`],
//!   [`EffectKind`]) — the typed, game-facing instructions derived from
//!   viewer events.
//! - **Errors** ([`ProtocolError`]) — what can go wrong turning untrusted
//!   payloads into either of the above.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and dispatch
//! (game collaborators). It doesn't know about connections or HTTP —
//! it only knows the shapes that travel through the channel.
//!
//! ```text
//! Transport (frames) → Protocol (events/commands) → Dispatch (callbacks)
//! ```

mod command;
mod error;
mod event;

pub use command::{Command, EffectKind, GemstoneKind, PowerupKind};
pub use error::ProtocolError;
pub use event::{events, Frame, InboundEvent};
