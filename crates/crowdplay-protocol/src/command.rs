//! Typed commands derived from viewer events.
//!
//! A [`Command`] is the internal instruction handed to gameplay
//! collaborators after an `immediate-item-drop` payload has been parsed.
//! Parsing is deliberately forgiving: viewers' purchases must not be lost
//! to a catalogue typo, so unknown powerup and gemstone identifiers fall
//! back to a documented default instead of failing. Effects are the one
//! exception — triggering the wrong environmental effect is worse than
//! triggering none, so unknown effect ids are a parse error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtocolError;

/// A temporary boost a viewer can grant to a player.
///
/// `Shield` is the documented fallback for unrecognized item ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum PowerupKind {
    /// Movement speed boost (`speed-boost`).
    SpeedBoost,
    /// Damage shield (`shield`). The default kind.
    #[default]
    Shield,
    /// Collectible magnet (`magnet`).
    Magnet,
    /// Score multiplier (`score-doubler`).
    ScoreDoubler,
}

impl PowerupKind {
    /// Maps a platform item id to a kind.
    ///
    /// Unrecognized ids fall back to [`PowerupKind::Shield`] — by contract
    /// this is not an error, so a viewer's purchase is never dropped just
    /// because the catalogue and the game disagree on a name.
    pub fn from_item_id(id: &str) -> Self {
        match id {
            "speed-boost" => Self::SpeedBoost,
            "shield" => Self::Shield,
            "magnet" => Self::Magnet,
            "score-doubler" => Self::ScoreDoubler,
            other => {
                tracing::debug!(
                    item_id = other,
                    "unknown powerup id, falling back to default"
                );
                Self::default()
            }
        }
    }
}

impl fmt::Display for PowerupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpeedBoost => "speed-boost",
            Self::Shield => "shield",
            Self::Magnet => "magnet",
            Self::ScoreDoubler => "score-doubler",
        };
        write!(f, "{name}")
    }
}

/// A collectible gemstone colour.
///
/// `Red` is the documented fallback for unrecognized gem types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum GemstoneKind {
    /// `red` — the default kind.
    #[default]
    Red,
    /// `blue`
    Blue,
    /// `green`
    Green,
    /// `gold`
    Gold,
}

impl GemstoneKind {
    /// Maps a platform gem type to a kind; unrecognized types fall back
    /// to [`GemstoneKind::Red`].
    pub fn from_gem_type(gem: &str) -> Self {
        match gem {
            "red" => Self::Red,
            "blue" => Self::Blue,
            "green" => Self::Green,
            "gold" => Self::Gold,
            other => {
                tracing::debug!(
                    gem_type = other,
                    "unknown gem type, falling back to default"
                );
                Self::default()
            }
        }
    }
}

impl fmt::Display for GemstoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Gold => "gold",
        };
        write!(f, "{name}")
    }
}

/// An environmental effect a viewer can trigger.
///
/// The set is closed. Unlike powerups and gemstones there is no fallback:
/// an unknown effect id is a [`ProtocolError::UnknownEffect`], which the
/// dispatcher logs and ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    /// Invert gravity for a short hold (`gravity-flip`).
    GravityFlip,
    /// Shake the camera (`screen-shake`).
    ScreenShake,
    /// Dim the arena (`darkness`).
    Darkness,
}

impl EffectKind {
    /// Maps a platform effect id to a kind.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnknownEffect`] for ids outside the fixed
    /// set.
    pub fn from_effect_id(id: &str) -> Result<Self, ProtocolError> {
        match id {
            "gravity-flip" => Ok(Self::GravityFlip),
            "screen-shake" => Ok(Self::ScreenShake),
            "darkness" => Ok(Self::Darkness),
            other => Err(ProtocolError::UnknownEffect(other.to_string())),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GravityFlip => "gravity-flip",
            Self::ScreenShake => "screen-shake",
            Self::Darkness => "darkness",
        };
        write!(f, "{name}")
    }
}

/// A typed instruction for a gameplay collaborator.
///
/// Derived from one inbound `immediate-item-drop` event, handed over by
/// value, at most once per received event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Spawn a powerup of the given kind.
    Powerup {
        /// Which powerup to spawn.
        kind: PowerupKind,
    },
    /// Spawn `quantity` gemstones of the given kind.
    ///
    /// The collaborator is invoked once per unit — a loop, not a single
    /// batched call — so spawn timing and placement stay per-stone.
    Gemstone {
        /// Which gemstone colour.
        kind: GemstoneKind,
        /// How many stones the viewer sent. At least 1.
        quantity: u32,
    },
    /// Trigger an environmental effect.
    Effect {
        /// Which effect to trigger.
        kind: EffectKind,
    },
}

impl Command {
    /// Parses an `immediate-item-drop` payload of the shape
    /// `{ "itemType": ..., "metadata": { ... } }` into a command.
    ///
    /// Powerup and gemstone metadata parse permissively (missing or unknown
    /// ids become the default kind, missing quantity becomes 1). The item
    /// type itself and effect ids are strict.
    ///
    /// # Errors
    /// - [`ProtocolError::MissingField`] — no `itemType` string present.
    /// - [`ProtocolError::UnknownItemType`] — `itemType` outside
    ///   `powerup` / `gemstone` / `effect`.
    /// - [`ProtocolError::UnknownEffect`] — effect id outside the fixed set.
    pub fn from_item_drop(payload: &Value) -> Result<Self, ProtocolError> {
        let item_type = payload
            .get("itemType")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingField("itemType"))?;
        let metadata = payload.get("metadata").unwrap_or(&Value::Null);

        match item_type {
            "powerup" => {
                let kind = metadata
                    .get("itemId")
                    .and_then(Value::as_str)
                    .map(PowerupKind::from_item_id)
                    .unwrap_or_default();
                Ok(Self::Powerup { kind })
            }
            "gemstone" => {
                let kind = metadata
                    .get("gemType")
                    .and_then(Value::as_str)
                    .map(GemstoneKind::from_gem_type)
                    .unwrap_or_default();
                let quantity = metadata
                    .get("quantity")
                    .and_then(Value::as_u64)
                    .map_or(1, |q| q.clamp(1, u64::from(u32::MAX)) as u32);
                Ok(Self::Gemstone { kind, quantity })
            }
            "effect" => {
                let id = metadata
                    .get("effectId")
                    .and_then(Value::as_str)
                    .ok_or(ProtocolError::MissingField("effectId"))?;
                let kind = EffectKind::from_effect_id(id)?;
                Ok(Self::Effect { kind })
            }
            other => Err(ProtocolError::UnknownItemType(other.to_string())),
        }
    }
}
