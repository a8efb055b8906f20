//! Game session state and related wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the session is in its server-side lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Created, waiting for the arena round to start.
    Pending,
    /// The round is running.
    Active,
    /// The round finished normally.
    Completed,
    /// The round was called off.
    Cancelled,
}

/// One player in the session's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    /// In-game player identifier.
    pub player_id: String,
    /// Display name.
    pub username: String,
    /// Current point total.
    #[serde(default)]
    pub points: i64,
}

/// A purchased package scheduled for a future drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPackage {
    /// Package identifier.
    pub package_id: String,
    /// The item the package delivers.
    pub item_id: String,
    /// When the drop is due, when the server schedules one.
    #[serde(default)]
    pub drop_at: Option<DateTime<Utc>>,
}

/// The session returned by game init and refreshed by the details call.
///
/// `countdown_started` and `arena_active` are client-side only: the
/// server never sends them, and only channel events flip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    /// Session identifier; doubles as the arena room to join.
    pub id: String,
    /// Server-side lifecycle status.
    pub status: GameStatus,
    /// When the session expires, when the server sets a deadline.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Where the realtime channel lives for this session.
    pub channel_url: String,
    /// Players in this round.
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
    /// Pending scheduled drops.
    #[serde(default)]
    pub packages: Vec<ScheduledPackage>,
    /// The pre-game countdown has started.
    #[serde(default)]
    pub countdown_started: bool,
    /// The arena round is underway.
    #[serde(default)]
    pub arena_active: bool,
}

/// The boost response: the player's updated point totals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostOutcome {
    /// The boosted player.
    pub player_id: String,
    /// Their point total after the boost.
    pub points: i64,
}

/// The item-drop response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropReceipt {
    /// The item that was dropped.
    pub item_id: String,
    /// Which player it targets, when the drop is targeted.
    #[serde(default)]
    pub target_player: Option<String>,
}
