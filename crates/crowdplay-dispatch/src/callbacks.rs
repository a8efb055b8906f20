//! The game-facing collaborator interface.

use crowdplay_arena::GameSession;
use crowdplay_protocol::{EffectKind, GemstoneKind, PowerupKind};

/// What the game engine plugs into the dispatcher.
///
/// Every method defaults to a no-op so games implement only what they
/// react to. Calls arrive on the dispatcher's task; implementations are
/// expected to hand off to the game loop rather than block.
pub trait GameCallbacks: Send + Sync + 'static {
    /// A viewer-purchased powerup should be granted.
    fn on_powerup_command(&self, _kind: PowerupKind) {}

    /// One gemstone should spawn. Called once per unit purchased: a
    /// quantity-3 purchase means three calls.
    fn on_gemstone_command(&self, _kind: GemstoneKind) {}

    /// A stage-wide effect should trigger.
    fn on_effect_command(&self, _kind: EffectKind) {}

    /// The arena round has begun; the session carries the final roster.
    fn on_arena_game_started(&self, _session: &GameSession) {}

    /// The pre-game countdown has started.
    fn on_countdown_started(&self) {}

    /// Countdown tick.
    fn on_countdown_update(&self, _seconds_remaining: u32) {}

    /// A viewer boosted a player; `points` is the updated total.
    fn on_player_boost_activated(&self, _player_id: &str, _points: i64) {}

    /// A purchased package was scheduled for a future drop.
    fn on_package_drop(&self, _package_id: &str, _item_id: &str) {}

    /// The realtime channel came up (initial connect or reconnect).
    fn on_channel_connected(&self) {}

    /// The realtime channel went down.
    fn on_channel_disconnected(&self) {}

    /// The realtime channel reported an error (handshake failure,
    /// reconnect exhaustion).
    fn on_channel_error(&self, _message: &str) {}
}

/// The do-nothing implementation.
#[derive(Debug, Default)]
pub struct NoopCallbacks;

impl GameCallbacks for NoopCallbacks {}
