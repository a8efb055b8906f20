//! End-to-end wiring: frames arriving on a channel reach the game
//! callbacks through an attached dispatcher.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crowdplay_arena::{
    ArenaBackend, ArenaError, ArenaService, BoostOutcome, DropReceipt,
    GameSession, GameStatus, SessionHandle, TokenSource,
};
use crowdplay_channel::{ChannelConfig, Connector, EventChannel};
use crowdplay_dispatch::{CommandDispatcher, GameCallbacks};
use crowdplay_protocol::{events, Frame, GemstoneKind};
use crowdplay_transport::{ConnectParams, TransportError, WireTransport};
use serde_json::json;
use tokio::sync::mpsc;

/// Delivers a fixed script of frames, then stays open and silent.
struct ScriptedTransport {
    frames: VecDeque<Frame>,
}

impl WireTransport for ScriptedTransport {
    async fn send(&mut self, _frame: &Frame) -> Result<(), TransportError> {
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Clone)]
struct ScriptedConnector {
    frames: Arc<Mutex<VecDeque<Frame>>>,
}

impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    fn connect(
        &self,
        _config: &ChannelConfig,
    ) -> impl Future<Output = Result<ScriptedTransport, TransportError>> + Send
    {
        let frames = std::mem::take(&mut *self.frames.lock().unwrap());
        std::future::ready(Ok(ScriptedTransport { frames }))
    }
}

/// Records command callbacks and pings the test after each one.
struct RecordingInner {
    gemstones: Mutex<Vec<GemstoneKind>>,
    arena_started: Mutex<Vec<String>>,
    ping: mpsc::UnboundedSender<()>,
}

#[derive(Clone)]
struct Recording(Arc<RecordingInner>);

impl Recording {
    fn new(ping: mpsc::UnboundedSender<()>) -> Self {
        Self(Arc::new(RecordingInner {
            gemstones: Mutex::new(vec![]),
            arena_started: Mutex::new(vec![]),
            ping,
        }))
    }

    fn gemstones(&self) -> Vec<GemstoneKind> {
        self.0.gemstones.lock().unwrap().clone()
    }

    fn arena_started(&self) -> Vec<String> {
        self.0.arena_started.lock().unwrap().clone()
    }
}

impl GameCallbacks for Recording {
    fn on_gemstone_command(&self, kind: GemstoneKind) {
        self.0.gemstones.lock().unwrap().push(kind);
        let _ = self.0.ping.send(());
    }

    fn on_arena_game_started(&self, session: &GameSession) {
        self.0.arena_started.lock().unwrap().push(session.id.clone());
        let _ = self.0.ping.send(());
    }
}

fn config() -> ChannelConfig {
    ChannelConfig::new(ConnectParams {
        channel_url: "ws://localhost:9000/events".into(),
        access_token: "token".into(),
        app_id: "app".into(),
        game_id: "game".into(),
        arena_game_id: "arena-1".into(),
    })
}

fn session() -> GameSession {
    GameSession {
        id: "arena-1".into(),
        status: GameStatus::Pending,
        expires_at: None,
        channel_url: "wss://events.example.test/arena-1".into(),
        roster: vec![],
        packages: vec![],
        countdown_started: false,
        arena_active: false,
    }
}

#[tokio::test]
async fn test_wire_frames_flow_through_to_callbacks() {
    let connector = ScriptedConnector {
        frames: Arc::new(Mutex::new(VecDeque::from([
            Frame::new(
                events::IMMEDIATE_ITEM_DROP,
                json!({
                    "itemType": "gemstone",
                    "metadata": { "gemType": "gold", "quantity": 2 }
                }),
            ),
            Frame::new(events::ARENA_BEGINS, json!(null)),
        ]))),
    };
    let channel = EventChannel::with_connector(config(), connector);

    let (ping, mut pings) = mpsc::unbounded_channel();
    let recording = Recording::new(ping);
    let session = SessionHandle::preloaded(session());
    let dispatcher = CommandDispatcher::new(recording.clone(), session.clone());

    // Subscribe before connecting so no frame can slip past.
    let task = dispatcher.attach(&channel);
    channel.connect().unwrap();

    // Two gemstone units plus the arena start.
    for _ in 0..3 {
        pings.recv().await.unwrap();
    }

    assert_eq!(
        recording.gemstones(),
        vec![GemstoneKind::Gold, GemstoneKind::Gold]
    );
    assert_eq!(recording.arena_started(), vec!["arena-1"]);
    assert!(session.snapshot().unwrap().arena_active);

    channel.disconnect().await;
    task.abort();
}

/// Hands out a token unconditionally.
struct StaticTokens;

impl TokenSource for StaticTokens {
    fn access_token(&self) -> Option<String> {
        Some("token-1".into())
    }
}

/// Serves one session; the in-game endpoints are never hit here.
struct InitOnlyBackend;

impl ArenaBackend for InitOnlyBackend {
    async fn initialize_game(
        &self,
        _access_token: &str,
        _stream_url: &str,
    ) -> Result<GameSession, ArenaError> {
        Ok(session())
    }

    async fn boost_player(
        &self,
        _access_token: &str,
        _game_id: &str,
        _player_id: &str,
        _amount: u32,
        _username: &str,
    ) -> Result<BoostOutcome, ArenaError> {
        unreachable!("no boosts in this flow")
    }

    async fn drop_item(
        &self,
        _access_token: &str,
        _game_id: &str,
        _item_id: &str,
        _target_player: &str,
    ) -> Result<DropReceipt, ArenaError> {
        unreachable!("no drops in this flow")
    }

    async fn game_details(
        &self,
        _access_token: &str,
        _game_id: &str,
    ) -> Result<GameSession, ArenaError> {
        unreachable!("no refresh in this flow")
    }
}

/// A frame delivered the instant the connection completes must still
/// reach the callbacks: the service builds the channel on
/// `initialize_game`, the dispatcher attaches, and only then does
/// `open_channel` dial.
#[tokio::test]
async fn test_attach_before_open_catches_first_frame() {
    let connector = ScriptedConnector {
        frames: Arc::new(Mutex::new(VecDeque::from([Frame::new(
            events::IMMEDIATE_ITEM_DROP,
            json!({
                "itemType": "gemstone",
                "metadata": { "gemType": "gold" }
            }),
        )]))),
    };
    let svc = ArenaService::with_connector(
        InitOnlyBackend,
        Arc::new(StaticTokens),
        "app",
        "game",
        connector,
    );
    svc.initialize_game("https://stream.example.test/live")
        .await
        .unwrap();

    let (ping, mut pings) = mpsc::unbounded_channel();
    let recording = Recording::new(ping);
    let dispatcher = CommandDispatcher::new(recording.clone(), svc.session());
    let task = dispatcher.attach(&svc.channel().expect("channel built"));
    svc.open_channel().unwrap();

    pings.recv().await.unwrap();
    assert_eq!(recording.gemstones(), vec![GemstoneKind::Gold]);

    svc.disconnect().await;
    task.abort();
}
