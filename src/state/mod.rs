//! State management module for Tycoon.
//!
//! This module provides the session engine and the types it manages:
//!
//! - `board` - Static 40-tile board and landmark properties
//! - `session` - The authoritative session record and event log
//! - `player` - Seated players and net worth
//! - `lobby` - Admission, including unanimous join votes mid-game
//! - `turn` - Start, turn advancement, elimination, end of game, timeouts
//! - `actions` - Rolling, tile resolution, buying, upgrading
//! - `chance` - Luck and bad luck effect tables
//! - `engine` - The engine that ties it together, and the action envelope
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     SharedGame (Arc<Mutex<..>>)                    │
//! │                                                                   │
//! │  enforce_timeout ─▶ action ─▶ enforce_timeout      (one lock)     │
//! │                                                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐  │
//! │  │                         GameEngine                          │  │
//! │  │                                                             │  │
//! │  │   lobby ──┐                                                 │  │
//! │  │   turn ───┼──▶ Session ◀── board (generated once)           │  │
//! │  │   actions ┘       ▲                                         │  │
//! │  │      │            │                                         │  │
//! │  │      └─▶ chance ──┘                                         │  │
//! │  │                                                             │  │
//! │  │   GameRng (seedable)   Clock (system / manual)   GameConfig │  │
//! │  └─────────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

pub mod actions;
pub mod board;
pub mod chance;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod lobby;
pub mod player;
pub mod rng;
pub mod session;
pub mod turn;

use std::sync::{Arc, Mutex, PoisonError};

// Re-export commonly used types
pub use actions::PendingTileAction;
pub use board::{generate_board, Property, Tile, TileType, BOARD_SIZE};
pub use chance::ChanceEffect;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig};
pub use engine::{Action, ActionOutcome, GameEngine};
pub use error::{ErrorKind, GameError, Result};
pub use lobby::{JoinOutcome, JoinRequest, VoteOutcome};
pub use player::{Player, PlayerId};
pub use rng::GameRng;
pub use session::{EventKind, GameEvent, LastRoll, Session, SessionStatus, TurnKey};

/// Cloneable handle to the one engine shared by all requests.
///
/// Every entry point takes the lock once, runs timeout enforcement, performs
/// its work, runs timeout enforcement again, and releases. Readers therefore
/// only ever see complete states.
#[derive(Debug, Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<GameEngine>>,
}

impl SharedGame {
    pub fn new(engine: GameEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access, without housekeeping.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameEngine) -> R) -> R {
        // Operations validate before mutating, so a poisoned engine is still consistent.
        let mut engine = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }

    /// Run `f` between two timeout checks.
    fn run<R>(&self, f: impl FnOnce(&mut GameEngine) -> Result<R>) -> Result<R> {
        self.with(|engine| {
            engine.enforce_timeout();
            let result = f(engine);
            engine.enforce_timeout();
            result
        })
    }

    /// Housekeeping-only entry point, for hosts that poll.
    pub fn tick(&self) -> bool {
        self.with(GameEngine::enforce_timeout)
    }

    /// Consistent snapshot, after any overdue timeout has been applied.
    pub fn snapshot(&self) -> serde_json::Value {
        self.with(|engine| {
            engine.enforce_timeout();
            engine.snapshot()
        })
    }

    pub fn execute(&self, action: Action) -> Result<ActionOutcome> {
        self.run(|engine| engine.dispatch(action))
    }

    /// Decode and execute a raw envelope, answering with the response body:
    /// `{"ok": true, "result": ..., "state": ...}` or an error body.
    pub fn handle_json(&self, body: serde_json::Value) -> serde_json::Value {
        self.with(|engine| {
            engine.enforce_timeout();
            let outcome = Action::from_json(body).and_then(|action| engine.dispatch(action));
            engine.enforce_timeout();
            match outcome {
                Ok(result) => serde_json::json!({
                    "ok": true,
                    "result": result.to_json(),
                    "state": engine.snapshot()
                }),
                Err(err) => err.to_json(),
            }
        })
    }

    pub fn request_join(&self, name: &str) -> Result<JoinOutcome> {
        self.run(|engine| engine.request_join(name))
    }

    pub fn vote_join(&self, player_id: PlayerId, approve: bool) -> Result<VoteOutcome> {
        self.run(|engine| engine.vote_join(player_id, approve))
    }

    pub fn start_game(&self, player_id: PlayerId) -> Result<()> {
        self.run(|engine| engine.start_game(player_id))
    }

    pub fn roll_dice(&self, player_id: PlayerId) -> Result<u32> {
        self.run(|engine| engine.roll_dice(player_id))
    }

    pub fn resolve_tile_action(&self, player_id: PlayerId, buy: Option<bool>) -> Result<String> {
        self.run(|engine| engine.resolve_tile_action(player_id, buy))
    }

    pub fn buy_property(&self, player_id: PlayerId, property_id: &str) -> Result<()> {
        self.run(|engine| engine.buy_property(player_id, property_id))
    }

    pub fn upgrade_property(&self, player_id: PlayerId, property_id: &str) -> Result<()> {
        self.run(|engine| engine.upgrade_property(player_id, property_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(seed: u64) -> (SharedGame, ManualClock) {
        let clock = ManualClock::default();
        let engine = GameEngine::with_parts(GameConfig::default(), GameRng::new(seed), clock.clone());
        (SharedGame::new(engine), clock)
    }

    #[test]
    fn test_shared_game_basic() {
        let (game, _) = shared(1);

        let JoinOutcome::Joined { player_id: host } = game.request_join("Alice").unwrap() else {
            panic!("expected join");
        };
        game.request_join("Bob").unwrap();
        game.start_game(host).unwrap();

        assert_eq!(game.snapshot()["status"], "running");
    }

    #[test]
    fn test_snapshot_applies_overdue_timeout() {
        let (game, clock) = shared(1);
        let JoinOutcome::Joined { player_id: host } = game.request_join("Alice").unwrap() else {
            panic!("expected join");
        };
        game.request_join("Bob").unwrap();
        game.start_game(host).unwrap();
        let first = game.with(|e| e.session().current_turn_player_id);

        clock.advance(chrono::Duration::seconds(45));
        let snapshot = game.snapshot();

        assert_ne!(
            snapshot["current_turn_player_id"],
            serde_json::json!(first)
        );
    }

    #[test]
    fn test_handle_json_error_body() {
        let (game, _) = shared(1);

        let body = game.handle_json(serde_json::json!({
            "action": "request_join",
            "payload": {"name": "A"}
        }));

        assert_eq!(body["ok"], false);
        assert_eq!(body["kind"], "validation");
    }

    #[test]
    fn test_malformed_envelope_still_enforces_timeout() {
        let (game, clock) = shared(1);
        let JoinOutcome::Joined { player_id: host } = game.request_join("Alice").unwrap() else {
            panic!("expected join");
        };
        game.request_join("Bob").unwrap();
        game.start_game(host).unwrap();
        let first = game.with(|e| e.session().current_turn_player_id);

        clock.advance(chrono::Duration::seconds(45));
        let body = game.handle_json(serde_json::json!({"action": "teleport"}));

        assert_eq!(body["kind"], "validation");
        assert_ne!(game.with(|e| e.session().current_turn_player_id), first);
    }

    #[test]
    fn test_handle_json_success_body() {
        let (game, _) = shared(1);

        let body = game.handle_json(serde_json::json!({
            "action": "request_join",
            "payload": {"name": "Alice"}
        }));

        assert_eq!(body["ok"], true);
        assert_eq!(body["result"]["joined"], true);
        assert_eq!(body["state"]["players"][0]["name"], "Alice");
    }

    #[test]
    fn test_handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedGame>();
    }
}
