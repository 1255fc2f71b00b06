//! The session engine.
//!
//! [`GameEngine`] owns the session record together with its random source,
//! clock and rules. Every operation takes `&mut self`, so whoever holds the
//! engine is its single exclusive mutator. The operations themselves live
//! next to the concern they implement (`lobby`, `turn`, `actions`); this
//! module holds the shared plumbing and the action envelope used by the
//! transport shell.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::config::GameConfig;
use super::error::{GameError, Result};
use super::lobby::{JoinOutcome, VoteOutcome};
use super::player::PlayerId;
use super::rng::GameRng;
use super::session::{EventKind, GameEvent, Session};

/// Session engine.
#[derive(Debug)]
pub struct GameEngine {
    pub(crate) session: Session,
    pub(crate) rng: GameRng,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) config: GameConfig,
}

impl GameEngine {
    /// Engine on the wall clock with an OS-seeded RNG.
    pub fn new(config: GameConfig) -> Self {
        Self::with_parts(config, GameRng::from_entropy(), SystemClock)
    }

    /// Engine with an explicit random source and clock.
    pub fn with_parts(config: GameConfig, rng: GameRng, clock: impl Clock + 'static) -> Self {
        let session = Session::new(clock.now());
        debug!(seed = rng.seed(), "session engine created");
        Self {
            session,
            rng,
            clock: Box::new(clock),
            config,
        }
    }

    /// Read-only view of the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Rules this engine runs with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Net worth of a player; zero for unknown ids.
    pub fn net_worth(&self, player_id: PlayerId) -> i64 {
        self.session
            .net_worth(player_id, self.config.net_worth_per_level)
    }

    /// Full state snapshot for clients.
    pub fn snapshot(&self) -> serde_json::Value {
        self.session.to_json(self.config.net_worth_per_level)
    }

    /// Apply one action from the transport shell.
    pub fn dispatch(&mut self, action: Action) -> Result<ActionOutcome> {
        match action {
            Action::RequestJoin { name } => self.request_join(&name).map(ActionOutcome::Join),
            Action::VoteJoin { player_id, approve } => {
                self.vote_join(player_id, approve).map(ActionOutcome::Vote)
            }
            Action::StartGame { player_id } => {
                self.start_game(player_id).map(|()| ActionOutcome::Done)
            }
            Action::RollDice { player_id } => self
                .roll_dice(player_id)
                .map(|roll| ActionOutcome::Rolled { roll }),
            Action::ResolveTile { player_id, buy } => self
                .resolve_tile_action(player_id, buy)
                .map(|message| ActionOutcome::Resolved { message }),
            Action::BuyProperty {
                player_id,
                property_id,
            } => self
                .buy_property(player_id, &property_id)
                .map(|()| ActionOutcome::Done),
            Action::UpgradeProperty {
                player_id,
                property_id,
            } => self
                .upgrade_property(player_id, &property_id)
                .map(|()| ActionOutcome::Done),
        }
    }

    /// Append an event stamped with the current time.
    pub(crate) fn record(&mut self, kind: EventKind, message: impl Into<String>) {
        let event = GameEvent {
            id: self.rng.uuid(),
            kind,
            message: message.into(),
            created_at: self.now(),
        };
        self.session
            .push_event(event, self.config.event_log_capacity);
    }

    /// Mark the session as updated.
    pub(crate) fn commit(&mut self) {
        let now = self.now();
        self.session.touch(now);
    }

    /// Gameplay precondition: running, and it is `player_id`'s turn.
    pub(crate) fn require_turn(&self, player_id: PlayerId) -> Result<()> {
        if !self.session.status.is_running() {
            return Err(GameError::GameNotRunning);
        }
        if self.session.current_turn_player_id != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }
}

/// Action envelope as posted by clients:
/// `{"action": "roll_dice", "payload": {"player_id": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum Action {
    RequestJoin {
        name: String,
    },
    VoteJoin {
        player_id: PlayerId,
        approve: bool,
    },
    StartGame {
        player_id: PlayerId,
    },
    RollDice {
        player_id: PlayerId,
    },
    ResolveTile {
        player_id: PlayerId,
        #[serde(default)]
        buy: Option<bool>,
    },
    BuyProperty {
        player_id: PlayerId,
        property_id: String,
    },
    UpgradeProperty {
        player_id: PlayerId,
        property_id: String,
    },
}

impl Action {
    /// Decode an envelope, reporting malformed input as a validation error.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GameError::MalformedAction(e.to_string()))
    }
}

/// What a dispatched action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Join(JoinOutcome),
    Vote(VoteOutcome),
    Rolled { roll: u32 },
    Resolved { message: String },
    Done,
}

impl ActionOutcome {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Join(outcome) => outcome.to_json(),
            Self::Vote(outcome) => outcome.to_json(),
            Self::Rolled { roll } => serde_json::json!({"roll": roll}),
            Self::Resolved { message } => {
                serde_json::json!({"resolved": true, "action_message": message})
            }
            Self::Done => serde_json::Value::Null,
        }
    }
}
