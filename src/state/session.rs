//! The authoritative session record.
//!
//! A [`Session`] holds everything about the one game in progress: status,
//! players in turn order, board, properties, the pending join and tile
//! actions, and a capped newest-first event log. It performs no validation
//! of its own; the engine is its only mutator.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

use super::actions::PendingTileAction;
use super::board::{generate_board, Property, Tile};
use super::error::{GameError, Result};
use super::lobby::JoinRequest;
use super::player::{Player, PlayerId};

/// Session state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Lobby open, players join freely
    #[default]
    Waiting,
    /// Turns in progress, joins need a vote
    Running,
    /// Final ranking available
    Finished,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Kinds of logged events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    RequestJoin,
    VoteJoin,
    StartGame,
    RollDice,
    BuyProperty,
    UpgradeProperty,
    EventTriggered,
    TurnChange,
    GameOver,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestJoin => "request_join",
            Self::VoteJoin => "vote_join",
            Self::StartGame => "start_game",
            Self::RollDice => "roll_dice",
            Self::BuyProperty => "buy_property",
            Self::UpgradeProperty => "upgrade_property",
            Self::EventTriggered => "event_triggered",
            Self::TurnChange => "turn_change",
            Self::GameOver => "game_over",
        }
    }
}

/// A logged event.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    pub id: uuid::Uuid,
    pub kind: EventKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl GameEvent {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "type": self.kind.as_str(),
            "message": self.message,
            "created_at": self.created_at.to_rfc3339()
        })
    }
}

/// Identifies one player's turn within one round.
///
/// Stored after a roll is accepted; a second roll carrying the same key is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnKey {
    pub round: u32,
    pub player_id: PlayerId,
}

impl fmt::Display for TurnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.round, self.player_id)
    }
}

/// Most recent accepted roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastRoll {
    pub player_id: PlayerId,
    pub value: u32,
}

/// The session record.
#[derive(Debug, Clone)]
pub struct Session {
    pub status: SessionStatus,

    /// Players in turn order (join order until the game starts)
    pub players: Vec<Player>,

    pub board: Vec<Tile>,

    pub properties: Vec<Property>,

    pub current_turn_player_id: Option<PlayerId>,

    /// Starts at 1, increments when turn order wraps
    pub round: u32,

    pub turn_deadline: Option<DateTime<Utc>>,

    pub last_processed_turn: Option<TurnKey>,

    pub last_roll: Option<LastRoll>,

    pub pending_join_request: Option<JoinRequest>,

    pub pending_tile_action: Option<PendingTileAction>,

    pub winner_id: Option<PlayerId>,

    /// Newest first
    events: VecDeque<GameEvent>,

    /// Players ever admitted, including ones that joined mid-game
    pub(crate) admitted: usize,

    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Fresh waiting session on a newly generated board.
    pub fn new(now: DateTime<Utc>) -> Self {
        let (board, properties) = generate_board();
        Self {
            status: SessionStatus::Waiting,
            players: Vec::new(),
            board,
            properties,
            current_turn_player_id: None,
            round: 1,
            turn_deadline: None,
            last_processed_turn: None,
            last_roll: None,
            pending_join_request: None,
            pending_tile_action: None,
            winner_id: None,
            events: VecDeque::new(),
            admitted: 0,
            updated_at: now,
        }
    }

    /// Prepend an event, dropping the oldest beyond `capacity`.
    pub fn push_event(&mut self, event: GameEvent, capacity: usize) {
        self.events.push_front(event);
        self.events.truncate(capacity);
    }

    /// Events, newest first.
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Mark the session as updated.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Key of the turn in progress, if any.
    pub fn turn_key(&self) -> Option<TurnKey> {
        self.current_turn_player_id.map(|player_id| TurnKey {
            round: self.round,
            player_id,
        })
    }

    pub fn player_index(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound(player_id))
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound(player_id))
    }

    pub fn property(&self, property_id: &str) -> Result<&Property> {
        self.properties
            .iter()
            .find(|p| p.id == property_id)
            .ok_or_else(|| GameError::PropertyNotFound(property_id.to_string()))
    }

    pub fn property_mut(&mut self, property_id: &str) -> Result<&mut Property> {
        self.properties
            .iter_mut()
            .find(|p| p.id == property_id)
            .ok_or_else(|| GameError::PropertyNotFound(property_id.to_string()))
    }

    /// Players that are not flagged bankrupt.
    pub fn solvent_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_bankrupt).count()
    }

    /// Players holding a positive balance.
    pub fn positive_balance_count(&self) -> usize {
        self.players.iter().filter(|p| p.coins > 0).count()
    }

    /// Net worth of a player; zero for unknown ids.
    pub fn net_worth(&self, player_id: PlayerId, per_level: i64) -> i64 {
        self.player(player_id)
            .map(|p| p.net_worth(&self.properties, per_level))
            .unwrap_or(0)
    }

    /// Full snapshot for clients.
    pub fn to_json(&self, net_worth_per_level: i64) -> serde_json::Value {
        let players: Vec<serde_json::Value> = self.players.iter().map(|p| p.to_json()).collect();
        let board: Vec<serde_json::Value> = self.board.iter().map(|t| t.to_json()).collect();
        let properties: Vec<serde_json::Value> =
            self.properties.iter().map(|p| p.to_json()).collect();
        let events: Vec<serde_json::Value> = self.events.iter().map(|e| e.to_json()).collect();

        let net_worth: serde_json::Map<String, serde_json::Value> = self
            .players
            .iter()
            .map(|p| {
                (
                    p.id.to_string(),
                    serde_json::json!(p.net_worth(&self.properties, net_worth_per_level)),
                )
            })
            .collect();

        let last_roll = self.last_roll.map(|r| {
            serde_json::json!({
                "player_id": r.player_id,
                "value": r.value
            })
        });

        serde_json::json!({
            "status": self.status.as_str(),
            "round": self.round,
            "current_turn_player_id": self.current_turn_player_id,
            "turn_deadline": self.turn_deadline.map(|d| d.to_rfc3339()),
            "last_processed_turn": self.last_processed_turn.map(|k| k.to_string()),
            "last_roll": last_roll,
            "pending_join_request": self.pending_join_request.as_ref().map(|r| r.to_json()),
            "pending_tile_action": self.pending_tile_action.as_ref().map(|a| a.to_json()),
            "winner_id": self.winner_id,
            "players": players,
            "board": board,
            "properties": properties,
            "events": events,
            "updated_at": self.updated_at.to_rfc3339(),
            "net_worth_by_player": net_worth
        })
    }
}
