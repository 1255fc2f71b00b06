//! Error types for session operations.
//!
//! Every fallible engine operation returns [`GameError`]. Callers branch on
//! [`GameError::kind`] instead of inspecting messages.

use std::fmt;

use super::player::PlayerId;

/// Coarse error category exposed to the transport shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input
    Validation,
    /// Action not valid for the current status, turn or ownership
    State,
    /// Unknown player or property id
    Resource,
    /// Insufficient balance
    Economic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::State => "state",
            Self::Resource => "resource",
            Self::Economic => "economic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by session operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("name must be between {min} and {max} characters, got {len}")]
    InvalidName { len: usize, min: usize, max: usize },

    #[error("malformed action: {0}")]
    MalformedAction(String),

    #[error("game already finished")]
    GameFinished,

    #[error("game already started")]
    GameAlreadyStarted,

    #[error("game is not running")]
    GameNotRunning,

    #[error("only the host can start the game")]
    NotHost,

    #[error("need at least {min} players to start, have {have}")]
    NotEnoughPlayers { min: usize, have: usize },

    #[error("another join vote is already in progress")]
    JoinVoteInProgress,

    #[error("no pending join request")]
    NoPendingJoinRequest,

    #[error("player {0} cannot vote on this request")]
    NotEligibleVoter(PlayerId),

    #[error("not your turn")]
    NotYourTurn,

    #[error("resolve the current tile action first")]
    TileActionPending,

    #[error("this turn action was already processed")]
    TurnAlreadyProcessed,

    #[error("no pending tile action")]
    NoPendingTileAction,

    #[error("pending action belongs to another player")]
    PendingActionNotOwned,

    #[error("player must be on the property tile")]
    NotOnPropertyTile,

    #[error("property {0} is already owned")]
    PropertyAlreadyOwned(String),

    #[error("player does not own property {0}")]
    NotPropertyOwner(String),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("property {0} not found")]
    PropertyNotFound(String),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: i64, available: i64 },
}

impl GameError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidName { .. } | Self::MalformedAction(_) => ErrorKind::Validation,
            Self::PlayerNotFound(_) | Self::PropertyNotFound(_) => ErrorKind::Resource,
            Self::InsufficientBalance { .. } => ErrorKind::Economic,
            Self::GameFinished
            | Self::GameAlreadyStarted
            | Self::GameNotRunning
            | Self::NotHost
            | Self::NotEnoughPlayers { .. }
            | Self::JoinVoteInProgress
            | Self::NoPendingJoinRequest
            | Self::NotEligibleVoter(_)
            | Self::NotYourTurn
            | Self::TileActionPending
            | Self::TurnAlreadyProcessed
            | Self::NoPendingTileAction
            | Self::PendingActionNotOwned
            | Self::NotOnPropertyTile
            | Self::PropertyAlreadyOwned(_)
            | Self::NotPropertyOwner(_) => ErrorKind::State,
        }
    }

    /// JSON error body for the transport shell.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "ok": false,
            "kind": self.kind().as_str(),
            "error": self.to_string()
        })
    }
}

/// Result alias for session operations.
pub type Result<T, E = GameError> = std::result::Result<T, E>;
