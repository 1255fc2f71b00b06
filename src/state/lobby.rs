//! Admission workflow.
//!
//! Before the game starts anyone may sit down. Once it is running, a
//! candidate needs every seated player to approve; one rejection ends the
//! request. Only one request may be open at a time.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::engine::GameEngine;
use super::error::{GameError, Result};
use super::player::{Player, PlayerId};
use super::session::{EventKind, SessionStatus};

/// A candidate waiting on a vote.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRequest {
    pub id: uuid::Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// One entry per player seated when the request was opened; `None` is undecided
    votes: Vec<(PlayerId, Option<bool>)>,
}

impl JoinRequest {
    pub fn new(
        id: uuid::Uuid,
        name: String,
        created_at: DateTime<Utc>,
        voters: impl IntoIterator<Item = PlayerId>,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            votes: voters.into_iter().map(|v| (v, None)).collect(),
        }
    }

    pub fn can_vote(&self, player_id: PlayerId) -> bool {
        self.votes.iter().any(|(v, _)| *v == player_id)
    }

    /// Record a vote. Returns false if the player is not an eligible voter.
    pub fn cast(&mut self, player_id: PlayerId, approve: bool) -> bool {
        match self.votes.iter_mut().find(|(v, _)| *v == player_id) {
            Some((_, vote)) => {
                *vote = Some(approve);
                true
            }
            None => false,
        }
    }

    pub fn vote_of(&self, player_id: PlayerId) -> Option<bool> {
        self.votes
            .iter()
            .find(|(v, _)| *v == player_id)
            .and_then(|(_, vote)| *vote)
    }

    /// Tally: `Some(false)` on any rejection, `Some(true)` once everyone
    /// approved, `None` otherwise.
    pub fn tally(&self) -> Option<bool> {
        if self.votes.iter().any(|(_, v)| *v == Some(false)) {
            Some(false)
        } else if self.votes.iter().all(|(_, v)| *v == Some(true)) {
            Some(true)
        } else {
            None
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let votes: serde_json::Map<String, serde_json::Value> = self
            .votes
            .iter()
            .map(|(id, vote)| (id.to_string(), serde_json::json!(vote)))
            .collect();

        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "created_at": self.created_at.to_rfc3339(),
            "votes": votes
        })
    }
}

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Seated immediately (lobby still open)
    Joined { player_id: PlayerId },
    /// A vote was opened
    Pending { request_id: uuid::Uuid },
}

impl JoinOutcome {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Joined { player_id } => {
                serde_json::json!({"joined": true, "player_id": player_id})
            }
            Self::Pending { request_id } => {
                serde_json::json!({"joined": false, "request_id": request_id})
            }
        }
    }
}

/// Result of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Approved { player_id: PlayerId },
    Rejected,
    Undecided,
}

impl VoteOutcome {
    /// Tri-state view: approved, rejected, or still open.
    pub fn approved(&self) -> Option<bool> {
        match self {
            Self::Approved { .. } => Some(true),
            Self::Rejected => Some(false),
            Self::Undecided => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Approved { player_id } => {
                serde_json::json!({"approved": true, "player_id": player_id})
            }
            Self::Rejected => serde_json::json!({"approved": false}),
            Self::Undecided => serde_json::json!({"approved": null}),
        }
    }
}

impl GameEngine {
    /// Ask to join the session.
    pub fn request_join(&mut self, name: &str) -> Result<JoinOutcome> {
        let name = self.validate_name(name)?;

        match self.session.status {
            SessionStatus::Waiting => {
                let is_host = self.session.admitted == 0;
                let player_id = self.admit(name.clone(), is_host);
                self.record(EventKind::RequestJoin, format!("{} joined the lobby.", name));
                self.commit();
                Ok(JoinOutcome::Joined { player_id })
            }
            SessionStatus::Running => {
                if self.session.pending_join_request.is_some() {
                    return Err(GameError::JoinVoteInProgress);
                }

                let request_id = self.rng.uuid();
                let voters: Vec<PlayerId> = self.session.players.iter().map(|p| p.id).collect();
                self.session.pending_join_request =
                    Some(JoinRequest::new(request_id, name.clone(), self.now(), voters));
                debug!(%request_id, candidate = %name, "join vote opened");
                self.record(
                    EventKind::RequestJoin,
                    format!("{} requested to join. Vote required.", name),
                );
                self.commit();
                Ok(JoinOutcome::Pending { request_id })
            }
            SessionStatus::Finished => Err(GameError::GameFinished),
        }
    }

    /// Vote on the pending join request.
    pub fn vote_join(&mut self, player_id: PlayerId, approve: bool) -> Result<VoteOutcome> {
        let request = self
            .session
            .pending_join_request
            .as_ref()
            .ok_or(GameError::NoPendingJoinRequest)?;
        self.session.player(player_id)?;
        if !request.can_vote(player_id) {
            return Err(GameError::NotEligibleVoter(player_id));
        }

        let Some(request) = self.session.pending_join_request.as_mut() else {
            return Err(GameError::NoPendingJoinRequest);
        };
        request.cast(player_id, approve);
        let tally = request.tally();
        let name = request.name.clone();

        let outcome = match tally {
            Some(false) => {
                self.session.pending_join_request = None;
                self.record(
                    EventKind::VoteJoin,
                    format!("Join request for {} was rejected.", name),
                );
                VoteOutcome::Rejected
            }
            Some(true) => {
                self.session.pending_join_request = None;
                let new_id = self.admit(name.clone(), false);
                self.record(
                    EventKind::VoteJoin,
                    format!("{} was approved unanimously and joined.", name),
                );
                VoteOutcome::Approved { player_id: new_id }
            }
            None => VoteOutcome::Undecided,
        };

        self.commit();
        Ok(outcome)
    }

    fn validate_name(&self, raw: &str) -> Result<String> {
        let name = raw.trim();
        let len = name.chars().count();
        let (min, max) = (self.config.min_name_len, self.config.max_name_len);
        if len < min || len > max {
            return Err(GameError::InvalidName { len, min, max });
        }
        Ok(name.to_string())
    }

    fn admit(&mut self, name: String, is_host: bool) -> PlayerId {
        let player_id = self.rng.uuid();
        let player = Player::new(
            player_id,
            name,
            self.config.starting_coins,
            is_host,
            self.session.admitted,
            self.now(),
        );
        info!(%player_id, name = %player.name, is_host, "player admitted");
        self.session.admitted += 1;
        self.session.players.push(player);
        player_id
    }
}
