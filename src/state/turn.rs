//! Turn sequencing, elimination and end of game.
//!
//! # Status transitions
//!
//! ```text
//! ┌─────────┐  start_game (host, >= 2 players)  ┌─────────┐
//! │ Waiting │──────────────────────────────────▶│ Running │
//! └─────────┘                                   └────┬────┘
//!                     round > max_rounds, or         │
//!                     <= 1 player with coins > 0     │
//!                                                    ▼
//!                                              ┌──────────┐
//!                                              │ Finished │
//!                                              └──────────┘
//! ```

use tracing::{info, warn};

use super::engine::GameEngine;
use super::error::{GameError, Result};
use super::player::PlayerId;
use super::session::{EventKind, SessionStatus};

/// Reason logged for a regular turn change.
pub const TURN_CHANGED: &str = "Turn changed";

/// Reason logged when a silent player's turn is skipped.
pub const TIMEOUT_SKIP: &str = "Automatic skip due to timeout.";

impl GameEngine {
    /// Start the game. Host only, needs at least `min_players` seated.
    pub fn start_game(&mut self, player_id: PlayerId) -> Result<()> {
        let host = self.session.player(player_id)?;
        if !host.is_host {
            return Err(GameError::NotHost);
        }
        if self.session.status != SessionStatus::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        let have = self.session.players.len();
        if have < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                min: self.config.min_players,
                have,
            });
        }

        self.rng.shuffle(&mut self.session.players);
        let first = self.session.players[0].id;
        let deadline = self.now() + self.config.turn_duration();

        let session = &mut self.session;
        session.status = SessionStatus::Running;
        session.current_turn_player_id = Some(first);
        session.round = 1;
        session.turn_deadline = Some(deadline);
        session.last_processed_turn = None;
        session.last_roll = None;
        session.pending_tile_action = None;

        info!(players = have, first_player = %first, "game started");
        self.record(EventKind::StartGame, "The game has started!");
        self.commit();
        Ok(())
    }

    /// Hand the turn to the next solvent player.
    ///
    /// Finishes the game instead when at most one solvent player is left, and
    /// re-checks the finish condition after the hand-off.
    pub(crate) fn advance_turn(&mut self, reason: &str) {
        let Some(current_id) = self.session.current_turn_player_id else {
            return;
        };
        let Some(current) = self.session.player_index(current_id) else {
            return;
        };

        if self.session.solvent_count() <= 1 {
            self.finish();
            return;
        }

        let players = &self.session.players;
        let mut next = (current + 1) % players.len();
        while players[next].is_bankrupt {
            next = (next + 1) % players.len();
            if next == current {
                break;
            }
        }

        if next <= current {
            self.session.round += 1;
        }

        let next_id = self.session.players[next].id;
        let deadline = self.now() + self.config.turn_duration();
        let session = &mut self.session;
        session.current_turn_player_id = Some(next_id);
        session.turn_deadline = Some(deadline);
        session.last_processed_turn = None;
        session.last_roll = None;
        session.pending_tile_action = None;

        info!(round = session.round, player = %next_id, reason, "turn changed");
        self.record(EventKind::TurnChange, reason);
        self.maybe_finish();
    }

    /// Flag every player at or below zero coins as bankrupt, and clear the
    /// flag for anyone back above it.
    pub(crate) fn mark_bankruptcies(&mut self) {
        for player in &mut self.session.players {
            player.is_bankrupt = player.coins <= 0;
        }
    }

    /// Finish if the round limit was passed or at most one player still has
    /// positive coins.
    pub(crate) fn maybe_finish(&mut self) {
        if !self.session.status.is_running() {
            return;
        }
        if self.session.round > self.config.max_rounds
            || self.session.positive_balance_count() <= 1
        {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let winner = self.ranking().first().map(|(id, _)| *id);

        let session = &mut self.session;
        session.status = SessionStatus::Finished;
        session.current_turn_player_id = None;
        session.turn_deadline = None;
        session.pending_tile_action = None;
        session.pending_join_request = None;
        session.winner_id = winner;

        info!(round = session.round, winner = ?winner, "game finished");
        self.record(
            EventKind::GameOver,
            "The game has ended. Final ranking is now available.",
        );
    }

    /// Players ordered by net worth, highest first; ties go to whoever
    /// joined earlier.
    pub fn ranking(&self) -> Vec<(PlayerId, i64)> {
        let per_level = self.config.net_worth_per_level;
        let mut ranked: Vec<(PlayerId, i64, usize)> = self
            .session
            .players
            .iter()
            .map(|p| {
                (
                    p.id,
                    p.net_worth(&self.session.properties, per_level),
                    p.join_order,
                )
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.into_iter().map(|(id, worth, _)| (id, worth)).collect()
    }

    /// Skip or force-resolve the current turn once its deadline has passed.
    ///
    /// A pending tile action is resolved as a decline; if that fails the
    /// action is discarded and the turn skipped. Returns whether anything
    /// happened. Safe to call at any time.
    pub fn enforce_timeout(&mut self) -> bool {
        if !self.session.status.is_running() {
            return false;
        }
        let Some(deadline) = self.session.turn_deadline else {
            return false;
        };
        if self.now() <= deadline {
            return false;
        }

        if let Some(pending) = self.session.pending_tile_action.clone() {
            if let Err(err) = self.resolve_tile_action(pending.player_id, Some(false)) {
                warn!(player = %pending.player_id, error = %err, "forced tile resolution failed, skipping turn");
                self.session.pending_tile_action = None;
                self.record(
                    EventKind::TurnChange,
                    "Time expired during tile action. Turn ended automatically.",
                );
                self.advance_turn(TIMEOUT_SKIP);
                self.commit();
            }
            return true;
        }

        warn!(player = ?self.session.current_turn_player_id, "turn timed out");
        self.record(EventKind::TurnChange, "Time expired. Turn skipped automatically.");
        self.advance_turn(TIMEOUT_SKIP);
        self.commit();
        true
    }
}
