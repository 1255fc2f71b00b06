//! Tycoon State Library
//!
//! This crate provides the authoritative session engine for Tycoon, a
//! turn-based landmark trading board game.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Lobby** - Free admission before the game starts, unanimous votes after.
//!
//! - **Turn Engine** - Randomized turn order, round counting, bankruptcy
//!   elimination, deadline-driven turn skipping, and final ranking.
//!
//! - **Tile Resolution** - Dice movement with lap bonus, property purchase and
//!   rent, luck and bad luck tables, special events.
//!
//! - **Property Economy** - Ownership, unbounded upgrade levels, net worth.
//!
//! # Design Principles
//!
//! 1. **One exclusive mutator** - A [`GameEngine`] owns the session; share it
//!    through [`SharedGame`], which serializes every action.
//!
//! 2. **Validate, then mutate** - Failed actions leave the session untouched
//!    and report a typed [`GameError`].
//!
//! 3. **Injected randomness and time** - Seed a [`GameRng`] and use a
//!    [`ManualClock`] to make sessions reproducible.
//!
//! 4. **No networking** - This crate is pure state; snapshots are JSON-ready.
//!
//! # Example
//!
//! ```rust
//! use tycoon_state::{GameConfig, GameEngine, GameRng, JoinOutcome, ManualClock, SharedGame};
//!
//! let engine = GameEngine::with_parts(GameConfig::default(), GameRng::new(7), ManualClock::default());
//! let game = SharedGame::new(engine);
//!
//! let JoinOutcome::Joined { player_id: host } = game.request_join("Alice").unwrap() else {
//!     unreachable!("lobby is open");
//! };
//! game.request_join("Bob").unwrap();
//! game.start_game(host).unwrap();
//!
//! let player_id = game.with(|e| e.session().current_turn_player_id).unwrap();
//! let roll = game.roll_dice(player_id).unwrap();
//! assert!((1..=6).contains(&roll));
//!
//! game.resolve_tile_action(player_id, Some(false)).unwrap();
//! assert_eq!(game.snapshot()["status"], "running");
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
