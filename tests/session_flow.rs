//! End-to-end sessions driven through the shared handle.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use tycoon_state::{
    ErrorKind, GameConfig, GameEngine, GameError, GameRng, JoinOutcome, ManualClock, PlayerId,
    Session, SessionStatus, SharedGame, VoteOutcome, BOARD_SIZE,
};

fn new_game(seed: u64) -> (SharedGame, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap());
    let engine = GameEngine::with_parts(GameConfig::default(), GameRng::new(seed), clock.clone());
    (SharedGame::new(engine), clock)
}

fn join(game: &SharedGame, name: &str) -> PlayerId {
    match game.request_join(name).unwrap() {
        JoinOutcome::Joined { player_id } => player_id,
        other => panic!("expected immediate join, got {:?}", other),
    }
}

fn started(seed: u64, players: usize) -> (SharedGame, ManualClock, Vec<PlayerId>) {
    let (game, clock) = new_game(seed);
    let ids: Vec<PlayerId> = (0..players).map(|i| join(&game, &format!("Player{}", i))).collect();
    game.start_game(ids[0]).unwrap();
    (game, clock, ids)
}

fn session(game: &SharedGame) -> Session {
    game.with(|e| e.session().clone())
}

fn assert_invariants(session: &Session) {
    let mut owners: HashMap<&str, PlayerId> = HashMap::new();
    for player in &session.players {
        assert!(player.position < BOARD_SIZE);
        for property_id in &player.properties {
            let previous = owners.insert(property_id.as_str(), player.id);
            assert!(previous.is_none(), "{} owned twice", property_id);
        }
    }
    for property in &session.properties {
        assert_eq!(owners.get(property.id.as_str()).copied(), property.owner_id);
    }

    if session.status == SessionStatus::Running {
        let current = session.current_turn_player_id.expect("running without a turn");
        assert!(!session.player(current).unwrap().is_bankrupt);
        if let Some(pending) = &session.pending_tile_action {
            assert_eq!(pending.player_id, current);
        }
    }
    assert!(session.event_count() <= 30);
}

#[test]
fn test_full_game_reaches_consistent_finish() {
    let (game, _, _) = started(2024, 4);

    for _ in 0..2000 {
        let state = session(&game);
        assert_invariants(&state);
        if state.status == SessionStatus::Finished {
            break;
        }

        let player_id = state.current_turn_player_id.unwrap();
        if state.pending_tile_action.is_none() {
            game.roll_dice(player_id).unwrap();
            continue;
        }

        // Try to upgrade something first, then buy when affordable.
        let owned = state.player(player_id).unwrap().properties.first().cloned();
        if let Some(property_id) = owned {
            let _ = game.upgrade_property(player_id, &property_id);
        }
        match game.resolve_tile_action(player_id, Some(true)) {
            Ok(_) => {}
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Economic);
                game.resolve_tile_action(player_id, Some(false)).unwrap();
            }
        }
    }

    let state = session(&game);
    assert_eq!(state.status, SessionStatus::Finished);
    assert!(state.current_turn_player_id.is_none());
    assert!(state.turn_deadline.is_none());

    let best = state
        .players
        .iter()
        .map(|p| (p.net_worth(&state.properties, 100), std::cmp::Reverse(p.join_order), p.id))
        .max()
        .map(|(_, _, id)| id);
    assert_eq!(state.winner_id, best);
}

#[test]
fn test_vote_admits_on_unanimity() {
    let (game, _, ids) = started(5, 3);

    let JoinOutcome::Pending { .. } = game.request_join("Dana").unwrap() else {
        panic!("expected a vote");
    };
    assert_eq!(game.vote_join(ids[0], true).unwrap().approved(), None);
    assert_eq!(game.vote_join(ids[1], true).unwrap().approved(), None);
    let VoteOutcome::Approved { player_id } = game.vote_join(ids[2], true).unwrap() else {
        panic!("expected approval");
    };

    let state = session(&game);
    assert_eq!(state.players.len(), 4);
    assert_eq!(state.players.last().unwrap().id, player_id);
}

#[test]
fn test_vote_rejects_on_first_no() {
    let (game, _, ids) = started(5, 3);
    game.request_join("Dana").unwrap();

    assert_eq!(game.vote_join(ids[0], true).unwrap().approved(), None);
    assert_eq!(game.vote_join(ids[1], false).unwrap().approved(), Some(false));
    assert_eq!(
        game.vote_join(ids[2], true).unwrap_err(),
        GameError::NoPendingJoinRequest
    );
    assert_eq!(session(&game).players.len(), 3);

    // A new request may be opened once the previous one is settled.
    assert!(game.request_join("Eve").is_ok());
}

#[test]
fn test_silent_players_cannot_stall_the_game() {
    let (game, clock, _) = started(77, 3);

    let mut seen = Vec::new();
    for _ in 0..6 {
        let state = session(&game);
        seen.push(state.current_turn_player_id.unwrap());
        clock.advance(chrono::Duration::seconds(31));
        assert!(game.tick());
    }

    let state = session(&game);
    assert_eq!(state.status, SessionStatus::Running);
    assert_eq!(state.round, 3);
    assert_eq!(seen[0], seen[3]);
    assert_ne!(seen[0], seen[1]);
}

#[test]
fn test_rolled_but_silent_player_is_force_resolved() {
    let (game, clock, _) = started(78, 2);
    let player_id = session(&game).current_turn_player_id.unwrap();
    game.roll_dice(player_id).unwrap();

    clock.advance(chrono::Duration::seconds(31));
    let snapshot = game.snapshot();

    assert!(snapshot["pending_tile_action"].is_null());
    assert_ne!(snapshot["current_turn_player_id"], serde_json::json!(player_id));
    let state = session(&game);
    assert!(state.properties.iter().all(|p| p.owner_id != Some(player_id)));
}

#[test]
fn test_envelope_round_trip_through_handle() {
    let (game, _) = new_game(9);

    let body = game.handle_json(serde_json::json!({
        "action": "request_join",
        "payload": {"name": "Alice"}
    }));
    let host = body["result"]["player_id"].as_str().unwrap().to_string();
    game.handle_json(serde_json::json!({
        "action": "request_join",
        "payload": {"name": "Bob"}
    }));

    let body = game.handle_json(serde_json::json!({
        "action": "start_game",
        "payload": {"player_id": host}
    }));
    assert_eq!(body["ok"], true);
    assert_eq!(body["state"]["status"], "running");
    assert_eq!(body["state"]["round"], 1);

    let current = body["state"]["current_turn_player_id"].clone();
    let body = game.handle_json(serde_json::json!({
        "action": "roll_dice",
        "payload": {"player_id": current}
    }));
    assert_eq!(body["ok"], true);
    assert!(body["state"]["pending_tile_action"].is_object());

    let body = game.handle_json(serde_json::json!({
        "action": "roll_dice",
        "payload": {"player_id": current}
    }));
    assert_eq!(body["ok"], false);
    assert_eq!(body["kind"], "state");
}

#[test]
fn test_seeded_sessions_are_reproducible() {
    let play = |seed| {
        let (game, _, _) = started(seed, 3);
        let mut rolls = Vec::new();
        for _ in 0..9 {
            let player_id = session(&game).current_turn_player_id.unwrap();
            rolls.push(game.roll_dice(player_id).unwrap());
            game.resolve_tile_action(player_id, Some(false)).unwrap();
        }
        (rolls, game.snapshot())
    };

    let (rolls_a, snapshot_a) = play(31);
    let (rolls_b, snapshot_b) = play(31);
    assert_eq!(rolls_a, rolls_b);
    assert_eq!(snapshot_a["players"], snapshot_b["players"]);
}
