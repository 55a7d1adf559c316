//! Integration tests for the wargame engine
//!
//! Tests the full stack: notation, rules, evaluation and the minimax AI

use std::process::Command;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use wargame_core::{
    describe_action, ActionType, Coord, CoordPair, GameEnd, GameState, Heuristic, MinimaxAI,
    MoveError, Options, Player, SearchError, SearchStats, UnitType, MAX_HEALTH,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn auto_options(heuristic: Heuristic, alpha_beta: bool) -> Options {
    Options {
        max_depth: 3,
        max_time: 60.0,
        alpha_beta,
        heuristic,
        max_turns: Some(12),
        randomize_moves: false,
        ..Options::default()
    }
}

fn assert_consistent(state: &GameState) {
    for (coord, unit) in state.units() {
        assert!(state.is_valid_coord(coord));
        assert!(unit.health >= 1 && unit.health <= MAX_HEALTH, "{unit} at {coord}");
    }
    let has_ai = |player| {
        state
            .player_units(player)
            .any(|(_, unit)| unit.unit_type == UnitType::AI)
    };
    assert_eq!(state.attacker_has_ai(), has_ai(Player::Attacker));
    assert_eq!(state.defender_has_ai(), has_ai(Player::Defender));
}

// ============================================================================
// FULL GAMES
// ============================================================================

#[test]
fn test_full_games_finish_for_every_configuration() {
    for heuristic in [Heuristic::MaterialCount, Heuristic::HealthWeighted] {
        for alpha_beta in [true, false] {
            let options = Arc::new(auto_options(heuristic, alpha_beta));
            let mut ai = MinimaxAI::new();
            let mut stats = SearchStats::default();

            let record = ai
                .play_game(GameState::new(options), &mut stats)
                .unwrap();

            assert_eq!(record.end, GameEnd::Decided);
            assert_eq!(Some(record.winner), record.final_state.winner());
            assert_eq!(record.moves.len() as u32, record.final_state.turns_played);
            assert!(record.final_state.turns_played <= 12);
            assert!(stats.total_evaluations() > 0);
            assert_consistent(&record.final_state);
        }
    }
}

#[test]
fn test_pruning_does_not_change_the_game() {
    let play = |alpha_beta| {
        let options = Arc::new(auto_options(Heuristic::MaterialCount, alpha_beta));
        MinimaxAI::new()
            .play_game(GameState::new(options), &mut SearchStats::default())
            .unwrap()
    };

    let pruned = play(true);
    let full = play(false);
    assert_eq!(pruned.moves, full.moves);
    assert_eq!(pruned.winner, full.winner);
}

#[test]
fn test_pruning_evaluates_fewer_leaves() {
    let count = |alpha_beta| {
        let state = GameState::new(Arc::new(auto_options(Heuristic::MaterialCount, alpha_beta)));
        let mut stats = SearchStats::default();
        MinimaxAI::new().best_move(&state, &mut stats);
        stats.total_evaluations()
    };
    assert!(count(true) < count(false));
}

#[test]
fn test_zero_budget_forfeits_first_move() {
    let options = Arc::new(Options {
        max_time: 0.0,
        ..auto_options(Heuristic::MaterialCount, true)
    });
    let mut stats = SearchStats::default();

    let record = MinimaxAI::new()
        .play_game(GameState::new(options), &mut stats)
        .unwrap();

    assert_eq!(record.winner, Player::Defender);
    assert!(matches!(
        record.end,
        GameEnd::Forfeit(SearchError::TimeExceeded { .. })
    ));
    assert!(record.moves.is_empty());
    assert_eq!(stats.total_seconds, 0.0);
}

#[test]
fn test_seeded_randomized_games_repeat() {
    let options = Arc::new(Options {
        randomize_moves: true,
        max_depth: 2,
        ..auto_options(Heuristic::HealthWeighted, true)
    });
    let play = || {
        MinimaxAI::with_seed(7)
            .play_game(GameState::new(Arc::clone(&options)), &mut SearchStats::default())
            .unwrap()
            .moves
    };
    assert_eq!(play(), play());
}

// ============================================================================
// NOTATION AND RULES
// ============================================================================

#[test]
fn test_notation_drives_moves() {
    let mut state = GameState::new(Arc::new(Options::default()));

    let mv: CoordPair = "c4 b4".parse().unwrap();
    assert_eq!(mv.to_string(), "C4B4");

    let action = state.perform_move(mv).unwrap();
    assert_eq!(action, ActionType::Move);
    assert_eq!(describe_action(mv, action), "Move from C4 to B4");
    state.advance_turn();

    // defender cannot move the attacker's pieces
    let stolen: CoordPair = "B4A4".parse().unwrap();
    assert_eq!(
        state.perform_move(stolen),
        Err(MoveError::NotOwnUnit(Coord::new(1, 4)))
    );
    assert!("B4".parse::<CoordPair>().is_err());
}

#[test]
fn test_random_playouts_keep_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    for _ in 0..20 {
        let mut state = GameState::new(Arc::new(Options {
            max_turns: Some(60),
            ..Options::default()
        }));

        while !state.is_finished() {
            let candidates = state.move_candidates();
            let Some(&(mv, expected)) = candidates.choose(&mut rng) else {
                break;
            };
            let action = state.perform_move(mv).unwrap();
            assert_eq!(action, expected);
            state.advance_turn();
            assert_consistent(&state);
        }

        assert!(state.turns_played <= 60);
    }
}

// ============================================================================
// BINARY
// ============================================================================

#[test]
fn test_json_summary_keeps_logs_off_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_wargame"))
        .args([
            "--game-type", "auto", "--max-depth", "1", "--max-turns", "2",
            "--no-randomize", "--no-trace", "--json",
        ])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stdout.contains("\"winner\": \"Defender\""));
    assert!(stdout.contains("\"turns_played\": 2"));
    assert!(!stdout.contains("Starting game"));
    assert!(stderr.contains("Starting game"));
}
