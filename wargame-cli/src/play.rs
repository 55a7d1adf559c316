//! Play command - run one game between humans and/or the engine
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_game(), report_result()
//! - Level 3: human_turn(), computer_turn()
//! - Level 4: input and formatting utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use wargame_core::{
    describe_action, BoardSnapshot, CoordPair, GameState, MinimaxAI, Options, Player,
    SearchError, SearchStats,
};

use crate::trace::{GameTrace, SearchReport};

// ============================================================================
// CONFIGURATION (Level 4)
// ============================================================================

/// Settings that do not belong to the game options
pub struct PlayArgs {
    /// Seed for the engine's move-order RNG
    pub seed: Option<u64>,
    /// Directory for the trace file, `None` disables it
    pub trace_dir: Option<PathBuf>,
    /// Print the final summary as JSON
    pub json: bool,
}

/// Outcome of one computer turn
enum ComputerTurn {
    Played,
    Forfeit(SearchError),
}

/// Final result, as printed with `--json`
#[derive(Serialize)]
struct GameSummary<'a> {
    winner: Player,
    forfeit: Option<String>,
    turns_played: u32,
    board: BoardSnapshot,
    stats: &'a SearchStats,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Set up state, engine and trace
/// 2. Alternate turns until there is a winner
/// 3. Report the result
pub fn run(options: Options, args: PlayArgs) -> Result<()> {
    if let Some(broker) = &options.broker {
        tracing::warn!("Broker relay at {} is not supported, playing locally", broker);
    }

    let mut trace = match &args.trace_dir {
        Some(dir) => GameTrace::create(dir, &options)?,
        None => GameTrace::disabled(),
    };
    if let Some(path) = trace.path() {
        tracing::info!("Writing game trace to {}", path.display());
    }

    let mut game = GameState::new(Arc::new(options));
    let mut ai = args.seed.map_or_else(MinimaxAI::new, MinimaxAI::with_seed);
    let mut stats = SearchStats::default();

    tracing::info!(
        "Starting game: {} (depth={}, time={}s, alpha-beta={}, heuristic={})",
        game.options().game_type,
        game.options().max_depth,
        game.options().max_time,
        game.options().alpha_beta,
        game.options().heuristic
    );
    trace.parameters(&game)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let (winner, forfeit) = play_game(&mut game, &mut ai, &mut stats, &mut trace, &mut input)?;

    trace.winner(winner, game.turns_played)?;
    report_result(&game, winner, forfeit.as_ref(), &stats, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Main loop; returns the winner and the forfeit that ended the game, if any
fn play_game(
    game: &mut GameState,
    ai: &mut MinimaxAI,
    stats: &mut SearchStats,
    trace: &mut GameTrace,
    input: &mut impl BufRead,
) -> Result<(Player, Option<SearchError>)> {
    loop {
        println!();
        println!("{game}");

        if let Some(winner) = game.winner() {
            return Ok((winner, None));
        }

        let player = game.next_player();
        if !game.options().game_type.is_computer(player) {
            human_turn(game, trace, input)?;
            continue;
        }

        match computer_turn(game, ai, stats, trace)? {
            ComputerTurn::Played => {}
            ComputerTurn::Forfeit(err) => {
                match &err {
                    SearchError::TimeExceeded { .. } => {
                        println!("The computer {player} took too long to choose a move!");
                    }
                    SearchError::NoLegalMoves(_) => {
                        println!("Computer {player} doesn't know what to do!");
                    }
                }
                tracing::warn!("{} forfeits: {}", player, err);
                game.advance_turn();
                return Ok((player.opponent(), Some(err)));
            }
        }
    }
}

fn report_result(
    game: &GameState,
    winner: Player,
    forfeit: Option<&SearchError>,
    stats: &SearchStats,
    args: &PlayArgs,
) -> Result<()> {
    println!("{winner} wins!");

    if args.json {
        let summary = GameSummary {
            winner,
            forfeit: forfeit.map(ToString::to_string),
            turns_played: game.turns_played,
            board: game.snapshot(),
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - TURNS
// ============================================================================

/// Read moves until one is legal, then apply it and pass the turn
fn human_turn(game: &mut GameState, trace: &mut GameTrace, input: &mut impl BufRead) -> Result<()> {
    let player = game.next_player();
    loop {
        let line = prompt(input, &format!("Player {player}, enter your move: "))?;
        let mv = match line.parse::<CoordPair>() {
            Ok(mv) => mv,
            Err(err) => {
                println!("Invalid coordinates! Try again. ({err})");
                continue;
            }
        };

        let turn_number = game.turns_played + 1;
        match game.perform_move(mv) {
            Ok(action) => {
                let description = describe_action(mv, action);
                println!("Player {player}: {description}");
                trace.turn(&player.to_string(), turn_number, &description, &game.render(), None)?;
                game.advance_turn();
                return Ok(());
            }
            Err(err) => {
                trace.turn(&player.to_string(), turn_number, &invalid_description(mv), &game.render(), None)?;
                println!("The move is not valid! {err}. Try again.");
            }
        }
    }
}

/// Let the engine choose and play a move
fn computer_turn(
    game: &mut GameState,
    ai: &mut MinimaxAI,
    stats: &mut SearchStats,
    trace: &mut GameTrace,
) -> Result<ComputerTurn> {
    let player = game.next_player();
    let turn_number = game.turns_played + 1;

    let start = Instant::now();
    let (mv, outcome) = match ai.suggest_move(game, stats) {
        Ok(found) => found,
        Err(err) => return Ok(ComputerTurn::Forfeit(err)),
    };
    let elapsed = start.elapsed().as_secs_f64();

    tracing::info!(
        "{} search: score={} depth={} avg_depth={:.1} branching={:.1} elapsed={:.2}s",
        player,
        outcome.score,
        outcome.depth_reached,
        outcome.avg_depth,
        outcome.avg_branching,
        elapsed
    );
    tracing::info!(
        "Cumulative evals: {} ({})",
        stats.total_evaluations(),
        format_rate(stats.evaluations_per_second())
    );

    let action = game
        .perform_move(mv)
        .with_context(|| format!("engine chose an illegal move {mv}"))?;
    let description = describe_action(mv, action);
    println!("Computer {player}: {description}");

    let report = SearchReport {
        outcome: &outcome,
        elapsed_seconds: elapsed,
        stats: &*stats,
    };
    trace.turn(&player.to_string(), turn_number, &description, &game.render(), Some(report))?;
    game.advance_turn();
    Ok(ComputerTurn::Played)
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn prompt(input: &mut impl BufRead, message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed before the game ended");
    }
    Ok(line.trim().to_string())
}

fn invalid_description(mv: CoordPair) -> String {
    format!("Invalid move. src: {} - dst: {}", mv.src, mv.dst)
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}k/s", rate / 1000.0),
        None => "n/a".to_string(),
    }
}
