//! Time-boxed iterative-deepening minimax with optional alpha-beta pruning

use std::time::Instant;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::board::CoordPair;
use crate::error::{MoveError, SearchError};
use crate::eval::{evaluate, Score, MAX_HEURISTIC_SCORE, MIN_HEURISTIC_SCORE};
use crate::game::{GameState, Player};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Seconds kept in reserve: no new node or iteration starts once the
/// elapsed time plus this margin reaches the budget
pub const SAFETY_MARGIN: f64 = 0.2;

/// Seed for the move-order RNG when none is given
const DEFAULT_SEED: u64 = 42;

// ============================================================================
// STATISTICS
// ============================================================================

/// Search statistics accumulated over a whole game
#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchStats {
    /// Evaluations keyed by absolute ply (turn number) at which they ran
    pub evaluations_per_depth: FxHashMap<u32, u64>,
    /// Wall-clock seconds spent in accepted searches
    pub total_seconds: f64,
}

impl SearchStats {
    pub fn record_evaluation(&mut self, depth: u32) {
        *self.evaluations_per_depth.entry(depth).or_insert(0) += 1;
    }

    pub fn total_evaluations(&self) -> u64 {
        self.evaluations_per_depth.values().sum()
    }

    /// Histogram sorted by depth
    pub fn by_depth(&self) -> Vec<(u32, u64)> {
        let mut entries: Vec<_> = self
            .evaluations_per_depth
            .iter()
            .map(|(&depth, &count)| (depth, count))
            .collect();
        entries.sort_unstable();
        entries
    }

    /// Share of all evaluations per depth, in percent
    pub fn percent_by_depth(&self) -> Vec<(u32, f64)> {
        let total = self.total_evaluations();
        if total == 0 {
            return Vec::new();
        }
        self.by_depth()
            .into_iter()
            .map(|(depth, count)| (depth, count as f64 * 100.0 / total as f64))
            .collect()
    }

    pub fn evaluations_per_second(&self) -> Option<f64> {
        (self.total_seconds > 0.0).then(|| self.total_evaluations() as f64 / self.total_seconds)
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Result of one search
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Attacker-perspective score of the chosen line
    pub score: Score,
    pub best_move: Option<CoordPair>,
    pub avg_depth: f64,
    pub avg_branching: f64,
    /// Depth limit of the iteration the result comes from
    pub depth_reached: u32,
}

/// How a finished game was decided
#[derive(Clone, Debug, PartialEq)]
pub enum GameEnd {
    /// Turn limit or AI destruction
    Decided,
    /// The side to move could not produce a move in time (or at all)
    Forfeit(SearchError),
}

/// A complete computer-vs-computer game
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub winner: Player,
    pub end: GameEnd,
    pub moves: Vec<CoordPair>,
    pub final_state: GameState,
}

/// Per-iteration counters
#[derive(Clone, Copy, Debug, Default)]
struct IterationCounters {
    /// Root plus every child expanded
    nodes_explored: u64,
    /// Sum of relative depths of expanded children
    total_depth: u64,
    /// Nodes that generated children
    internal_nodes: u64,
    /// Some branch was cut short by the clock
    cut_by_time: bool,
}

impl IterationCounters {
    fn new() -> Self {
        Self {
            nodes_explored: 1,
            ..Self::default()
        }
    }

    fn avg_depth(&self) -> f64 {
        self.total_depth as f64 / self.nodes_explored as f64
    }

    fn avg_branching(&self) -> f64 {
        if self.internal_nodes == 0 {
            0.0
        } else {
            (self.nodes_explored - 1) as f64 / self.internal_nodes as f64
        }
    }
}

// ============================================================================
// MINIMAX AI
// ============================================================================

/// Minimax player; owns the RNG used to shuffle move order
pub struct MinimaxAI {
    rng: ChaCha8Rng,
}

impl Default for MinimaxAI {
    fn default() -> Self {
        Self::new()
    }
}

impl MinimaxAI {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Iterative deepening from depth 1 up to `max_depth`
    ///
    /// Each new iteration starts only while the elapsed time plus
    /// [`SAFETY_MARGIN`] is under the budget. The first iteration always
    /// expands the root. An iteration cut short by the clock replaces the
    /// previous result only when there is none.
    pub fn best_move(&mut self, state: &GameState, stats: &mut SearchStats) -> SearchOutcome {
        let start = Instant::now();
        let options = state.options();

        let mut outcome = SearchOutcome {
            score: evaluate(state),
            best_move: None,
            avg_depth: 0.0,
            avg_branching: 0.0,
            depth_reached: 0,
        };

        for depth_limit in 1..=options.max_depth {
            if depth_limit > 1 && start.elapsed().as_secs_f64() + SAFETY_MARGIN >= options.max_time {
                break;
            }

            let mut search = Search {
                start,
                max_time: options.max_time,
                root_turn: state.turns_played,
                depth_limit,
                alpha_beta: options.alpha_beta,
                randomize: options.randomize_moves,
                rng: &mut self.rng,
                stats: &mut *stats,
                counters: IterationCounters::new(),
            };
            let (score, best_move) = search.run(state, MIN_HEURISTIC_SCORE, MAX_HEURISTIC_SCORE);
            let counters = search.counters;

            if counters.cut_by_time && outcome.best_move.is_some() {
                tracing::debug!("depth {} cut by the clock, keeping depth {}", depth_limit, outcome.depth_reached);
                break;
            }

            outcome = SearchOutcome {
                score,
                best_move,
                avg_depth: counters.avg_depth(),
                avg_branching: counters.avg_branching(),
                depth_reached: depth_limit,
            };

            if counters.cut_by_time {
                break;
            }
        }

        outcome
    }

    /// Search, then enforce the per-move budget
    ///
    /// Elapsed time is added to `stats` only for searches within budget.
    pub fn suggest_move(
        &mut self,
        state: &GameState,
        stats: &mut SearchStats,
    ) -> Result<(CoordPair, SearchOutcome), SearchError> {
        let start = Instant::now();
        let outcome = self.best_move(state, stats);
        let elapsed = start.elapsed().as_secs_f64();

        let budget = state.options().max_time;
        if elapsed > budget {
            return Err(SearchError::TimeExceeded { elapsed, budget });
        }
        stats.total_seconds += elapsed;

        match outcome.best_move {
            Some(mv) => Ok((mv, outcome)),
            None => Err(SearchError::NoLegalMoves(state.next_player())),
        }
    }

    /// Play both sides until there is a winner
    ///
    /// A side whose search fails forfeits to its opponent.
    pub fn play_game(
        &mut self,
        initial: GameState,
        stats: &mut SearchStats,
    ) -> Result<GameRecord, MoveError> {
        let mut state = initial;
        let mut moves = Vec::new();

        loop {
            if let Some(winner) = state.winner() {
                return Ok(GameRecord {
                    winner,
                    end: GameEnd::Decided,
                    moves,
                    final_state: state,
                });
            }

            match self.suggest_move(&state, stats) {
                Ok((mv, _)) => {
                    state.perform_move(mv)?;
                    state.advance_turn();
                    moves.push(mv);
                }
                Err(err) => {
                    let loser = state.next_player();
                    state.advance_turn();
                    return Ok(GameRecord {
                        winner: loser.opponent(),
                        end: GameEnd::Forfeit(err),
                        moves,
                        final_state: state,
                    });
                }
            }
        }
    }
}

// ============================================================================
// DEPTH-BOUNDED SEARCH
// ============================================================================

/// One depth-bounded minimax pass
struct Search<'a> {
    start: Instant,
    max_time: f64,
    root_turn: u32,
    depth_limit: u32,
    alpha_beta: bool,
    randomize: bool,
    rng: &'a mut ChaCha8Rng,
    stats: &'a mut SearchStats,
    counters: IterationCounters,
}

impl Search<'_> {
    fn out_of_time(&self) -> bool {
        self.start.elapsed().as_secs_f64() + SAFETY_MARGIN > self.max_time
    }

    /// Fixed-perspective minimax: nodes where the attacker moves maximize,
    /// nodes where the defender moves minimize
    fn run(&mut self, node: &GameState, mut alpha: Score, mut beta: Score) -> (Score, Option<CoordPair>) {
        let relative_depth = node.turns_played - self.root_turn;

        if relative_depth >= self.depth_limit || node.is_finished() {
            return (evaluate(node), None);
        }
        if relative_depth > 0 && self.out_of_time() {
            self.counters.cut_by_time = true;
            return (evaluate(node), None);
        }

        let mut candidates = node.move_candidates();
        if candidates.is_empty() {
            return (evaluate(node), None);
        }
        if self.randomize {
            candidates.shuffle(&mut *self.rng);
        }
        self.counters.internal_nodes += 1;

        let maximizing = node.next_player() == Player::Attacker;
        let mut best_score = if maximizing { Score::MIN } else { Score::MAX };
        let mut best_move = None;

        for (mv, action) in candidates {
            let mut child = node.clone_for_search();
            child.perform_action(mv, action);
            child.advance_turn();

            self.counters.nodes_explored += 1;
            self.counters.total_depth += u64::from(relative_depth + 1);
            self.stats.record_evaluation(child.turns_played);

            let (score, _) = self.run(&child, alpha, beta);

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(best_score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = Some(mv);
                }
                beta = beta.min(best_score);
            }

            if self.alpha_beta && beta <= alpha {
                break;
            }
        }

        (best_score, best_move)
    }
}

// ============================================================================
// TESTS
// ============================================================================
