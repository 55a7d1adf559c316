//! AI Wargame Core - Game engine and search
//!
//! This crate provides the core game logic:
//! - Board geometry (square grid, row-letter/hex-column notation)
//! - Unit types with static damage and repair tables
//! - Game state, move legality and action resolution
//! - Static evaluation heuristics
//! - Time-boxed iterative-deepening minimax/alpha-beta AI

pub mod board;
pub mod units;
pub mod game;
pub mod rules;
pub mod eval;
pub mod ai;
pub mod options;
pub mod error;

// Re-exports for convenient access
pub use board::{Coord, CoordPair, Direction};
pub use units::{Unit, UnitType, DAMAGE_TABLE, REPAIR_TABLE, MAX_HEALTH};
pub use game::{describe_action, ActionType, BoardSnapshot, GameState, Player};
pub use eval::{evaluate, Heuristic, Score};
pub use ai::{GameEnd, GameRecord, MinimaxAI, SearchOutcome, SearchStats};
pub use options::{GameType, Options};
pub use error::{MoveError, SearchError};
