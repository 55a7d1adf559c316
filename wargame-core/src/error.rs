//! Error types for move validation and search

use crate::board::{Coord, CoordPair};
use crate::game::Player;

/// Why a requested action was refused
///
/// Every variant is recoverable: the board is left untouched and the
/// caller may ask for another move.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("{0} is outside the board")]
    OutOfBounds(Coord),

    #[error("no unit of the player to move at {0}")]
    NotOwnUnit(Coord),

    #[error("{} is not adjacent to {}", .0.dst, .0.src)]
    NotAdjacent(CoordPair),

    #[error("unit at {0} is engaged in combat and cannot move")]
    Engaged(Coord),

    #[error("unit at {} cannot move towards {}", .0.src, .0.dst)]
    WrongDirection(CoordPair),

    #[error("unit at {} cannot repair {}", .0.src, .0.dst)]
    IllegalRepair(CoordPair),

    #[error("cannot read {0:?} as a move")]
    Notation(String),
}

/// Failures of a computer turn
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// The search overran its per-move budget; the side forfeits
    #[error("search took {elapsed:.3}s, budget is {budget:.3}s")]
    TimeExceeded { elapsed: f64, budget: f64 },

    #[error("{0} has no legal move")]
    NoLegalMoves(Player),
}
