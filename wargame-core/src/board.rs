//! Square-grid geometry: cell coordinates, coordinate pairs and directions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MoveError;

/// Row labels, one letter per row
const ROW_LABELS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Column labels, one hex digit per column
const COL_LABELS: &[u8; 16] = b"0123456789abcdef";

/// Characters stripped from move notation before parsing
const SEPARATORS: &[char] = &[' ', ',', '.', ':', ';', '-', '_'];

/// Largest board dimension the notation can express
pub const MAX_DIM: u8 = 16;

/// Orthogonal offsets (drow, dcol) in generation order: up, left, down, right
pub const ADJACENT_OFFSETS: [(i8, i8); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// Direction of a one-step orthogonal move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

/// Board cell coordinate (row, col)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Row label, `?` when the row has no letter
    pub fn row_label(&self) -> char {
        usize::try_from(self.row)
            .ok()
            .and_then(|r| ROW_LABELS.get(r))
            .map_or('?', |&b| b as char)
    }

    /// Column label, `?` when the column has no hex digit
    pub fn col_label(&self) -> char {
        usize::try_from(self.col)
            .ok()
            .and_then(|c| COL_LABELS.get(c))
            .map_or('?', |&b| b as char)
    }

    /// Check if this coordinate lies on a `dim` x `dim` board
    pub fn is_within(&self, dim: u8) -> bool {
        let dim = dim as i8;
        (0..dim).contains(&self.row) && (0..dim).contains(&self.col)
    }

    /// The four orthogonal neighbours (may be off-board)
    pub fn iter_adjacent(self) -> impl Iterator<Item = Coord> {
        ADJACENT_OFFSETS
            .iter()
            .map(move |&(dr, dc)| Coord::new(self.row + dr, self.col + dc))
    }

    /// Cells of the square of radius `dist` centred here, including self
    pub fn iter_range(self, dist: i8) -> impl Iterator<Item = Coord> {
        (self.row - dist..=self.row + dist).flat_map(move |row| {
            (self.col - dist..=self.col + dist).map(move |col| Coord::new(row, col))
        })
    }

    fn parse_pair(row: char, col: char) -> Option<Coord> {
        let row = ROW_LABELS
            .iter()
            .position(|&b| b as char == row.to_ascii_uppercase())?;
        let col = COL_LABELS
            .iter()
            .position(|&b| b as char == col.to_ascii_lowercase())?;
        Some(Coord::new(row as i8, col as i8))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.col_label())
    }
}

impl FromStr for Coord {
    type Err = MoveError;

    /// Parse `D2`, `d2`, `D:2` ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = strip_separators(s).collect();
        match chars.as_slice() {
            [row, col] => Coord::parse_pair(*row, *col),
            _ => None,
        }
        .ok_or_else(|| MoveError::Notation(s.to_string()))
    }
}

fn strip_separators(s: &str) -> impl Iterator<Item = char> + '_ {
    s.trim().chars().filter(|c| !SEPARATORS.contains(c))
}

/// Two coordinates: a move (src -> dst) or a rectangular area
///
/// A pair whose ends are equal encodes a self-destruct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordPair {
    pub src: Coord,
    pub dst: Coord,
}

impl CoordPair {
    pub const fn new(src: Coord, dst: Coord) -> Self {
        Self { src, dst }
    }

    pub const fn from_quad(row0: i8, col0: i8, row1: i8, col1: i8) -> Self {
        Self::new(Coord::new(row0, col0), Coord::new(row1, col1))
    }

    /// Rectangle covering a whole `dim` x `dim` board
    pub const fn from_dim(dim: u8) -> Self {
        Self::from_quad(0, 0, dim as i8 - 1, dim as i8 - 1)
    }

    /// Cells of the rectangle, row-major
    pub fn iter_rectangle(self) -> impl Iterator<Item = Coord> {
        (self.src.row..=self.dst.row).flat_map(move |row| {
            (self.src.col..=self.dst.col).map(move |col| Coord::new(row, col))
        })
    }

    pub fn is_self_target(&self) -> bool {
        self.src == self.dst
    }

    /// dst is one orthogonal step away from src
    pub fn is_adjacent(&self) -> bool {
        self.src.iter_adjacent().any(|c| c == self.dst)
    }

    /// Direction of a one-step orthogonal move, `None` for anything else
    pub fn direction(&self) -> Option<Direction> {
        let dr = self.dst.row - self.src.row;
        let dc = self.dst.col - self.src.col;
        match (dr, dc) {
            (-1, 0) => Some(Direction::Up),
            (1, 0) => Some(Direction::Down),
            (0, -1) => Some(Direction::Left),
            (0, 1) => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for CoordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.src, self.dst)
    }
}

impl FromStr for CoordPair {
    type Err = MoveError;

    /// Parse `A3B2`, `a3 b2`, `A3-B2` ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = strip_separators(s).collect();
        match chars.as_slice() {
            [r0, c0, r1, c1] => Coord::parse_pair(*r0, *c0)
                .zip(Coord::parse_pair(*r1, *c1))
                .map(|(src, dst)| CoordPair::new(src, dst)),
            _ => None,
        }
        .ok_or_else(|| MoveError::Notation(s.to_string()))
    }
}
