//! Game state: board contents, turn bookkeeping and rendering

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Coord, CoordPair};
use crate::options::Options;
use crate::units::{Unit, UnitType};

// ============================================================================
// CORE TYPES
// ============================================================================

/// The two sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Attacker = 0,
    Defender = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Attacker => Player::Defender,
            Player::Defender => Player::Attacker,
        }
    }

    /// Lower-case initial used in unit codes
    pub fn initial(self) -> char {
        match self {
            Player::Attacker => 'a',
            Player::Defender => 'd',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Player::Attacker => "Attacker",
            Player::Defender => "Defender",
        };
        f.pad(name)
    }
}

/// What a legal (src, dst) request does
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    SelfDestruct,
    Move,
    Attack,
    Repair,
}

/// Human-readable description of an action, as written to game traces
pub fn describe_action(mv: CoordPair, action: ActionType) -> String {
    match action {
        ActionType::Move => format!("Move from {} to {}", mv.src, mv.dst),
        ActionType::Attack => format!("Attack by {} to {}", mv.src, mv.dst),
        ActionType::Repair => format!("Repair by {} to {}", mv.src, mv.dst),
        ActionType::SelfDestruct => format!("Self Destruct at {}", mv.src),
    }
}

/// Serializable view of a position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub dim: u8,
    pub next_player: Player,
    pub turns_played: u32,
    /// Rows of cells, `None` for empty
    pub cells: Vec<Vec<Option<Unit>>>,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state
///
/// Cloning copies the board unit by unit and shares the options.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Row-major dim x dim grid
    board: Vec<Option<Unit>>,

    next_player: Player,

    /// Turns completed so far
    pub turns_played: u32,

    /// Command-unit liveness, flipped when the unit dies
    pub(crate) attacker_has_ai: bool,
    pub(crate) defender_has_ai: bool,

    options: Arc<Options>,

    /// Live states emit tracing events, search copies stay silent
    traced: bool,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game with the standard deployment: each side's AI in its corner,
    /// Techs/Viruses beside it, then Firewalls, Programs and one more unit
    /// on the diagonal.
    pub fn new(options: Arc<Options>) -> Self {
        let mut state = Self::empty(options);
        let md = state.dim() as i8 - 1;

        let defender = [
            (0, 0, UnitType::AI),
            (1, 0, UnitType::Tech),
            (0, 1, UnitType::Tech),
            (2, 0, UnitType::Firewall),
            (0, 2, UnitType::Firewall),
            (1, 1, UnitType::Program),
        ];
        let attacker = [
            (md, md, UnitType::AI),
            (md - 1, md, UnitType::Virus),
            (md, md - 1, UnitType::Virus),
            (md - 2, md, UnitType::Program),
            (md, md - 2, UnitType::Program),
            (md - 1, md - 1, UnitType::Firewall),
        ];

        for (row, col, unit_type) in defender {
            state.place(Coord::new(row, col), Unit::new(Player::Defender, unit_type));
        }
        for (row, col, unit_type) in attacker {
            state.place(Coord::new(row, col), Unit::new(Player::Attacker, unit_type));
        }
        state
    }

    /// Board with no units; both AI flags start false and are raised by
    /// [`GameState::place`]
    pub fn empty(options: Arc<Options>) -> Self {
        let dim = options.dim as usize;
        Self {
            board: vec![None; dim * dim],
            next_player: Player::Attacker,
            turns_played: 0,
            attacker_has_ai: false,
            defender_has_ai: false,
            options,
            traced: true,
        }
    }

    /// Put a unit on a cell (setup only; off-board coordinates are ignored)
    pub fn place(&mut self, coord: Coord, unit: Unit) {
        if unit.unit_type == UnitType::AI && unit.is_alive() {
            match unit.player {
                Player::Attacker => self.attacker_has_ai = true,
                Player::Defender => self.defender_has_ai = true,
            }
        }
        self.set(coord, Some(unit));
    }

    /// Copy used inside search: same board, no tracing
    pub fn clone_for_search(&self) -> Self {
        let mut copy = self.clone();
        copy.traced = false;
        copy
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn shared_options(&self) -> Arc<Options> {
        Arc::clone(&self.options)
    }

    pub fn dim(&self) -> u8 {
        self.options.dim
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn set_next_player(&mut self, player: Player) {
        self.next_player = player;
    }

    pub fn attacker_has_ai(&self) -> bool {
        self.attacker_has_ai
    }

    pub fn defender_has_ai(&self) -> bool {
        self.defender_has_ai
    }

    pub(crate) fn is_traced(&self) -> bool {
        self.traced
    }

    pub fn is_valid_coord(&self, coord: Coord) -> bool {
        coord.is_within(self.dim())
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.is_valid_coord(coord)
            .then(|| coord.row as usize * self.dim() as usize + coord.col as usize)
    }

    /// Unit at coord; off-board cells read as empty
    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.index(coord).and_then(|i| self.board[i].as_ref())
    }

    pub(crate) fn get_mut(&mut self, coord: Coord) -> Option<&mut Unit> {
        self.index(coord).and_then(|i| self.board[i].as_mut())
    }

    pub(crate) fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        if let Some(i) = self.index(coord) {
            self.board[i] = unit;
        }
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Every unit on the board, row-major
    pub fn units(&self) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        CoordPair::from_dim(self.dim())
            .iter_rectangle()
            .filter_map(|coord| self.get(coord).map(|&unit| (coord, unit)))
    }

    /// Units owned by `player`, row-major
    pub fn player_units(&self, player: Player) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.units().filter(move |(_, unit)| unit.player == player)
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    /// Hand the move to the other side; does not check for a winner
    pub fn advance_turn(&mut self) {
        self.next_player = self.next_player.opponent();
        self.turns_played += 1;
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    /// Board grid with row/column legends and 3-character unit codes
    pub fn render(&self) -> String {
        let dim = self.dim() as i8;
        let mut out = String::from("\n   ");
        for col in 0..dim {
            let _ = write!(out, "{:^3} ", Coord::new(0, col).col_label());
        }
        out.push('\n');
        for row in 0..dim {
            let _ = write!(out, "{}: ", Coord::new(row, 0).row_label());
            for col in 0..dim {
                match self.get(Coord::new(row, col)) {
                    Some(unit) => {
                        let _ = write!(out, "{unit:^3} ");
                    }
                    None => out.push_str(" .  "),
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let dim = self.dim() as i8;
        let cells = (0..dim)
            .map(|row| {
                (0..dim)
                    .map(|col| self.get(Coord::new(row, col)).copied())
                    .collect()
            })
            .collect();
        BoardSnapshot {
            dim: self.dim(),
            next_player: self.next_player,
            turns_played: self.turns_played,
            cells,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Next player: {}", self.next_player)?;
        writeln!(f, "Turns played: {}", self.turns_played)?;
        f.write_str(&self.render())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game() -> GameState {
        GameState::new(Arc::new(Options::default()))
    }

    #[test]
    fn test_initial_deployment() {
        let game = new_game();
        assert_eq!(game.next_player(), Player::Attacker);
        assert_eq!(game.turns_played, 0);
        assert!(game.attacker_has_ai());
        assert!(game.defender_has_ai());
        assert_eq!(game.player_units(Player::Attacker).count(), 6);
        assert_eq!(game.player_units(Player::Defender).count(), 6);

        let ai = game.get(Coord::new(4, 4)).unwrap();
        assert_eq!(ai.unit_type, UnitType::AI);
        assert_eq!(ai.player, Player::Attacker);
        assert_eq!(game.get(Coord::new(0, 0)).unwrap().player, Player::Defender);
        assert!(game.is_empty(Coord::new(2, 2)));
        assert!(game.get(Coord::new(-1, 0)).is_none());
        assert!(game.get(Coord::new(0, 5)).is_none());
    }

    #[test]
    fn test_advance_turn() {
        let mut game = new_game();
        game.advance_turn();
        assert_eq!(game.next_player(), Player::Defender);
        assert_eq!(game.turns_played, 1);
        game.advance_turn();
        assert_eq!(game.next_player(), Player::Attacker);
        assert_eq!(game.turns_played, 2);
    }

    #[test]
    fn test_search_clone_is_independent() {
        let game = new_game();
        let mut copy = game.clone_for_search();
        assert!(!copy.is_traced());
        assert!(Arc::ptr_eq(&game.options, &copy.options));

        copy.get_mut(Coord::new(4, 4)).unwrap().mod_health(-5);
        copy.set(Coord::new(3, 3), None);
        assert_eq!(game.get(Coord::new(4, 4)).unwrap().health, 9);
        assert!(game.get(Coord::new(3, 3)).is_some());
    }

    #[test]
    fn test_render() {
        let game = new_game();
        let board = game.render();
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines[1], "    0   1   2   3   4  ");
        assert_eq!(lines[2], "A: dA9 dT9 dF9  .   .  ");
        assert_eq!(lines[6], "E:  .   .  aP9 aV9 aA9 ");
        assert!(game.to_string().starts_with("Next player: Attacker\nTurns played: 0\n"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = new_game();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.cells.len(), 5);
        assert_eq!(snapshot.cells[4][4].map(|u| u.unit_type), Some(UnitType::AI));
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"next_player\":\"Attacker\""));
    }

    #[test]
    fn test_describe_action() {
        let mv = CoordPair::from_quad(4, 4, 3, 4);
        assert_eq!(describe_action(mv, ActionType::Move), "Move from E4 to D4");
        assert_eq!(describe_action(mv, ActionType::Attack), "Attack by E4 to D4");
        let sd = CoordPair::from_quad(4, 4, 4, 4);
        assert_eq!(describe_action(sd, ActionType::SelfDestruct), "Self Destruct at E4");
    }
}
