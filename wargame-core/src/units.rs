//! Unit types, health and the static combat/repair tables

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Direction;
use crate::game::Player;

/// Maximum (and starting) health of every unit
pub const MAX_HEALTH: u8 = 9;

/// Unit type (index into the interaction tables)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// Command unit; losing it loses the game
    AI = 0,
    Tech = 1,
    Virus = 2,
    Program = 3,
    Firewall = 4,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::AI,
        UnitType::Tech,
        UnitType::Virus,
        UnitType::Program,
        UnitType::Firewall,
    ];

    /// Single-letter code used on the rendered board
    pub fn initial(self) -> char {
        match self {
            UnitType::AI => 'A',
            UnitType::Tech => 'T',
            UnitType::Virus => 'V',
            UnitType::Program => 'P',
            UnitType::Firewall => 'F',
        }
    }

    /// Whether this type may leave a cell next to an enemy
    pub fn moves_while_engaged(self) -> bool {
        matches!(self, UnitType::Tech | UnitType::Virus)
    }

    /// Whether this type may repair friendly units at all
    pub fn can_repair(self) -> bool {
        matches!(self, UnitType::Tech | UnitType::AI)
    }
}

/// Damage dealt, indexed [attacker][defender]
pub static DAMAGE_TABLE: [[u8; 5]; 5] = [
    [3, 3, 3, 3, 1], // AI
    [1, 1, 6, 1, 1], // Tech
    [9, 6, 1, 6, 1], // Virus
    [3, 3, 3, 3, 1], // Program
    [1, 1, 1, 1, 1], // Firewall
];

/// Health restored, indexed [healer][target]
pub static REPAIR_TABLE: [[u8; 5]; 5] = [
    [0, 1, 1, 0, 0], // AI
    [3, 0, 0, 3, 3], // Tech
    [0, 0, 0, 0, 0], // Virus
    [0, 0, 0, 0, 0], // Program
    [0, 0, 0, 0, 0], // Firewall
];

/// Movement rule for a (player, unit type) on a one-step move
///
/// AI, Program and Firewall only advance: Attacker up/left, Defender
/// down/right. The attacker's Virus and the defender's Tech move freely;
/// a Virus on the defending side (or Tech on the attacking side) has no
/// legal direction.
pub fn can_move(player: Player, unit_type: UnitType, direction: Direction) -> bool {
    match (player, unit_type) {
        (_, UnitType::AI | UnitType::Program | UnitType::Firewall) => match player {
            Player::Attacker => matches!(direction, Direction::Up | Direction::Left),
            Player::Defender => matches!(direction, Direction::Down | Direction::Right),
        },
        (Player::Attacker, UnitType::Virus) | (Player::Defender, UnitType::Tech) => true,
        (Player::Attacker, UnitType::Tech) | (Player::Defender, UnitType::Virus) => false,
    }
}

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub player: Player,
    pub unit_type: UnitType,
    pub health: u8,
}

impl Unit {
    /// Full-health unit
    pub fn new(player: Player, unit_type: UnitType) -> Self {
        Self::with_health(player, unit_type, MAX_HEALTH)
    }

    pub fn with_health(player: Player, unit_type: UnitType, health: u8) -> Self {
        Self {
            player,
            unit_type,
            health: health.min(MAX_HEALTH),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn has_full_health(&self) -> bool {
        self.health == MAX_HEALTH
    }

    /// Apply a health delta, clamped to [0, MAX_HEALTH]
    pub fn mod_health(&mut self, delta: i32) {
        let health = (i32::from(self.health) + delta).clamp(0, i32::from(MAX_HEALTH));
        self.health = health as u8;
    }

    /// Damage this unit deals to `target`, never more than its health
    pub fn damage_amount(&self, target: &Unit) -> u8 {
        DAMAGE_TABLE[self.unit_type as usize][target.unit_type as usize].min(target.health)
    }

    /// Health this unit restores to `target`, never past full health
    pub fn repair_amount(&self, target: &Unit) -> u8 {
        REPAIR_TABLE[self.unit_type as usize][target.unit_type as usize]
            .min(MAX_HEALTH - target.health)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = format!(
            "{}{}{}",
            self.player.initial(),
            self.unit_type.initial(),
            self.health
        );
        f.pad(&code)
    }
}
