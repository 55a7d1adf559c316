//! Static position evaluation
//!
//! Scores are always from the attacker's point of view: positive favours
//! the attacker, negative the defender.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Coord;
use crate::game::{GameState, Player};
use crate::units::{Unit, UnitType};

/// Search score
pub type Score = i32;

/// Upper bound used as the initial alpha-beta window
pub const MAX_HEURISTIC_SCORE: Score = 2_000_000_000;
/// Lower bound used as the initial alpha-beta window
pub const MIN_HEURISTIC_SCORE: Score = -2_000_000_000;

/// Available evaluators
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heuristic {
    /// e0: 9999 per AI, 3 per other unit
    #[default]
    #[serde(rename = "e0", alias = "material")]
    MaterialCount,
    /// e1: always 0
    #[serde(rename = "e1", alias = "neutral")]
    Neutral,
    /// e2: health weighted by unit role
    #[serde(rename = "e2", alias = "health")]
    HealthWeighted,
}

impl Heuristic {
    /// Score a set of (coordinate, unit) pairs
    pub fn evaluate<I>(self, units: I) -> Score
    where
        I: IntoIterator<Item = (Coord, Unit)>,
    {
        match self {
            Heuristic::MaterialCount => units.into_iter().map(|(_, u)| material(&u)).sum(),
            Heuristic::Neutral => 0,
            Heuristic::HealthWeighted => units.into_iter().map(|(_, u)| weighted_health(&u)).sum(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::MaterialCount => "e0",
            Heuristic::Neutral => "e1",
            Heuristic::HealthWeighted => "e2",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Heuristic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "e0" | "material" => Ok(Heuristic::MaterialCount),
            "e1" | "neutral" => Ok(Heuristic::Neutral),
            "e2" | "health" => Ok(Heuristic::HealthWeighted),
            other => anyhow::bail!("unknown heuristic {other:?} (e0|e1|e2)"),
        }
    }
}

fn signed(player: Player, value: Score) -> Score {
    match player {
        Player::Attacker => value,
        Player::Defender => -value,
    }
}

fn material(unit: &Unit) -> Score {
    let value = if unit.unit_type == UnitType::AI { 9999 } else { 3 };
    signed(unit.player, value)
}

fn weighted_health(unit: &Unit) -> Score {
    let weight = match (unit.player, unit.unit_type) {
        (_, UnitType::AI) => 1000,
        (Player::Attacker, UnitType::Virus) | (Player::Defender, UnitType::Tech) => 30,
        _ => 10,
    };
    signed(unit.player, weight * Score::from(unit.health))
}

/// Evaluate a state with its configured heuristic
pub fn evaluate(state: &GameState) -> Score {
    state.options().heuristic.evaluate(state.units())
}
