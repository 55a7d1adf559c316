//! Game configuration shared by every state of a game

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::board::MAX_DIM;
use crate::eval::Heuristic;
use crate::game::Player;

/// Smallest board on which the initial deployment fits without overlap
pub const MIN_DIM: u8 = 4;

/// Who plays each side
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    #[default]
    #[serde(rename = "manual")]
    AttackerVsDefender,
    #[serde(rename = "attacker")]
    AttackerVsComp,
    #[serde(rename = "defender")]
    CompVsDefender,
    #[serde(rename = "auto")]
    CompVsComp,
}

impl GameType {
    /// Whether the engine chooses moves for `player`
    pub fn is_computer(self, player: Player) -> bool {
        match self {
            GameType::AttackerVsDefender => false,
            GameType::AttackerVsComp => player == Player::Defender,
            GameType::CompVsDefender => player == Player::Attacker,
            GameType::CompVsComp => true,
        }
    }

    pub fn has_computer(self) -> bool {
        self != GameType::AttackerVsDefender
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p1, p2) = match self {
            GameType::AttackerVsDefender => ("H", "H"),
            GameType::AttackerVsComp => ("H", "AI"),
            GameType::CompVsDefender => ("AI", "H"),
            GameType::CompVsComp => ("AI", "AI"),
        };
        write!(f, "Player 1 = {p1}, Player 2 = {p2}")
    }
}

impl FromStr for GameType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(GameType::AttackerVsDefender),
            "attacker" => Ok(GameType::AttackerVsComp),
            "defender" => Ok(GameType::CompVsDefender),
            "auto" => Ok(GameType::CompVsComp),
            other => anyhow::bail!("unknown game type {other:?} (auto|attacker|defender|manual)"),
        }
    }
}

/// Game options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Board dimension
    pub dim: u8,
    /// Deepest iterative-deepening iteration
    pub max_depth: u32,
    /// Wall-clock budget per computer move, in seconds
    pub max_time: f64,
    pub game_type: GameType,
    /// Alpha-beta pruning on/off
    pub alpha_beta: bool,
    /// Turn limit; reaching it hands the win to the defender
    pub max_turns: Option<u32>,
    /// Shuffle candidate order at each search node
    pub randomize_moves: bool,
    /// Remote relay address (not used by the engine)
    pub broker: Option<String>,
    pub heuristic: Heuristic,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dim: 5,
            max_depth: 4,
            max_time: 5.0,
            game_type: GameType::AttackerVsDefender,
            alpha_beta: true,
            max_turns: Some(100),
            randomize_moves: true,
            broker: None,
            heuristic: Heuristic::MaterialCount,
        }
    }
}

impl Options {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        let options: Options = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse options file: {}", path.display()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (MIN_DIM..=MAX_DIM).contains(&self.dim),
            "board dimension {} outside {}..={}",
            self.dim,
            MIN_DIM,
            MAX_DIM
        );
        ensure!(self.max_depth > 0, "max depth must be at least 1");
        ensure!(
            self.max_time.is_finite() && self.max_time >= 0.0,
            "max time must be a non-negative number of seconds, got {}",
            self.max_time
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let options = Options::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.dim, 5);
        assert_eq!(options.max_turns, Some(100));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let small = Options { dim: 3, ..Options::default() };
        assert!(small.validate().is_err());
        let shallow = Options { max_depth: 0, ..Options::default() };
        assert!(shallow.validate().is_err());
        let negative = Options { max_time: -1.0, ..Options::default() };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_game_type_roles() {
        assert!(!GameType::AttackerVsDefender.is_computer(Player::Attacker));
        assert!(GameType::AttackerVsComp.is_computer(Player::Defender));
        assert!(!GameType::AttackerVsComp.is_computer(Player::Attacker));
        assert!(GameType::CompVsDefender.is_computer(Player::Attacker));
        assert!(GameType::CompVsComp.is_computer(Player::Defender));
        assert_eq!("auto".parse::<GameType>().ok(), Some(GameType::CompVsComp));
        assert!("solo".parse::<GameType>().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"dim": 6, "heuristic": "e2", "game_type": "auto", "max_turns": null}}"#
        )
        .unwrap();

        let options = Options::load(file.path()).unwrap();
        assert_eq!(options.dim, 6);
        assert_eq!(options.heuristic, Heuristic::HealthWeighted);
        assert_eq!(options.game_type, GameType::CompVsComp);
        assert_eq!(options.max_turns, None);
        assert_eq!(options.max_depth, 4);
    }
}
