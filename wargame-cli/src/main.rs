//! AI Wargame CLI
//!
//! Plays one game in the terminal. Options come from defaults, then an
//! optional JSON config file, then command-line flags.

mod play;
mod trace;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wargame_core::{GameType, Heuristic, Options};

use crate::play::PlayArgs;

#[derive(Parser)]
#[command(name = "wargame")]
#[command(about = "Two-player grid wargame with a minimax/alpha-beta opponent")]
struct Cli {
    /// JSON options file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Board dimension (4..=16)
    #[arg(long)]
    dim: Option<u8>,
    #[arg(long)]
    max_depth: Option<u32>,
    /// Seconds allowed per computer move
    #[arg(long)]
    max_time: Option<f64>,
    /// auto | attacker | defender | manual
    #[arg(long)]
    game_type: Option<GameType>,
    /// e0 | e1 | e2
    #[arg(long)]
    heuristic: Option<Heuristic>,
    #[arg(long, action = clap::ArgAction::Set)]
    alpha_beta: Option<bool>,
    /// Turn limit, 0 for unlimited
    #[arg(long)]
    max_turns: Option<u32>,
    /// Keep the generated move order in search
    #[arg(long)]
    no_randomize: bool,
    /// Seed for the move-order RNG
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    broker: Option<String>,
    /// Where the game trace file is written
    #[arg(long, default_value = ".")]
    trace_dir: PathBuf,
    #[arg(long)]
    no_trace: bool,
    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn options(&self) -> anyhow::Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };

        if let Some(dim) = self.dim {
            options.dim = dim;
        }
        if let Some(max_depth) = self.max_depth {
            options.max_depth = max_depth;
        }
        if let Some(max_time) = self.max_time {
            options.max_time = max_time;
        }
        if let Some(game_type) = self.game_type {
            options.game_type = game_type;
        }
        if let Some(heuristic) = self.heuristic {
            options.heuristic = heuristic;
        }
        if let Some(alpha_beta) = self.alpha_beta {
            options.alpha_beta = alpha_beta;
        }
        if let Some(max_turns) = self.max_turns {
            options.max_turns = (max_turns > 0).then_some(max_turns);
        }
        if self.no_randomize {
            options.randomize_moves = false;
        }
        if self.broker.is_some() {
            options.broker = self.broker.clone();
        }

        options.validate()?;
        Ok(options)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.options()?;

    let args = PlayArgs {
        seed: cli.seed,
        trace_dir: (!cli.no_trace).then(|| cli.trace_dir.clone()),
        json: cli.json,
    };
    play::run(options, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "wargame",
            "--dim",
            "6",
            "--game-type",
            "auto",
            "--heuristic",
            "e2",
            "--alpha-beta",
            "false",
            "--max-turns",
            "0",
            "--no-randomize",
        ]);
        let options = cli.options().unwrap();

        assert_eq!(options.dim, 6);
        assert_eq!(options.game_type, GameType::CompVsComp);
        assert_eq!(options.heuristic, Heuristic::HealthWeighted);
        assert!(!options.alpha_beta);
        assert_eq!(options.max_turns, None);
        assert!(!options.randomize_moves);
        assert_eq!(options.max_depth, Options::default().max_depth);
    }

    #[test]
    fn test_invalid_dimension_is_rejected() {
        let cli = Cli::parse_from(["wargame", "--dim", "3"]);
        assert!(cli.options().is_err());
    }
}
