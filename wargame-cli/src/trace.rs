//! Game trace file: `key: value` sections separated by a rule line

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use wargame_core::{GameState, Options, Player, SearchOutcome, SearchStats};

const RULE_WIDTH: usize = 60;

/// Search figures written alongside a computer move
pub struct SearchReport<'a> {
    pub outcome: &'a SearchOutcome,
    pub elapsed_seconds: f64,
    pub stats: &'a SearchStats,
}

/// Trace writer; a disabled trace accepts every call and writes nothing
pub struct GameTrace {
    out: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl GameTrace {
    pub fn disabled() -> Self {
        Self { out: None, path: None }
    }

    /// Create (truncate) the trace file for these options inside `dir`
    pub fn create(dir: &Path, options: &Options) -> Result<Self> {
        let path = dir.join(file_name(options));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create trace file: {}", path.display()))?;
        Ok(Self {
            out: Some(BufWriter::new(file)),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn section(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        for (key, value) in entries {
            writeln!(out, "{key}: {value}")?;
        }
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        out.flush()?;
        Ok(())
    }

    /// Opening section: options and the initial board
    pub fn parameters(&mut self, game: &GameState) -> Result<()> {
        let options = game.options();
        let mut entries = vec![
            ("Section", "Game Parameters".to_string()),
            ("Timeout Value (seconds)", options.max_time.to_string()),
            ("Max Numbers of Turns", turns_label(options.max_turns)),
            ("Play Modes", options.game_type.to_string()),
        ];
        if options.game_type.has_computer() {
            let alpha_beta = if options.alpha_beta { "on" } else { "off" };
            entries.push(("Alpha-Beta", alpha_beta.to_string()));
            entries.push(("Heuristic", options.heuristic.to_string()));
        }
        entries.push(("Initial Board", game.render()));
        self.section(&entries)
    }

    /// One attempted move, legal or not
    pub fn turn(
        &mut self,
        player_name: &str,
        turn_number: u32,
        action: &str,
        board: &str,
        search: Option<SearchReport<'_>>,
    ) -> Result<()> {
        let mut entries = vec![
            ("Player Name", player_name.to_string()),
            ("Turn Number", turn_number.to_string()),
        ];
        if let Some(report) = search {
            entries.extend(search_entries(&report));
        }
        entries.push(("Action Taken", action.to_string()));
        entries.push(("Current Board", board.to_string()));
        self.section(&entries)
    }

    pub fn winner(&mut self, winner: Player, turns_played: u32) -> Result<()> {
        self.section(&[("Winner", format!("{winner} in {turns_played} turns"))])
    }
}

fn search_entries(report: &SearchReport<'_>) -> Vec<(&'static str, String)> {
    let stats = report.stats;
    let by_depth: String = stats
        .by_depth()
        .iter()
        .map(|(depth, count)| format!("{depth}:{count} "))
        .collect();
    let percent_by_depth: String = stats
        .percent_by_depth()
        .iter()
        .map(|(depth, percent)| format!("{depth}:{percent:.2}% "))
        .collect();

    vec![
        ("Duration of action (seconds)", format!("{:.1}", report.elapsed_seconds)),
        ("Heuristic score", report.outcome.score.to_string()),
        ("Cumulative evals", stats.total_evaluations().to_string()),
        ("Cumulative evals by depth", by_depth),
        ("Cumulative % evals by depth", percent_by_depth),
        ("Average Branching factor", format!("{:.1}", report.outcome.avg_branching)),
    ]
}

fn turns_label(max_turns: Option<u32>) -> String {
    max_turns.map_or_else(|| "none".to_string(), |t| t.to_string())
}

/// `gameTrace-{alpha_beta}-{max_time}-{max_turns}.txt`
pub fn file_name(options: &Options) -> String {
    format!(
        "gameTrace-{}-{:?}-{}.txt",
        options.alpha_beta,
        options.max_time,
        turns_label(options.max_turns)
    )
}
