//! Game trace - append-only text log of a game
//!
//! Receives the game parameters, every move result, the search report of
//! each computer turn, the board after every turn and the winner line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use wargame_core::{GameOptions, GameState, SearchOutcome, SessionStats, Side};

/// `gameTrace-{alpha_beta}-{max_time}-{max_turns}.txt`
pub fn trace_file_name(options: &GameOptions) -> String {
    let max_turns = options
        .max_turns
        .map_or_else(|| "none".to_string(), |t| t.to_string());
    format!(
        "gameTrace-{}-{}-{}.txt",
        options.search.alpha_beta, options.search.max_time_secs, max_turns
    )
}

pub struct GameTrace<W: Write> {
    sink: W,
}

impl GameTrace<BufWriter<File>> {
    /// Create (truncating) the trace file for these options inside `dir`
    pub fn create(dir: &Path, options: &GameOptions) -> Result<Self> {
        let path = dir.join(trace_file_name(options));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create trace file {}", path.display()))?;
        tracing::info!("Writing game trace to {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> GameTrace<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn header(&mut self, options: &GameOptions) -> Result<()> {
        let max_turns = options
            .max_turns
            .map_or_else(|| "none".to_string(), |t| t.to_string());
        writeln!(self.sink, "The game parameters:")?;
        writeln!(self.sink, "--Value of timeout in s: {}", options.search.max_time_secs)?;
        writeln!(self.sink, "--Max number of turns: {max_turns}")?;
        writeln!(self.sink, "--Is alpha-beta on : {}", options.search.alpha_beta)?;
        writeln!(self.sink, "--Play mode: {}", options.game_type)?;
        writeln!(self.sink)?;
        self.sink.flush()?;
        Ok(())
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.sink, "{text}")?;
        self.sink.flush()?;
        Ok(())
    }

    pub fn board(&mut self, state: &GameState) -> Result<()> {
        writeln!(self.sink)?;
        write!(self.sink, "{state}")?;
        writeln!(self.sink)?;
        self.sink.flush()?;
        Ok(())
    }

    pub fn winner(&mut self, side: Side) -> Result<()> {
        self.line(&format!("{side} wins!"))
    }
}

// ============================================================================
// SEARCH REPORT
// ============================================================================

/// Lines describing one search, written to both the console and the trace
pub fn search_report(outcome: &SearchOutcome, session: &SessionStats) -> Vec<String> {
    let stats = &outcome.stats;
    let per_ply = stats.nodes_per_ply(outcome.depth);
    let total = stats.total_nodes();

    let counts: String = per_ply
        .iter()
        .map(|(ply, count)| format!("{ply}:{count} "))
        .collect();
    let percentages: String = per_ply
        .iter()
        .map(|&(ply, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            };
            format!("{ply}:{pct:.1}% ")
        })
        .collect();
    let branching = stats
        .branching_factor()
        .map_or_else(|| "n/a".to_string(), |b| format!("{b:.1}"));

    vec![
        format!("Heuristic score: {}", outcome.score),
        format!("Cumulative evals: {}", session.total_nodes),
        format!("Evals per depth: {}", counts.trim_end()),
        format!("% evals per depth: {}", percentages.trim_end()),
        format!("Branching factor: {branching}"),
    ]
}

/// Console-only timing lines
pub fn performance_report(outcome: &SearchOutcome, session: &SessionStats) -> Vec<String> {
    let mut lines = Vec::new();
    if session.total_seconds > 0.0 {
        lines.push(format!("Eval perf.: {:.1}k/s", session.nodes_per_second() / 1000.0));
    }
    lines.push(format!("Elapsed time: {:.1}s", outcome.stats.elapsed_seconds));
    lines
}
