//! Play command - run one game between humans, the computer, or a remote broker
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: resolve_options(), GameSession::run()
//! - Level 3: human_turn(), broker_turn(), computer_turn()
//! - Level 4: option overrides, console output

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use wargame_broker::BrokerClient;
use wargame_core::{AlphaBetaAI, GameOptions, GameState, GameType, HeuristicKind, Side};

use crate::input::read_move;
use crate::trace::{performance_report, search_report, GameTrace};

/// Pause before polling again after the broker relayed an illegal move
const BROKER_REJECT_DELAY: Duration = Duration::from_millis(100);

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args, Clone, Debug, Default)]
pub struct PlayArgs {
    /// Options JSON file (flags below override its values)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum search depth in plies
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Plies near the root that always finish, even past the time budget
    #[arg(long)]
    pub min_depth: Option<u32>,

    /// Time budget per computer move, in seconds
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Turn limit (the defender wins when it runs out)
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Plain minimax without alpha-beta pruning
    #[arg(long)]
    pub no_alpha_beta: bool,

    /// Shuffle candidate moves before searching them
    #[arg(long)]
    pub randomize: bool,

    /// Seed for move shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Evaluation heuristic: material|health|multi (or e0|e1|e2)
    #[arg(long)]
    pub heuristic: Option<HeuristicKind>,

    /// Game type: manual|attacker|defender|auto (default manual)
    #[arg(long)]
    pub game_type: Option<GameType>,

    /// Move broker base URL, e.g. http://localhost:8001
    #[arg(long)]
    pub broker: Option<String>,

    /// Directory the game trace file is written to
    #[arg(long, default_value = ".")]
    pub trace_dir: PathBuf,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Resolve options (file + flags)
/// 2. Open the trace file
/// 3. Play until there is a winner
pub fn run(args: PlayArgs) -> Result<()> {
    let options = resolve_options(&args)?;

    tracing::info!(
        "Starting {} game: dim={}, depth={}, time={}s, alpha-beta={}, heuristic={}",
        options.game_type,
        options.dim,
        options.search.max_depth,
        options.search.max_time_secs,
        options.search.alpha_beta,
        options.heuristic
    );

    let trace = GameTrace::create(&args.trace_dir, &options)?;
    let stdin = io::stdin();
    let mut session = GameSession::new(options, trace, stdin.lock(), io::stdout())?;
    session.run()?;

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Load the options file (or defaults), apply flag overrides, validate
fn resolve_options(args: &PlayArgs) -> Result<GameOptions> {
    let mut options = match &args.config {
        Some(path) => GameOptions::load(path)
            .with_context(|| format!("Failed to load options: {}", path.display()))?,
        None => GameOptions::default(),
    };
    apply_overrides(&mut options, args);
    options.validate()?;
    Ok(options)
}

/// One running game and everything it talks to
pub struct GameSession<R, W, T: Write> {
    options: GameOptions,
    state: GameState,
    ai: AlphaBetaAI,
    broker: Option<BrokerClient>,
    trace: GameTrace<T>,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write, T: Write> GameSession<R, W, T> {
    pub fn new(options: GameOptions, trace: GameTrace<T>, input: R, out: W) -> Result<Self> {
        let broker = match &options.broker {
            Some(url) => Some(
                BrokerClient::new(url)
                    .with_context(|| format!("Failed to set up broker client for {url}"))?,
            ),
            None => None,
        };
        Ok(Self {
            state: options.new_game(),
            ai: options.computer_player(),
            options,
            broker,
            trace,
            input,
            out,
        })
    }

    /// Play turns until a winner exists, returning it
    pub fn run(&mut self) -> Result<Side> {
        self.trace.header(&self.options)?;
        writeln!(self.out, "{}", self.state)?;

        loop {
            if let Some(winner) = self.state.winner() {
                writeln!(self.out, "{winner} wins!")?;
                self.trace.winner(winner)?;
                tracing::info!(%winner, turns = self.state.turns_played, "game over");
                return Ok(winner);
            }

            let side = self.state.next_side();
            if self.options.game_type.is_human(side) {
                self.human_turn()?;
            } else {
                self.computer_turn()?;
            }

            writeln!(self.out)?;
            writeln!(self.out, "{}", self.state)?;
            self.trace.board(&self.state)?;
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    // ========================================================================
    // LEVEL 3 - TURNS
    // ========================================================================

    /// Human move, from the broker when one is configured, otherwise from input
    fn human_turn(&mut self) -> Result<()> {
        let side = self.state.next_side();
        if let Some(client) = self.broker.clone() {
            return self.broker_turn(&client);
        }

        let mv = read_move(&self.state, &mut self.input, &mut self.out)?;
        let result = self.state.perform_move(mv)?;
        self.state.next_turn();

        let line = format!("Player {side}: {result}");
        writeln!(self.out, "{line}")?;
        self.trace.line(&line)
    }

    /// Wait for the opponent's move relayed by the broker
    fn broker_turn(&mut self, client: &BrokerClient) -> Result<()> {
        let side = self.state.next_side();
        let expected_turn = self.state.turns_played + 1;
        writeln!(self.out, "Getting next move with auto-retry from game broker...")?;

        let result = loop {
            let mv = client.wait_for_move(expected_turn);
            match self.state.perform_move(mv) {
                Ok(result) => break result,
                Err(e) => {
                    tracing::warn!(error = %e, turn = expected_turn, "broker relayed an illegal move");
                    thread::sleep(BROKER_REJECT_DELAY);
                }
            }
        };
        self.state.next_turn();

        let line = format!("Broker {side}: {result}");
        writeln!(self.out, "{line}")?;
        self.trace.line(&line)
    }

    /// Search, report, play, and relay the move to the broker
    fn computer_turn(&mut self) -> Result<()> {
        let side = self.state.next_side();
        let outcome = self.ai.suggest_move(&self.state);

        for line in search_report(&outcome, self.ai.session()) {
            writeln!(self.out, "{line}")?;
            self.trace.line(&line)?;
        }
        for line in performance_report(&outcome, self.ai.session()) {
            writeln!(self.out, "{line}")?;
        }

        let mv = outcome
            .require_move()
            .with_context(|| format!("Computer {side} doesn't know what to do"))?;
        let result = self.state.perform_move(mv)?;
        self.state.next_turn();

        let line = format!("Computer {side}: {result}");
        writeln!(self.out, "{line}")?;
        self.trace.line(&line)?;

        if let Some(client) = &self.broker {
            if let Err(e) = client.post_move(mv, self.state.turns_played) {
                tracing::warn!(error = %e, "failed to send move to broker");
            }
        }
        Ok(())
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Flags take precedence over the options file
fn apply_overrides(options: &mut GameOptions, args: &PlayArgs) {
    let search = &mut options.search;
    if let Some(depth) = args.max_depth {
        search.max_depth = depth;
    }
    if let Some(depth) = args.min_depth {
        search.min_depth = depth;
    }
    if let Some(seconds) = args.max_time {
        search.max_time_secs = seconds;
    }
    if args.no_alpha_beta {
        search.alpha_beta = false;
    }
    if args.randomize {
        search.randomize_moves = true;
    }
    if args.seed.is_some() {
        search.seed = args.seed;
    }
    if let Some(turns) = args.max_turns {
        options.max_turns = Some(turns);
    }
    if let Some(heuristic) = args.heuristic {
        options.heuristic = heuristic;
    }
    if let Some(game_type) = args.game_type {
        options.game_type = game_type;
    }
    if let Some(broker) = &args.broker {
        options.broker = Some(broker.clone());
    }
}

// ============================================================================
// TESTS
// ============================================================================
