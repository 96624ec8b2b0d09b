//! Minimax AI with optional alpha-beta pruning
//!
//! The caller's state is never mutated. Each branch gets its own owned child
//! state (`GameState::play`), so siblings never see each other's mutations and
//! no undo step is needed.

use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::Move;
use crate::error::{GameError, Result};
use crate::eval::{Evaluator, HeuristicKind, MAX_HEURISTIC_SCORE, MIN_HEURISTIC_SCORE};
use crate::game::{GameState, Side};
use crate::stats::{SearchStats, SessionStats};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Search limits
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched below the root
    pub max_depth: u32,
    /// Plies near the root that always finish all siblings, whatever the clock says
    pub min_depth: u32,
    /// Time budget per search, in seconds
    pub max_time_secs: f64,
    /// Alpha-beta pruning on/off
    pub alpha_beta: bool,
    /// Shuffle candidate moves before searching them
    pub randomize_moves: bool,
    /// Seed for move shuffling (None = fixed default seed)
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            min_depth: 0,
            max_time_secs: 5.0,
            alpha_beta: true,
            randomize_moves: false,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.max_time_secs = seconds;
        self
    }

    pub fn with_pruning(mut self, alpha_beta: bool) -> Self {
        self.alpha_beta = alpha_beta;
        self
    }

    pub fn with_randomized_moves(mut self, seed: u64) -> Self {
        self.randomize_moves = true;
        self.seed = Some(seed);
        self
    }

    /// Non-positive (or NaN) limits give a zero budget; limits too large for
    /// `Duration` saturate instead of wrapping to zero.
    pub fn time_budget(&self) -> Duration {
        if self.max_time_secs.is_nan() || self.max_time_secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.max_time_secs).unwrap_or(Duration::MAX)
    }
}

/// Seed used when none is configured
const DEFAULT_SEED: u64 = 42;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Result of one top-level search
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// Best move, None when the side to move has nothing to play
    pub best_move: Option<Move>,
    /// Heuristic score of the best line, from the searching side's view
    pub score: i32,
    /// Depth the root was searched at
    pub depth: u32,
    /// Side the search was run for
    pub side: Side,
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// The chosen move, or `NoLegalMoves` for the searching side
    pub fn require_move(&self) -> Result<Move> {
        self.best_move.ok_or(GameError::NoLegalMoves(self.side))
    }
}

// ============================================================================
// SEARCH CONTEXT
// ============================================================================

/// Per-invocation search state threaded through the recursion
struct SearchContext<'a> {
    config: &'a SearchConfig,
    evaluator: &'a dyn Evaluator,
    maximizing_side: Side,
    root_depth: u32,
    started: Instant,
    budget: Duration,
    stats: SearchStats,
    rng: &'a mut ChaCha8Rng,
}

impl SearchContext<'_> {
    fn leaf_score(&self, state: &GameState) -> i32 {
        self.evaluator.evaluate(state, self.maximizing_side)
    }

    /// Time is up and this node is deep enough to honor it
    fn out_of_time(&self, depth_remaining: u32) -> bool {
        let ply = self.root_depth - depth_remaining;
        ply >= self.config.min_depth && self.started.elapsed() >= self.budget
    }
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

fn minimax(
    state: &GameState,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    ctx: &mut SearchContext<'_>,
) -> (i32, Option<Move>) {
    ctx.stats.record_node(depth);

    if depth == 0 || state.is_finished() {
        return (ctx.leaf_score(state), None);
    }

    let mut moves = state.legal_moves();
    if moves.is_empty() {
        return (ctx.leaf_score(state), None);
    }
    if ctx.config.randomize_moves {
        moves.shuffle(&mut *ctx.rng);
    }

    let mut best_score = if maximizing {
        MIN_HEURISTIC_SCORE
    } else {
        MAX_HEURISTIC_SCORE
    };
    let mut best_move = None;

    for mv in moves {
        let Ok(child) = state.play(mv) else {
            continue;
        };
        let (score, _) = minimax(&child, depth - 1, alpha, beta, !maximizing, ctx);

        // Strict comparison keeps the first of equally good moves
        let improved = if maximizing {
            score > best_score
        } else {
            score < best_score
        };
        if best_move.is_none() || improved {
            best_score = score;
            best_move = Some(mv);
        }

        if ctx.out_of_time(depth) {
            break;
        }

        if ctx.config.alpha_beta {
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
            if alpha >= beta {
                break;
            }
        }
    }

    (best_score, best_move)
}

/// Run one bounded search for the side to move.
///
/// The root is always expanded, so a depth of 0 still picks among the
/// immediate moves by comparing the heuristic of their resulting positions.
pub fn search(
    state: &GameState,
    config: &SearchConfig,
    evaluator: &dyn Evaluator,
    rng: &mut ChaCha8Rng,
) -> SearchOutcome {
    let started = Instant::now();
    let depth = config.max_depth.max(1);
    let side = state.next_side();

    let mut ctx = SearchContext {
        config,
        evaluator,
        maximizing_side: side,
        root_depth: depth,
        started,
        budget: config.time_budget(),
        stats: SearchStats::new(),
        rng,
    };

    let (score, best_move) = minimax(
        state,
        depth,
        MIN_HEURISTIC_SCORE,
        MAX_HEURISTIC_SCORE,
        true,
        &mut ctx,
    );

    let mut stats = ctx.stats;
    stats.elapsed_seconds = started.elapsed().as_secs_f64();

    SearchOutcome {
        best_move,
        score,
        depth,
        side,
        stats,
    }
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
pub struct AlphaBetaAI {
    pub config: SearchConfig,
    evaluator: Box<dyn Evaluator + Send + Sync>,
    rng: ChaCha8Rng,
    session: SessionStats,
}

impl AlphaBetaAI {
    pub fn new(config: SearchConfig, heuristic: HeuristicKind) -> Self {
        Self::with_evaluator(config, heuristic.evaluator())
    }

    pub fn with_evaluator(config: SearchConfig, evaluator: Box<dyn Evaluator + Send + Sync>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));
        Self {
            config,
            evaluator,
            rng,
            session: SessionStats::default(),
        }
    }

    /// Search the position and suggest a move for the side to move
    pub fn suggest_move(&mut self, state: &GameState) -> SearchOutcome {
        let outcome = search(state, &self.config, self.evaluator.as_ref(), &mut self.rng);
        self.session.absorb(&outcome.stats);

        tracing::debug!(
            side = %outcome.side,
            score = outcome.score,
            nodes = outcome.stats.total_nodes(),
            elapsed = outcome.stats.elapsed_seconds,
            best = ?outcome.best_move,
            "search finished"
        );

        outcome
    }

    /// A uniformly random legal move
    pub fn random_move(&mut self, state: &GameState) -> Option<Move> {
        state.legal_moves().choose(&mut self.rng).copied()
    }

    /// Totals across every search made by this player
    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    pub fn heuristic_name(&self) -> &'static str {
        self.evaluator.name()
    }

    /// Evaluate a position for the side to move
    pub fn evaluate(&self, state: &GameState) -> i32 {
        self.evaluator.evaluate(state, state.next_side())
    }

    /// Play both sides until the game ends or a side cannot move
    pub fn play_game(&mut self, initial: GameState) -> (GameState, Vec<Move>) {
        let mut state = initial;
        let mut history = Vec::new();

        while !state.is_finished() {
            let Some(mv) = self.suggest_move(&state).best_move else {
                break;
            };
            match state.play(mv) {
                Ok(next) => state = next,
                Err(_) => break,
            }
            history.push(mv);
        }

        (state, history)
    }
}

// ============================================================================
// TESTS
// ============================================================================
