//! AI Wargame Core - Game engine and AI
//!
//! This crate provides the core game logic for the wargame:
//! - Board geometry (square grid, lettered rows and hex-digit columns)
//! - Unit kinds with damage and repair tables
//! - Game state, move validation, execution and generation
//! - Pluggable position evaluation (material, health, multi-factor)
//! - Minimax AI with optional alpha-beta pruning and search statistics
//! - Game options loaded from JSON

pub mod board;
pub mod error;
pub mod units;
pub mod game;
pub mod eval;
pub mod stats;
pub mod ai;
pub mod options;

// Re-exports for convenient access
pub use board::{Coord, Move, DEFAULT_DIM, MAX_DIM};
pub use error::{GameError, Result};
pub use units::{Unit, UnitKind, MAX_HEALTH};
pub use game::{GameResult, GameState, MoveKind, Side, DEFAULT_MAX_TURNS, TURN_LIMIT_WINNER};
pub use eval::{Evaluator, HealthEval, HeuristicKind, MaterialEval, MultiFactorEval};
pub use stats::{SearchStats, SessionStats};
pub use ai::{AlphaBetaAI, SearchConfig, SearchOutcome};
pub use options::{GameOptions, GameType};
