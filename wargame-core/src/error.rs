//! Game error types

use crate::game::Side;

/// Errors raised by the rules engine and move search
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The validator rejected a move (recoverable, try another)
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// Typed coordinates could not be parsed (recoverable, reprompt)
    #[error("invalid coordinates: {0:?}")]
    InvalidCoordinateText(String),

    /// The side to move has nothing to play in an undecided position
    #[error("{0} has no legal moves")]
    NoLegalMoves(Side),
}

pub type Result<T> = std::result::Result<T, GameError>;
