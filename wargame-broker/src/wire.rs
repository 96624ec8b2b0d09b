//! JSON shapes exchanged with the broker

use serde::{Deserialize, Serialize};
use wargame_core::{Coord, Move};

/// A move as relayed between players: `{from:{row,col}, to:{row,col}, turn}`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    pub from: Coord,
    pub to: Coord,
    /// Turn number the move is played on (turns played before it + 1)
    pub turn: u32,
}

impl WireMove {
    pub fn new(mv: Move, turn: u32) -> Self {
        Self {
            from: mv.src,
            to: mv.dst,
            turn,
        }
    }

    pub fn to_move(&self) -> Move {
        Move::new(self.from, self.to)
    }
}

/// Response envelope used by every move endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self { success: true, data }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            data: None,
        }
    }
}
