//! Square board geometry with (row, col) coordinates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Default board dimension
pub const DEFAULT_DIM: u8 = 5;

/// Largest board the text coordinates can address (hex digit columns)
pub const MAX_DIM: u8 = 16;

const ROW_LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const COL_LABELS: &[u8] = b"0123456789abcdef";

/// Characters ignored when parsing typed moves
const SEPARATORS: &[char] = &[' ', ',', '.', ':', ';', '-', '_'];

/// Board cell coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this coordinate is on a `dim` x `dim` board
    pub fn is_valid(&self, dim: u8) -> bool {
        let dim = dim as i8;
        self.row >= 0 && self.row < dim && self.col >= 0 && self.col < dim
    }

    /// Offset by a (row, col) delta
    pub fn offset(&self, (dr, dc): (i8, i8)) -> Coord {
        Coord::new(self.row + dr, self.col + dc)
    }

    /// Chebyshev (king-move) distance
    pub fn distance_to(&self, other: Coord) -> i8 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// Neighbor in direction (0-3)
    pub fn neighbor(&self, direction: usize) -> Coord {
        self.offset(DIRECTIONS[direction % 4])
    }

    /// The four orthogonal neighbors in generator order: up, left, down, right
    pub fn iter_adjacent(&self) -> impl Iterator<Item = Coord> {
        let origin = *self;
        DIRECTIONS.iter().map(move |&d| origin.offset(d))
    }

    /// Every coordinate in the square of radius `dist` centered here, self included.
    /// May yield off-board coordinates.
    pub fn iter_range(&self, dist: i8) -> impl Iterator<Item = Coord> {
        let origin = *self;
        (origin.row - dist..=origin.row + dist).flat_map(move |row| {
            (origin.col - dist..=origin.col + dist).map(move |col| Coord::new(row, col))
        })
    }

    /// Row label character ('?' when out of range)
    pub fn row_label(&self) -> char {
        label(ROW_LABELS, self.row)
    }

    /// Column label character ('?' when out of range)
    pub fn col_label(&self) -> char {
        label(COL_LABELS, self.col)
    }

    fn parse_chars(row: char, col: char) -> Option<Coord> {
        let row = ROW_LABELS.iter().position(|&c| c as char == row.to_ascii_uppercase())?;
        let col = COL_LABELS.iter().position(|&c| c as char == col.to_ascii_lowercase())?;
        Some(Coord::new(row as i8, col as i8))
    }
}

fn label(labels: &[u8], index: i8) -> char {
    usize::try_from(index)
        .ok()
        .and_then(|i| labels.get(i))
        .map(|&c| c as char)
        .unwrap_or('?')
}

/// Strip whitespace and separator characters from typed input
fn normalize(s: &str) -> Vec<char> {
    s.trim().chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.col_label())
    }
}

impl FromStr for Coord {
    type Err = GameError;

    /// Parse "D2" style text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_slice() {
            &[row, col] => Coord::parse_chars(row, col)
                .ok_or_else(|| GameError::InvalidCoordinateText(s.to_string())),
            _ => Err(GameError::InvalidCoordinateText(s.to_string())),
        }
    }
}

/// Direction vectors (dr, dc) in candidate order
/// Index: 0=up, 1=left, 2=down, 3=right
pub const DIRECTIONS: [(i8, i8); 4] = [
    (-1, 0), // up
    (0, -1), // left
    (1, 0),  // down
    (0, 1),  // right
];

pub const UP: usize = 0;
pub const LEFT: usize = 1;
pub const DOWN: usize = 2;
pub const RIGHT: usize = 3;

/// A move from `src` to `dst`; `src == dst` is a self-destruct
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub src: Coord,
    pub dst: Coord,
}

impl Move {
    pub const fn new(src: Coord, dst: Coord) -> Self {
        Self { src, dst }
    }

    pub const fn from_quad(src_row: i8, src_col: i8, dst_row: i8, dst_col: i8) -> Self {
        Self::new(Coord::new(src_row, src_col), Coord::new(dst_row, dst_col))
    }

    pub const fn self_destruct(at: Coord) -> Self {
        Self::new(at, at)
    }

    pub fn is_self_destruct(&self) -> bool {
        self.src == self.dst
    }

    /// Both ends lie on a `dim` x `dim` board
    pub fn is_on_board(&self, dim: u8) -> bool {
        self.src.is_valid(dim) && self.dst.is_valid(dim)
    }

    /// Destination is exactly one orthogonal step away from the source
    pub fn is_orthogonal_step(&self) -> bool {
        let dr = (self.dst.row - self.src.row).abs();
        let dc = (self.dst.col - self.src.col).abs();
        dr + dc == 1
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.src, self.dst)
    }
}

impl FromStr for Move {
    type Err = GameError;

    /// Parse "A3 B3" style text: row letter, hex column, twice
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_slice() {
            &[r0, c0, r1, c1] => {
                let src = Coord::parse_chars(r0, c0);
                let dst = Coord::parse_chars(r1, c1);
                match (src, dst) {
                    (Some(src), Some(dst)) => Ok(Move::new(src, dst)),
                    _ => Err(GameError::InvalidCoordinateText(s.to_string())),
                }
            }
            _ => Err(GameError::InvalidCoordinateText(s.to_string())),
        }
    }
}
