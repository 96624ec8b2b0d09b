//! Reading human moves from a text stream

use std::io::{BufRead, Write};

use anyhow::{bail, Result};

use wargame_core::{GameState, Move};

/// Prompt until a legal move for the side to move is entered.
/// Malformed text, off-board coordinates and illegal moves all reprompt.
pub fn read_move<R: BufRead, W: Write>(state: &GameState, input: &mut R, out: &mut W) -> Result<Move> {
    loop {
        write!(out, "Player {}, enter your move: ", state.next_side())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed while waiting for a move");
        }

        match line.parse::<Move>() {
            Ok(mv) if mv.is_on_board(state.dim()) => {
                if state.is_valid_move(mv) {
                    return Ok(mv);
                }
                writeln!(out, "The move is not valid! Try again.")?;
            }
            _ => writeln!(out, "Invalid coordinates! Try again.")?,
        }
    }
}
