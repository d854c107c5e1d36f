//! Rules for N×N tic-tac-toe.

mod draw;
mod win;

pub use draw::check_draw;
pub use win::{check_win, lines, winner, winning_line};

use crate::action::MoveError;
use crate::phases::MoveOutcome;
use crate::types::{Board, Symbol};
use tracing::instrument;

/// Places `symbol` at `index` and classifies the result.
///
/// The win check runs before the draw check, so a move that completes a line
/// on the last empty square is a win.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn play(board: &mut Board, index: usize, symbol: Symbol) -> Result<MoveOutcome, MoveError> {
    board.apply_move(index, symbol)?;

    if let Some(line) = winning_line(board, symbol) {
        return Ok(MoveOutcome::Won {
            winner: symbol,
            line,
        });
    }

    if check_draw(board) {
        return Ok(MoveOutcome::Draw);
    }

    Ok(MoveOutcome::Continue {
        next: symbol.opponent(),
    })
}
