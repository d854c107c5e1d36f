//! Draw detection.

use super::win::winner;
use crate::types::Board;
use tracing::instrument;

/// Checks for a draw: every square occupied and nobody holds a line.
///
/// A move that fills the last square while completing a line is a win, so the
/// win check runs first.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn check_draw(board: &Board) -> bool {
    board.is_full() && winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridSize;

    fn board(layout: &str) -> Board {
        Board::parse(GridSize::default(), layout).unwrap()
    }

    #[test]
    fn test_empty_board_is_not_draw() {
        assert!(!check_draw(&Board::default()));
    }

    #[test]
    fn test_partial_board_is_not_draw() {
        assert!(!check_draw(&board("XO. ... ...")));
    }

    #[test]
    fn test_draw_detection() {
        assert!(check_draw(&board("XOX OXX OXO")));
    }

    #[test]
    fn test_full_board_with_winner_is_not_draw() {
        // The final X at index 8 fills the board and completes the diagonal.
        assert!(!check_draw(&board("XOO OXX XOX")));
    }
}
