//! Win detection for N×N boards.
//!
//! A win always means a complete line of length N: one of the N rows, one of
//! the N columns, or one of the two diagonals.

use crate::types::{Board, Square, Symbol};
use tracing::instrument;

/// Every line of an N×N board in scan order: rows top to bottom, columns left
/// to right, the main diagonal, then the anti-diagonal.
pub fn lines(size: usize) -> impl Iterator<Item = Vec<usize>> {
    let rows = (0..size).map(move |r| (0..size).map(|i| r * size + i).collect::<Vec<_>>());
    let cols = (0..size).map(move |c| (0..size).map(|i| i * size + c).collect::<Vec<_>>());
    let main = std::iter::once((0..size).map(|i| i * size + i).collect::<Vec<_>>());
    let anti = std::iter::once((0..size).map(|i| i * size + (size - 1 - i)).collect::<Vec<_>>());
    rows.chain(cols).chain(main).chain(anti)
}

/// Returns the first line entirely held by `symbol`, if any.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn winning_line(board: &Board, symbol: Symbol) -> Option<Vec<usize>> {
    let target = Square::Occupied(symbol);
    lines(board.size().get()).find(|line| line.iter().all(|&i| board.get(i) == Some(target)))
}

/// Checks if `symbol` holds a complete line.
pub fn check_win(board: &Board, symbol: Symbol) -> bool {
    winning_line(board, symbol).is_some()
}

/// Returns the symbol holding a complete line, X checked first.
pub fn winner(board: &Board) -> Option<Symbol> {
    [Symbol::X, Symbol::O]
        .into_iter()
        .find(|&symbol| check_win(board, symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridSize;

    fn board(n: usize, layout: &str) -> Board {
        Board::parse(GridSize::new(n).unwrap(), layout).unwrap()
    }

    #[test]
    fn test_line_count_and_order() {
        let all: Vec<_> = lines(3).collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], vec![0, 1, 2]);
        assert_eq!(all[3], vec![0, 3, 6]);
        assert_eq!(all[6], vec![0, 4, 8]);
        assert_eq!(all[7], vec![2, 4, 6]);
        assert_eq!(lines(5).count(), 12);
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(winner(&Board::default()), None);
    }

    #[test]
    fn test_winner_top_row() {
        assert!(check_win(&board(3, "XXX OO. ..."), Symbol::X));
        assert!(!check_win(&board(3, "XXX OO. ..."), Symbol::O));
    }

    #[test]
    fn test_anti_diagonal_on_four_by_four() {
        let b = board(4, "...O ..O. .O.. O...");
        assert_eq!(winning_line(&b, Symbol::O), Some(vec![3, 6, 9, 12]));
    }

    #[test]
    fn test_three_in_a_row_is_not_enough_on_larger_boards() {
        assert!(!check_win(&board(4, "XXX. .... .... ...."), Symbol::X));
        assert!(!check_win(&board(5, "X.... .X... ..X.. ..... ....."), Symbol::X));
    }

    #[test]
    fn test_first_line_in_scan_order_wins_ties() {
        // Row 0 and column 0 both complete; the row comes first.
        let b = board(3, "XXX X.. X..");
        assert_eq!(winning_line(&b, Symbol::X), Some(vec![0, 1, 2]));
        // Column 2 and the anti-diagonal both complete; the column comes first.
        let b = board(3, "..X .XX X.X");
        assert_eq!(winning_line(&b, Symbol::X), Some(vec![2, 5, 8]));
    }
}
