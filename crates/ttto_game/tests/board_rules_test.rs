//! Win and draw detection across every supported board size.

use ttto_game::{
    Board, GridSize, MoveOutcome, Symbol, check_draw, check_win, lines, play, winner,
};

fn board_with(size: GridSize, marks: &[usize], symbol: Symbol) -> Board {
    let mut board = Board::new(size);
    for &index in marks {
        board.apply_move(index, symbol).unwrap();
    }
    board
}

#[test]
fn test_every_full_line_wins() {
    for n in GridSize::MIN..=GridSize::MAX {
        let size = GridSize::new(n).unwrap();
        let all: Vec<_> = lines(n).collect();
        assert_eq!(all.len(), 2 * n + 2);
        for line in all {
            let board = board_with(size, &line, Symbol::O);
            assert!(check_win(&board, Symbol::O), "size {n}, line {line:?}");
            assert!(!check_win(&board, Symbol::X));
        }
    }
}

#[test]
fn test_line_short_by_one_never_wins() {
    for n in GridSize::MIN..=GridSize::MAX {
        let size = GridSize::new(n).unwrap();
        for line in lines(n) {
            for skip in 0..n {
                let marks: Vec<_> = line
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, &index)| index)
                    .collect();
                let board = board_with(size, &marks, Symbol::X);
                assert_eq!(winner(&board), None, "size {n}, marks {marks:?}");
            }
        }
    }
}

#[test]
fn test_win_on_last_square_is_not_a_draw() {
    // X O X / O X O / O X _ : X completes the main diagonal on the last square.
    let mut board = Board::parse(GridSize::default(), "XOX OXO OX.").unwrap();
    let outcome = play(&mut board, 8, Symbol::X).unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Won {
            winner: Symbol::X,
            line: vec![0, 4, 8]
        }
    );
    assert!(board.is_full());
    assert!(!check_draw(&board));
}

#[test]
fn test_full_board_without_line_is_a_draw() {
    let mut board = Board::parse(GridSize::default(), "XOX XOO OX.").unwrap();
    assert_eq!(play(&mut board, 8, Symbol::X).unwrap(), MoveOutcome::Draw);
    assert!(check_draw(&board));
}

#[test]
fn test_partial_board_is_neither() {
    let board = Board::parse(GridSize::new(4).unwrap(), "XO.. .... .... ....").unwrap();
    assert!(!check_draw(&board));
    assert_eq!(winner(&board), None);
}
