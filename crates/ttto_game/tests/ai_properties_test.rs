//! Properties of the hard computer opponent across board sizes.

use rand::SeedableRng;
use rand::rngs::StdRng;
use ttto_game::{Board, Difficulty, GridSize, Symbol, lines, select_move};

/// Board with `symbol` on every square of `line` except `gap`.
fn threat(size: GridSize, line: &[usize], gap: usize, symbol: Symbol) -> Board {
    let mut board = Board::new(size);
    for &index in line.iter().filter(|&&i| i != gap) {
        board.apply_move(index, symbol).unwrap();
    }
    board
}

#[test]
fn test_hard_completes_every_open_line() {
    let mut rng = StdRng::seed_from_u64(11);
    for n in GridSize::MIN..=GridSize::MAX {
        let size = GridSize::new(n).unwrap();
        for line in lines(n) {
            for &gap in &line {
                let board = threat(size, &line, gap, Symbol::O);
                let chosen = select_move(&board, Difficulty::Hard, Symbol::O, &[], &mut rng).unwrap();
                assert_eq!(chosen, gap, "size {n}, line {line:?}");
            }
        }
    }
}

#[test]
fn test_hard_blocks_every_open_line() {
    let mut rng = StdRng::seed_from_u64(12);
    for n in GridSize::MIN..=GridSize::MAX {
        let size = GridSize::new(n).unwrap();
        for line in lines(n) {
            for &gap in &line {
                let board = threat(size, &line, gap, Symbol::X);
                let chosen = select_move(&board, Difficulty::Hard, Symbol::O, &[], &mut rng).unwrap();
                assert_eq!(chosen, gap, "size {n}, line {line:?}");
            }
        }
    }
}

#[test]
fn test_hard_prefers_winning_over_blocking() {
    let mut rng = StdRng::seed_from_u64(13);
    // X threatens 2, O threatens 5.
    let board = Board::parse(GridSize::default(), "XX. OO. X..").unwrap();
    assert_eq!(
        select_move(&board, Difficulty::Hard, Symbol::O, &[0, 3, 1, 4, 6], &mut rng),
        Ok(5)
    );
}

#[test]
fn test_blocks_top_row_threat() {
    let mut rng = StdRng::seed_from_u64(14);
    let board = Board::parse(GridSize::default(), "XX. ... ...").unwrap();
    assert_eq!(
        select_move(&board, Difficulty::Hard, Symbol::O, &[0, 1], &mut rng),
        Ok(2)
    );
}

#[test]
fn test_medium_and_easy_stay_on_empty_squares() {
    let board = Board::parse(GridSize::new(4).unwrap(), "XOXO OXOX .... ....").unwrap();
    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        for difficulty in [Difficulty::Easy, Difficulty::Medium] {
            let chosen = select_move(&board, difficulty, Symbol::O, &[], &mut rng).unwrap();
            assert!(board.is_vacant(chosen), "{difficulty} picked {chosen}");
        }
    }
}
