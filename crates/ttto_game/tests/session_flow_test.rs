//! Whole-game properties of the session state machine.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use ttto_game::{
    GameMode, GameSession, GridSize, MoveError, MoveOutcome, Outcome, Phase, Symbol, check_draw,
    check_win,
};

#[test]
fn test_random_games_end_in_exactly_one_state() {
    for n in GridSize::MIN..=GridSize::MAX {
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut session = GameSession::new(GameMode::LocalPvp, GridSize::new(n).unwrap());

            while session.phase().is_active() {
                let mover = session.current();
                let index = *session.board().empty_cells().choose(&mut rng).unwrap();
                let outcome = session.play(index).unwrap();

                let won = check_win(session.board(), mover);
                let drawn = check_draw(session.board());
                assert!(!(won && drawn));
                match outcome {
                    MoveOutcome::Won { winner, .. } => {
                        assert!(won);
                        assert_eq!(winner, mover);
                        assert_eq!(session.phase(), Phase::Finished(Outcome::Winner(mover)));
                    }
                    MoveOutcome::Draw => {
                        assert!(drawn);
                        assert_eq!(session.phase(), Phase::Finished(Outcome::Draw));
                    }
                    MoveOutcome::Continue { next } => {
                        assert!(!won && !drawn);
                        assert_eq!(next, mover.opponent());
                        assert_eq!(session.phase(), Phase::InProgress);
                    }
                }
            }

            assert_eq!(session.play(0), Err(MoveError::GameOver));
        }
    }
}

#[test]
fn test_winning_move_on_last_square_is_a_win() {
    let mut session = GameSession::new(GameMode::LocalPvp, GridSize::default());
    // Final board: O X X / X O X / O O X, with column 2 completed last.
    for index in [1, 0, 2, 4, 3, 6, 5, 7] {
        session.play(index).unwrap();
    }
    assert_eq!(session.current(), Symbol::X);
    let outcome = session.play(8).unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Won {
            winner: Symbol::X,
            line: vec![2, 5, 8]
        }
    );
    assert!(session.board().is_full());
}

#[test]
fn test_mode_change_forces_reset() {
    let mut session = GameSession::new(GameMode::LocalPvp, GridSize::default());
    session.play(4).unwrap();
    session.set_mode(GameMode::VsComputer(ttto_game::Difficulty::Easy));
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.board().occupied(), 0);
}
