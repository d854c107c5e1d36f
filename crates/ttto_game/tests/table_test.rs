//! Timing and persistence behaviour of the local table.

use std::time::Duration;
use tokio::sync::mpsc;
use ttto_game::{
    Difficulty, GameMode, GridSize, LocalTable, MemoryScoreStore, MoveError, Outcome, ScoreStore,
    Symbol, TableEvent,
};

fn drain(rx: &mut mpsc::UnboundedReceiver<TableEvent>) -> Vec<TableEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_computer_replies_after_delay() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut table = LocalTable::new(
        GameMode::VsComputer(Difficulty::Hard),
        GridSize::default(),
        Box::new(MemoryScoreStore::new()),
        tx,
    )
    .with_seed(7);

    table.human_move(0).unwrap();
    assert_eq!(
        drain(&mut rx),
        vec![
            TableEvent::MoveMade {
                symbol: Symbol::X,
                index: 0
            },
            TableEvent::ComputerThinking,
        ]
    );

    tokio::time::advance(Duration::from_millis(400)).await;
    assert!(drain(&mut rx).is_empty(), "computer moved too early");

    let reply = rx.recv().await.unwrap();
    assert_eq!(
        reply,
        TableEvent::MoveMade {
            symbol: Symbol::O,
            index: 4
        }
    );
    assert_eq!(table.session().current(), Symbol::X);
}

#[tokio::test(start_paused = true)]
async fn test_input_rejected_while_computer_thinks() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut table = LocalTable::new(
        GameMode::VsComputer(Difficulty::Easy),
        GridSize::default(),
        Box::new(MemoryScoreStore::new()),
        tx,
    );

    table.human_move(4).unwrap();
    assert_eq!(table.human_move(0), Err(MoveError::NotYourTurn(Symbol::X)));
    assert_eq!(table.session().board().occupied(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_computer_move() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut table = LocalTable::new(
        GameMode::VsComputer(Difficulty::Medium),
        GridSize::default(),
        Box::new(MemoryScoreStore::new()),
        tx,
    );

    table.human_move(0).unwrap();
    tokio::time::advance(Duration::from_millis(100)).await;
    table.reset();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let events = drain(&mut rx);
    assert!(
        !events.contains(&TableEvent::MoveMade {
            symbol: Symbol::O,
            index: 4
        }) && events.len() == 2,
        "unexpected events after reset: {events:?}"
    );
    assert_eq!(table.session().board().occupied(), 0);
    assert_eq!(table.session().current(), Symbol::X);
}

#[tokio::test(start_paused = true)]
async fn test_grid_change_cancels_pending_computer_move() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut table = LocalTable::new(
        GameMode::VsComputer(Difficulty::Hard),
        GridSize::default(),
        Box::new(MemoryScoreStore::new()),
        tx,
    );

    table.human_move(0).unwrap();
    table.set_grid_size(GridSize::new(5).unwrap());
    tokio::time::sleep(Duration::from_secs(2)).await;

    let session = table.session();
    assert_eq!(session.board().len(), 25);
    assert_eq!(session.board().occupied(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_mode_change_cancels_pending_computer_move() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut table = LocalTable::new(
        GameMode::VsComputer(Difficulty::Hard),
        GridSize::default(),
        Box::new(MemoryScoreStore::new()),
        tx,
    );

    table.human_move(0).unwrap();
    table.set_mode(GameMode::LocalPvp);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let events = drain(&mut rx);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, TableEvent::MoveMade { symbol: Symbol::O, .. })),
        "computer moved after the mode change: {events:?}"
    );
    let session = table.session();
    assert_eq!(session.mode(), GameMode::LocalPvp);
    assert_eq!(session.board().occupied(), 0);
    assert_eq!(session.current(), Symbol::X);
}

#[test]
fn test_delay_is_clamped() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let table = LocalTable::new(
        GameMode::LocalPvp,
        GridSize::default(),
        Box::new(MemoryScoreStore::new()),
        tx,
    );
    assert_eq!(table.computer_delay(), LocalTable::DEFAULT_DELAY);
    let table = table.with_computer_delay(Duration::from_millis(10));
    assert_eq!(table.computer_delay(), LocalTable::MIN_DELAY);
    let table = table.with_computer_delay(Duration::from_secs(5));
    assert_eq!(table.computer_delay(), LocalTable::MAX_DELAY);
}

#[test]
fn test_finished_game_saves_scores() {
    let store = MemoryScoreStore::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut table = LocalTable::new(
        GameMode::LocalPvp,
        GridSize::default(),
        Box::new(store.clone()),
        tx,
    );

    for index in [0, 3, 1, 4, 2] {
        table.human_move(index).unwrap();
    }

    assert_eq!(table.scores().pvp.x, 1);
    assert_eq!(store.load().pvp.x, 1);
    let events = drain(&mut rx);
    assert!(events.contains(&TableEvent::GameOver {
        outcome: Outcome::Winner(Symbol::X),
        line: Some(vec![0, 1, 2]),
    }));

    // A new table over the same store starts from the saved counters.
    let (tx, _rx) = mpsc::unbounded_channel();
    let reopened = LocalTable::new(GameMode::LocalPvp, GridSize::default(), Box::new(store), tx);
    assert_eq!(reopened.scores().pvp.x, 1);
}
