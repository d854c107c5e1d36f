//! Grid tic-tac-toe game logic.
//!
//! Everything a client needs to play locally or mirror a networked game, and
//! everything the relay server needs to referee one.
//!
//! # Architecture
//!
//! - **Board**: N×N board (3 to 5) with full-line win and draw detection
//! - **AI**: easy / medium / hard computer opponent
//! - **Session**: per-player state machine (idle, in progress, finished)
//! - **Table**: async driver that delays the computer's reply and keeps score
//! - **Protocol**: relay messages exchanged with the room server
//!
//! # Example
//!
//! ```
//! use ttto_game::{GameMode, GameSession, GridSize, MoveOutcome, Symbol};
//!
//! let mut session = GameSession::new(GameMode::LocalPvp, GridSize::default());
//! for index in [0, 3, 1, 4] {
//!     session.play(index)?;
//! }
//! let outcome = session.play(2)?;
//! assert_eq!(outcome, MoveOutcome::Won { winner: Symbol::X, line: vec![0, 1, 2] });
//! # Ok::<(), ttto_game::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod ai;
mod phases;
mod protocol;
mod rules;
mod scores;
mod session;
mod table;
mod types;

pub use action::MoveError;
pub use ai::{AiError, Difficulty, select_move};
pub use phases::{MoveOutcome, Outcome, Phase};
pub use protocol::{ClientMessage, ProtocolError, RoomCode, ServerMessage};
pub use rules::{check_draw, check_win, lines, play, winner, winning_line};
pub use scores::{
    DifficultyTallies, JsonFileScoreStore, MemoryScoreStore, OnlineTally, ScoreBoard, ScoreStore,
    ScoreStoreError, Tally,
};
pub use session::{GameMode, GameSession, RemoteUpdate, Seat};
pub use table::{LocalTable, TableEvent};
pub use types::{Board, GridSize, InvalidGridSize, ParseBoardError, Square, Symbol};
