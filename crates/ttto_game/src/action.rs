//! Move errors shared by local sessions and the relay server.

use crate::types::Symbol;

/// Error that can occur when validating or applying a move.
///
/// Every variant is raised before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The index is past the last square.
    #[display("Index {index} is outside the {cells}-square board")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of squares on the board.
        cells: usize,
    },

    /// The square at the index is already occupied.
    #[display("Square {_0} is already occupied")]
    SquareOccupied(usize),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// It's not this symbol's turn.
    #[display("It's not {_0}'s turn")]
    NotYourTurn(Symbol),

    /// No running networked game to move in.
    #[display("Not seated in a running room")]
    NotSeated,

    /// Networked moves are proposed to the server, never applied directly.
    #[display("Networked moves must go through the relay")]
    Networked,
}

impl std::error::Error for MoveError {}
