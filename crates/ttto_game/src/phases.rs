//! Session phases and game outcomes.

use crate::types::Symbol;
use serde::{Deserialize, Serialize};

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A symbol completed a line.
    Winner(Symbol),
    /// The board filled with no line completed.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Symbol> {
        match self {
            Outcome::Winner(symbol) => Some(*symbol),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(symbol) => write!(f, "Player {} wins", symbol),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Lifecycle of a local game.
///
/// `Idle` until the first move, `InProgress` while moves alternate, and
/// `Finished` once a win or draw is detected. Only `reset` leaves `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Board empty, nobody has moved.
    #[default]
    Idle,
    /// At least one move played, no result yet.
    InProgress,
    /// Win or draw detected; further moves are rejected.
    Finished(Outcome),
}

impl Phase {
    /// True while moves are accepted.
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Finished(_))
    }

    /// The outcome, once finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Phase::Finished(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

/// Result of applying a single move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game continues with `next` to move.
    Continue {
        /// Symbol to move next.
        next: Symbol,
    },
    /// The move completed a line.
    Won {
        /// The winning symbol.
        winner: Symbol,
        /// Indices of the completed line, for highlighting.
        line: Vec<usize>,
    },
    /// The move filled the board without a line.
    Draw,
}

impl MoveOutcome {
    /// Outcome of the game if this move ended it.
    pub fn finished(&self) -> Option<Outcome> {
        match self {
            MoveOutcome::Continue { .. } => None,
            MoveOutcome::Won { winner, .. } => Some(Outcome::Winner(*winner)),
            MoveOutcome::Draw => Some(Outcome::Draw),
        }
    }
}
