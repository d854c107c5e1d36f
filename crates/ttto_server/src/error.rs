//! Error types for the relay server.

use derive_more::{Display, Error, From};
use ttto_game::{MoveError, RoomCode, Symbol};
use tracing::instrument;

/// Reasons the registry refuses a request.
///
/// Every check runs before the room is touched, so a refused request leaves
/// the registry exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum RegistryError {
    /// No live room has this code.
    #[display("Room {_0} not found")]
    RoomNotFound(RoomCode),

    /// Both seats are taken.
    #[display("Room {_0} is full")]
    RoomFull(RoomCode),

    /// The participant already sits in this room.
    #[display("Already in room {_0}")]
    AlreadyInRoom(RoomCode),

    /// The participant does not sit in this room.
    #[display("Not a member of room {_0}")]
    NotAMember(RoomCode),

    /// The claimed symbol is not the one to move.
    #[display("It's {expected}'s turn, not {claimed}'s")]
    TurnViolation {
        /// Symbol whose turn it is.
        expected: Symbol,
        /// Symbol the request claimed.
        claimed: Symbol,
    },

    /// The participant claimed a symbol it was not assigned.
    #[display("Cannot move as {_0}")]
    SymbolSpoofing(Symbol),

    /// The square cannot be played.
    #[display("{_0}")]
    #[from]
    IllegalMove(MoveError),

    /// The room is waiting for an opponent or its game is over.
    #[display("Room {_0} has no game in progress")]
    NotInProgress(RoomCode),

    /// The live room limit is reached.
    #[display("Room limit of {_0} reached")]
    TooManyRooms(usize),
}

impl std::error::Error for RegistryError {}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
