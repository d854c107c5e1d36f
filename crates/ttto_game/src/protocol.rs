//! Relay protocol between clients and the room server.
//!
//! Frames are JSON objects tagged by `"type"` with camelCase fields, e.g.
//! `{"type":"make_move","roomCode":"K3ZQ","index":4,"symbol":"X"}`. Parsing
//! validates every field, so a [`ClientMessage`] that exists is well-formed.

use crate::types::{GridSize, Symbol};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Error for frames that cannot be turned into a valid message.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ProtocolError {
    /// The frame is not valid JSON or does not match any message shape.
    #[display("Malformed message: {_0}")]
    Malformed(String),

    /// A room code of the wrong length or alphabet.
    #[display("Invalid room code {_0:?}")]
    InvalidRoomCode(String),
}

impl std::error::Error for ProtocolError {}

/// Short uppercase alphanumeric room identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Characters in every room code.
    pub const LEN: usize = 4;

    const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Number of distinct codes.
    pub const COMBINATIONS: usize = Self::ALPHABET.len().pow(Self::LEN as u32);

    /// Normalizes and validates a code typed by a user.
    ///
    /// Surrounding whitespace is dropped and letters are upper-cased.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let code = raw.trim().to_ascii_uppercase();
        let valid = code.len() == Self::LEN
            && code.bytes().all(|b| Self::ALPHABET.contains(&b));
        if valid {
            Ok(Self(code))
        } else {
            Err(ProtocolError::InvalidRoomCode(raw.to_string()))
        }
    }

    /// Draws a random code. Uniqueness is the caller's concern.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..Self::LEN)
            .map(|_| char::from(Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(value: RoomCode) -> Self {
        value.0
    }
}

impl std::str::FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Messages sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Open a room and wait for an opponent.
    CreateRoom {
        /// Board side length; 3 when omitted.
        #[serde(default)]
        grid_size: GridSize,
    },
    /// Join a waiting room.
    JoinRoom {
        /// Room to join.
        room_code: RoomCode,
    },
    /// Propose a move.
    MakeMove {
        /// Room the move is for.
        room_code: RoomCode,
        /// Square index, row-major.
        index: usize,
        /// Symbol the sender claims to play.
        symbol: Symbol,
    },
    /// Restart the room at a new board size.
    RequestGridChange {
        /// Room to resize.
        room_code: RoomCode,
        /// New side length.
        new_size: GridSize,
    },
    /// Clear the board and start over at the current size.
    RestartRequest {
        /// Room to restart.
        room_code: RoomCode,
    },
    /// Leave the room, ending it for both participants.
    LeaveRoom {
        /// Room to leave.
        room_code: RoomCode,
    },
}

impl ClientMessage {
    /// Parses and validates a JSON frame.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Encodes the message as a JSON frame.
    pub fn to_json(&self) -> String {
        // Every field serializes infallibly to a string, number or enum tag.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Protocol name of the message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::CreateRoom { .. } => "create_room",
            ClientMessage::JoinRoom { .. } => "join_room",
            ClientMessage::MakeMove { .. } => "make_move",
            ClientMessage::RequestGridChange { .. } => "request_grid_change",
            ClientMessage::RestartRequest { .. } => "restart_request",
            ClientMessage::LeaveRoom { .. } => "leave_room",
        }
    }
}

/// Messages sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// The sender's room exists and waits for an opponent.
    RoomCreated {
        /// Code to share with the opponent.
        room_code: RoomCode,
        /// Board side length.
        grid_size: GridSize,
    },
    /// A game begins (or begins again at a new size).
    GameStart {
        /// Room the game runs in.
        room_code: RoomCode,
        /// Board side length.
        grid_size: GridSize,
        /// Symbol assigned to the recipient.
        symbol: Symbol,
    },
    /// The server accepted a move.
    MoveMade {
        /// Square index.
        index: usize,
        /// Symbol placed.
        symbol: Symbol,
        /// Symbol to move next.
        next_turn: Symbol,
    },
    /// The board was cleared; X moves first.
    GameRestarted,
    /// The other participant left; the room is gone.
    OpponentLeft,
    /// A request was refused.
    ErrorMessage {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerMessage {
    /// Builds an error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::ErrorMessage {
            message: message.into(),
        }
    }

    /// Parses a JSON frame from the server.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Encodes the message as a JSON frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
