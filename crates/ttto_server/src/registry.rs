//! Authoritative room table for networked games.
//!
//! The registry owns every live [`Room`] and validates each request against
//! it. Operations never send anything themselves: they return the messages to
//! deliver as [`Outbound`] values and leave routing to the caller.

use crate::error::RegistryError;
use derive_getters::Getters;
use derive_more::Display;
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use ttto_game::{
    Board, GridSize, MoveError, MoveOutcome, Outcome, RoomCode, ServerMessage, Symbol, play,
};

/// Connection-scoped participant handle.
///
/// Only used for routing and membership checks; a room never owns its
/// participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("p{_0}")]
pub struct ParticipantId(pub u64);

/// A message addressed to one participant.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Outbound {
    /// Recipient.
    pub to: ParticipantId,
    /// Message to deliver.
    pub message: ServerMessage,
}

/// Lifecycle of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RoomState {
    /// Created, one seat free.
    #[display("waiting_for_opponent")]
    WaitingForOpponent,
    /// Both seats taken, moves accepted.
    #[display("in_progress")]
    InProgress,
    /// Someone won or the board filled; a restart or grid change reopens it.
    #[display("finished")]
    Finished(Outcome),
    /// A participant left; the room is gone from the registry.
    #[display("abandoned")]
    Abandoned,
}

/// One networked game.
#[derive(Debug, Clone, Getters)]
pub struct Room {
    /// Code clients use to address the room.
    code: RoomCode,
    /// Seated participants with their symbols, creator first.
    seats: Vec<(ParticipantId, Symbol)>,
    /// Authoritative board.
    board: Board,
    /// Symbol to move.
    turn: Symbol,
    /// Lifecycle state.
    state: RoomState,
}

impl Room {
    /// Seats available in every room.
    pub const CAPACITY: usize = 2;

    fn new(code: RoomCode, creator: ParticipantId, size: GridSize) -> Self {
        Self {
            code,
            seats: vec![(creator, Symbol::X)],
            board: Board::new(size),
            turn: Symbol::X,
            state: RoomState::WaitingForOpponent,
        }
    }

    /// Side length of the board.
    pub fn grid_size(&self) -> GridSize {
        self.board.size()
    }

    /// Symbol assigned to `participant`, if seated here.
    pub fn symbol_of(&self, participant: ParticipantId) -> Option<Symbol> {
        self.seats
            .iter()
            .find(|(id, _)| *id == participant)
            .map(|(_, symbol)| *symbol)
    }

    /// True when `participant` sits in this room.
    pub fn is_member(&self, participant: ParticipantId) -> bool {
        self.symbol_of(participant).is_some()
    }

    /// True when both seats are taken.
    pub fn is_full(&self) -> bool {
        self.seats.len() >= Self::CAPACITY
    }

    /// Listing entry for this room.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_code: self.code.clone(),
            grid_size: self.grid_size(),
            players: self.seats.len(),
            state: self.state.to_string(),
        }
    }

    fn broadcast(&self, message: &ServerMessage) -> Vec<Outbound> {
        self.seats
            .iter()
            .map(|(id, _)| Outbound::new(*id, message.clone()))
            .collect()
    }

    /// `game_start` for each seat, carrying that seat's symbol.
    fn start_messages(&self) -> Vec<Outbound> {
        self.seats
            .iter()
            .map(|(id, symbol)| {
                Outbound::new(
                    *id,
                    ServerMessage::GameStart {
                        room_code: self.code.clone(),
                        grid_size: self.grid_size(),
                        symbol: *symbol,
                    },
                )
            })
            .collect()
    }

    /// Fresh board at `size`, X to move; a finished game reopens.
    fn reset_board(&mut self, size: GridSize) {
        self.board = Board::new(size);
        self.turn = Symbol::X;
        if let RoomState::Finished(_) = self.state {
            self.state = RoomState::InProgress;
        }
    }
}

/// Public view of a room for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    /// Room code.
    room_code: RoomCode,
    /// Board side length.
    grid_size: GridSize,
    /// Seated participants.
    players: usize,
    /// Lifecycle state name.
    state: String,
}

/// In-memory table of live rooms keyed by code.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    seated: HashMap<ParticipantId, RoomCode>,
    max_rooms: usize,
    rng: StdRng,
}

impl RoomRegistry {
    /// Creates an empty registry holding at most `max_rooms` rooms.
    ///
    /// The limit never exceeds [`RoomCode::COMBINATIONS`], so a fresh code
    /// always exists while room creation is allowed.
    #[instrument]
    pub fn new(max_rooms: usize) -> Self {
        if max_rooms > RoomCode::COMBINATIONS {
            warn!(
                max_rooms,
                clamped = RoomCode::COMBINATIONS,
                "Room limit exceeds available codes"
            );
        }
        Self {
            rooms: HashMap::new(),
            seated: HashMap::new(),
            max_rooms: max_rooms.min(RoomCode::COMBINATIONS),
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeds room code generation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Cap on simultaneously live rooms.
    pub fn max_rooms(&self) -> usize {
        self.max_rooms
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True when no room is live.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Looks up a room.
    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Code of the room `participant` sits in.
    pub fn room_of(&self, participant: ParticipantId) -> Option<&RoomCode> {
        self.seated.get(&participant)
    }

    /// Summaries of every live room, ordered by code.
    pub fn rooms(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<_> = self.rooms.values().map(Room::summary).collect();
        summaries.sort_by(|a, b| a.room_code.cmp(&b.room_code));
        summaries
    }

    /// Opens a room with `creator` seated as X.
    ///
    /// A creator already seated elsewhere leaves that room first, and its
    /// opponent is told.
    ///
    /// # Errors
    ///
    /// [`RegistryError::TooManyRooms`] when the limit is reached.
    #[instrument(skip(self), fields(creator = %creator, size = %size))]
    pub fn create_room(
        &mut self,
        creator: ParticipantId,
        size: GridSize,
    ) -> Result<(RoomCode, Vec<Outbound>), RegistryError> {
        let freed = usize::from(self.seated.contains_key(&creator));
        if self.rooms.len() - freed >= self.max_rooms {
            warn!(max_rooms = self.max_rooms, "Room limit reached");
            return Err(RegistryError::TooManyRooms(self.max_rooms));
        }

        let mut outbound = self
            .leave(creator)
            .map(|(_, messages)| messages)
            .unwrap_or_default();

        let code = self.unused_code();
        self.rooms
            .insert(code.clone(), Room::new(code.clone(), creator, size));
        self.seated.insert(creator, code.clone());
        outbound.push(Outbound::new(
            creator,
            ServerMessage::RoomCreated {
                room_code: code.clone(),
                grid_size: size,
            },
        ));

        info!(room_code = %code, rooms = self.rooms.len(), "Room created");
        Ok((code, outbound))
    }

    /// Seats `participant` as O and starts the game.
    ///
    /// Returns a snapshot of the started room and a `game_start` for both
    /// seats. A joiner seated in some other room leaves it first.
    ///
    /// # Errors
    ///
    /// [`RegistryError::RoomNotFound`], [`RegistryError::AlreadyInRoom`] when
    /// the participant already sits here, or [`RegistryError::RoomFull`].
    #[instrument(skip(self), fields(room_code = %code, participant = %participant))]
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        participant: ParticipantId,
    ) -> Result<(Room, Vec<Outbound>), RegistryError> {
        let room = self
            .rooms
            .get(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;
        if room.is_member(participant) {
            return Err(RegistryError::AlreadyInRoom(code.clone()));
        }
        if room.is_full() {
            return Err(RegistryError::RoomFull(code.clone()));
        }

        let mut outbound = self
            .leave(participant)
            .map(|(_, messages)| messages)
            .unwrap_or_default();

        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;
        room.seats.push((participant, Symbol::O));
        room.state = RoomState::InProgress;
        outbound.extend(room.start_messages());
        let snapshot = room.clone();
        self.seated.insert(participant, code.clone());

        info!(grid_size = %snapshot.grid_size(), "Opponent joined, game started");
        Ok((snapshot, outbound))
    }

    /// Validates and applies a move, echoing it to both seats.
    ///
    /// Checks run in this order: room exists, claimed symbol's turn, index in
    /// range, square empty, claimed symbol is the participant's own, game in
    /// progress.
    ///
    /// # Errors
    ///
    /// The first failed check; nothing is applied or sent.
    #[instrument(skip(self), fields(room_code = %code, participant = %participant))]
    pub fn make_move(
        &mut self,
        code: &RoomCode,
        index: usize,
        claimed: Symbol,
        participant: ParticipantId,
    ) -> Result<Vec<Outbound>, RegistryError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;

        if room.turn != claimed {
            return Err(RegistryError::TurnViolation {
                expected: room.turn,
                claimed,
            });
        }
        if index >= room.board.len() {
            return Err(MoveError::OutOfRange {
                index,
                cells: room.board.len(),
            }
            .into());
        }
        if !room.board.is_vacant(index) {
            return Err(MoveError::SquareOccupied(index).into());
        }
        if room.symbol_of(participant) != Some(claimed) {
            return Err(RegistryError::SymbolSpoofing(claimed));
        }
        if room.state != RoomState::InProgress {
            return Err(RegistryError::NotInProgress(code.clone()));
        }

        let outcome = play(&mut room.board, index, claimed)?;
        room.turn = claimed.opponent();
        match outcome {
            MoveOutcome::Continue { .. } => {
                debug!(index, symbol = %claimed, "Move applied");
            }
            MoveOutcome::Won { winner, .. } => {
                room.state = RoomState::Finished(Outcome::Winner(winner));
                info!(index, %winner, "Game won");
            }
            MoveOutcome::Draw => {
                room.state = RoomState::Finished(Outcome::Draw);
                info!(index, "Game drawn");
            }
        }

        Ok(room.broadcast(&ServerMessage::MoveMade {
            index,
            symbol: claimed,
            next_turn: room.turn,
        }))
    }

    /// Restarts the room at a new board size.
    ///
    /// Seated players get `game_start` at the new size. A room still waiting
    /// for its opponent sends the creator `room_created` instead.
    ///
    /// # Errors
    ///
    /// [`RegistryError::RoomNotFound`] or [`RegistryError::NotAMember`].
    #[instrument(skip(self), fields(room_code = %code, participant = %participant, size = %size))]
    pub fn request_grid_change(
        &mut self,
        code: &RoomCode,
        participant: ParticipantId,
        size: GridSize,
    ) -> Result<Vec<Outbound>, RegistryError> {
        let room = self.member_room(code, participant)?;
        room.reset_board(size);
        info!(state = %room.state, "Grid size changed");

        if room.state == RoomState::WaitingForOpponent {
            return Ok(room.broadcast(&ServerMessage::RoomCreated {
                room_code: code.clone(),
                grid_size: size,
            }));
        }
        Ok(room.start_messages())
    }

    /// Clears the board at its current size.
    ///
    /// # Errors
    ///
    /// [`RegistryError::RoomNotFound`] or [`RegistryError::NotAMember`].
    #[instrument(skip(self), fields(room_code = %code, participant = %participant))]
    pub fn restart(
        &mut self,
        code: &RoomCode,
        participant: ParticipantId,
    ) -> Result<Vec<Outbound>, RegistryError> {
        let room = self.member_room(code, participant)?;
        room.reset_board(room.grid_size());
        info!("Room restarted");
        Ok(room.broadcast(&ServerMessage::GameRestarted))
    }

    /// Leaves the named room, tearing it down.
    ///
    /// # Errors
    ///
    /// [`RegistryError::RoomNotFound`] or [`RegistryError::NotAMember`].
    #[instrument(skip(self), fields(room_code = %code, participant = %participant))]
    pub fn leave_room(
        &mut self,
        code: &RoomCode,
        participant: ParticipantId,
    ) -> Result<Vec<Outbound>, RegistryError> {
        self.member_room(code, participant)?;
        Ok(self
            .leave(participant)
            .map(|(_, messages)| messages)
            .unwrap_or_default())
    }

    /// Removes whatever room `participant` sits in.
    ///
    /// The other seat gets `opponent_left`. Returns the removed room, marked
    /// abandoned, or `None` when the participant was not seated.
    #[instrument(skip(self), fields(participant = %participant))]
    pub fn leave(&mut self, participant: ParticipantId) -> Option<(Room, Vec<Outbound>)> {
        let code = self.seated.remove(&participant)?;
        let mut room = self.rooms.remove(&code)?;
        room.state = RoomState::Abandoned;

        let outbound: Vec<_> = room
            .seats
            .iter()
            .filter(|(id, _)| *id != participant)
            .map(|(id, _)| {
                self.seated.remove(id);
                Outbound::new(*id, ServerMessage::OpponentLeft)
            })
            .collect();

        info!(room_code = %code, rooms = self.rooms.len(), "Room torn down");
        Some((room, outbound))
    }

    fn member_room(
        &mut self,
        code: &RoomCode,
        participant: ParticipantId,
    ) -> Result<&mut Room, RegistryError> {
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RegistryError::RoomNotFound(code.clone()))?;
        if !room.is_member(participant) {
            return Err(RegistryError::NotAMember(code.clone()));
        }
        Ok(room)
    }

    fn unused_code(&mut self) -> RoomCode {
        loop {
            let code = RoomCode::generate(&mut self.rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
            debug!(room_code = %code, "Room code collision, regenerating");
        }
    }
}
