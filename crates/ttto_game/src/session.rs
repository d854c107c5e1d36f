//! Client-side game session state machine.
//!
//! A [`GameSession`] is the source of truth for local and vs-computer games.
//! For networked games it is a mirror: moves are proposed to the relay and the
//! board only changes when the server echoes them back.

use crate::action::MoveError;
use crate::ai::{self, Difficulty};
use crate::phases::{MoveOutcome, Outcome, Phase};
use crate::protocol::{ClientMessage, RoomCode, ServerMessage};
use crate::rules;
use crate::types::{Board, GridSize, Symbol};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// How the two sides of a session are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Two humans sharing one board.
    #[default]
    LocalPvp,
    /// Human as X against the computer as O.
    VsComputer(Difficulty),
    /// Two clients connected through the relay server.
    Networked,
}

impl GameMode {
    /// Symbol the human plays against the computer.
    pub const HUMAN: Symbol = Symbol::X;
    /// Symbol the computer plays.
    pub const COMPUTER: Symbol = Symbol::O;
}

/// This client's place in a networked room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seat {
    /// Room joined or created, once the server confirms it.
    pub room_code: Option<RoomCode>,
    /// Symbol assigned by the server.
    pub symbol: Option<Symbol>,
    /// True between `game_start` and the room ending.
    pub opponent_present: bool,
}

/// What a server message changed in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteUpdate {
    /// Our room exists; waiting for an opponent.
    Waiting(RoomCode),
    /// A game started at the given size with us playing `symbol`.
    Started {
        /// Our symbol.
        symbol: Symbol,
        /// Board size for this game.
        grid_size: GridSize,
    },
    /// A move was applied.
    Moved {
        /// Square played.
        index: usize,
        /// Effect of the move.
        outcome: MoveOutcome,
    },
    /// The board was cleared.
    Restarted,
    /// The room is gone; back to the lobby.
    OpponentLeft,
    /// The server refused something.
    Rejected(String),
}

/// A single player's view of a game.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current: Symbol,
    grid_size: GridSize,
    phase: Phase,
    mode: GameMode,
    history: Vec<usize>,
    winning_line: Option<Vec<usize>>,
    seat: Seat,
    epoch: u64,
}

impl GameSession {
    /// Creates an idle session.
    #[instrument]
    pub fn new(mode: GameMode, grid_size: GridSize) -> Self {
        info!(?mode, %grid_size, "Creating game session");
        Self {
            board: Board::new(grid_size),
            current: Symbol::X,
            grid_size,
            phase: Phase::Idle,
            mode,
            history: Vec::new(),
            winning_line: None,
            seat: Seat::default(),
            epoch: 0,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the symbol to move.
    pub fn current(&self) -> Symbol {
        self.current
    }

    /// Returns the configured grid size.
    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    /// Returns the phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Returns the indices played so far, oldest first.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Returns the completed line once someone has won.
    pub fn winning_line(&self) -> Option<&[usize]> {
        self.winning_line.as_deref()
    }

    /// Returns the networked seat.
    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    /// Counter bumped by every reset.
    ///
    /// A deferred action scheduled at one epoch must not touch the session at
    /// another: the board it saw has been discarded.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Discards the board and returns to `Idle` at the configured size.
    #[instrument(skip(self), fields(grid_size = %self.grid_size, epoch = self.epoch))]
    pub fn reset(&mut self) {
        self.board = Board::new(self.grid_size);
        self.current = Symbol::X;
        self.phase = Phase::Idle;
        self.history.clear();
        self.winning_line = None;
        self.epoch += 1;
        debug!("Session reset");
    }

    /// Changes the grid size, forcing a reset.
    #[instrument(skip(self))]
    pub fn set_grid_size(&mut self, grid_size: GridSize) {
        self.grid_size = grid_size;
        self.reset();
    }

    /// Changes the mode, forcing a reset and leaving any room seat.
    #[instrument(skip(self))]
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.seat = Seat::default();
        self.reset();
    }

    /// Plays the current symbol at `index` in a local game.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`] once finished, [`MoveError::NotYourTurn`] when
    /// it is the computer's move, [`MoveError::Networked`] in networked mode,
    /// or the board's own range and occupancy errors.
    #[instrument(skip(self), fields(mode = ?self.mode, current = %self.current))]
    pub fn play(&mut self, index: usize) -> Result<MoveOutcome, MoveError> {
        match self.mode {
            GameMode::Networked => return Err(MoveError::Networked),
            GameMode::VsComputer(_) if self.current == GameMode::COMPUTER => {
                return Err(MoveError::NotYourTurn(GameMode::HUMAN));
            }
            _ => {}
        }
        self.apply(index, self.current)
    }

    /// True when the computer owes a move.
    pub fn computer_to_move(&self) -> bool {
        matches!(self.mode, GameMode::VsComputer(_))
            && self.phase.is_active()
            && self.current == GameMode::COMPUTER
    }

    /// Lets the computer play, if it is its turn.
    #[instrument(skip(self, rng), fields(epoch = self.epoch))]
    pub fn play_computer<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, MoveOutcome)> {
        let GameMode::VsComputer(difficulty) = self.mode else {
            return None;
        };
        if !self.computer_to_move() {
            return None;
        }

        let index = match ai::select_move(
            &self.board,
            difficulty,
            GameMode::COMPUTER,
            &self.history,
            rng,
        ) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "Computer could not move");
                return None;
            }
        };

        match self.apply(index, GameMode::COMPUTER) {
            Ok(outcome) => Some((index, outcome)),
            Err(e) => {
                warn!(index, error = %e, "Computer chose an illegal square");
                None
            }
        }
    }

    /// Checks a networked move locally and builds the request for the server.
    ///
    /// The board is not touched; it changes when `move_made` arrives.
    ///
    /// # Errors
    ///
    /// [`MoveError::NotSeated`] outside a running room,
    /// [`MoveError::NotYourTurn`] on the opponent's turn, and the usual
    /// occupancy, range and game-over errors.
    #[instrument(skip(self), fields(current = %self.current))]
    pub fn propose_move(&self, index: usize) -> Result<ClientMessage, MoveError> {
        if self.mode != GameMode::Networked {
            return Err(MoveError::NotSeated);
        }
        let (Some(room_code), Some(symbol)) = (&self.seat.room_code, self.seat.symbol) else {
            return Err(MoveError::NotSeated);
        };
        if !self.seat.opponent_present {
            return Err(MoveError::NotSeated);
        }
        if !self.phase.is_active() {
            return Err(MoveError::GameOver);
        }
        if self.current != symbol {
            return Err(MoveError::NotYourTurn(symbol));
        }
        if index >= self.board.len() {
            return Err(MoveError::OutOfRange {
                index,
                cells: self.board.len(),
            });
        }
        if !self.board.is_vacant(index) {
            return Err(MoveError::SquareOccupied(index));
        }

        Ok(ClientMessage::MakeMove {
            room_code: room_code.clone(),
            index,
            symbol,
        })
    }

    /// Applies an authoritative message from the relay server.
    ///
    /// # Errors
    ///
    /// A `move_made` that does not fit the local board means the mirror has
    /// drifted; the error is returned and the board left as it was.
    #[instrument(skip(self, message), fields(epoch = self.epoch))]
    pub fn apply_server_message(&mut self, message: &ServerMessage) -> Result<RemoteUpdate, MoveError> {
        match message {
            ServerMessage::RoomCreated {
                room_code,
                grid_size,
            } => {
                info!(room_code = %room_code, "Room created, waiting for opponent");
                self.seat = Seat {
                    room_code: Some(room_code.clone()),
                    symbol: Some(Symbol::X),
                    opponent_present: false,
                };
                self.set_grid_size(*grid_size);
                Ok(RemoteUpdate::Waiting(room_code.clone()))
            }
            ServerMessage::GameStart {
                room_code,
                grid_size,
                symbol,
            } => {
                info!(room_code = %room_code, %grid_size, %symbol, "Game started");
                self.seat = Seat {
                    room_code: Some(room_code.clone()),
                    symbol: Some(*symbol),
                    opponent_present: true,
                };
                self.set_grid_size(*grid_size);
                Ok(RemoteUpdate::Started {
                    symbol: *symbol,
                    grid_size: *grid_size,
                })
            }
            ServerMessage::MoveMade {
                index,
                symbol,
                next_turn,
            } => {
                let outcome = self.apply(*index, *symbol)?;
                if self.phase.is_active() {
                    self.current = *next_turn;
                }
                Ok(RemoteUpdate::Moved {
                    index: *index,
                    outcome,
                })
            }
            ServerMessage::GameRestarted => {
                self.reset();
                Ok(RemoteUpdate::Restarted)
            }
            ServerMessage::OpponentLeft => {
                info!("Opponent left, returning to lobby");
                self.seat = Seat::default();
                self.reset();
                Ok(RemoteUpdate::OpponentLeft)
            }
            ServerMessage::ErrorMessage { message } => {
                warn!(%message, "Server rejected request");
                Ok(RemoteUpdate::Rejected(message.clone()))
            }
        }
    }

    /// Applies a move for `symbol` and advances the phase.
    fn apply(&mut self, index: usize, symbol: Symbol) -> Result<MoveOutcome, MoveError> {
        if !self.phase.is_active() {
            return Err(MoveError::GameOver);
        }

        let outcome = rules::play(&mut self.board, index, symbol)?;
        self.history.push(index);

        match &outcome {
            MoveOutcome::Continue { next } => {
                self.phase = Phase::InProgress;
                self.current = *next;
            }
            MoveOutcome::Won { winner, line } => {
                info!(winner = %winner, moves = self.history.len(), "Game won");
                self.winning_line = Some(line.clone());
                self.phase = Phase::Finished(Outcome::Winner(*winner));
            }
            MoveOutcome::Draw => {
                info!(moves = self.history.len(), "Game drawn");
                self.phase = Phase::Finished(Outcome::Draw);
            }
        }

        Ok(outcome)
    }
}
