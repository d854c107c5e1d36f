//! Win/loss/tie counters and their storage port.
//!
//! Local and vs-computer tallies persist across runs. The online tally lives
//! only as long as the process: opponents are not stable across reconnects,
//! so it is never written and always starts at zero.

use crate::ai::Difficulty;
use crate::phases::Outcome;
use crate::session::GameMode;
use crate::types::Symbol;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

/// X wins, O wins and ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tally {
    /// Games won by X.
    pub x: u32,
    /// Games won by O.
    pub o: u32,
    /// Drawn games.
    pub ties: u32,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Winner(Symbol::X) => self.x += 1,
            Outcome::Winner(Symbol::O) => self.o += 1,
            Outcome::Draw => self.ties += 1,
        }
    }
}

/// Vs-computer tallies, one per difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTallies {
    /// Easy games.
    pub easy: Tally,
    /// Medium games.
    pub medium: Tally,
    /// Hard games.
    pub hard: Tally,
}

impl DifficultyTallies {
    /// Tally for one difficulty.
    pub fn get(&self, difficulty: Difficulty) -> &Tally {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    fn get_mut(&mut self, difficulty: Difficulty) -> &mut Tally {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Online results from this client's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineTally {
    /// Games this client won.
    pub me: u32,
    /// Games the opponent won.
    pub opp: u32,
    /// Drawn games.
    pub ties: u32,
}

/// All counters shown to the player.
///
/// Keys missing from a saved file load as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBoard {
    /// Local two-player games.
    pub pvp: Tally,
    /// Vs-computer games by difficulty.
    pub pvc: DifficultyTallies,
    /// Networked games; never persisted.
    #[serde(skip)]
    pub online: OnlineTally,
}

impl ScoreBoard {
    /// Counts a finished game.
    ///
    /// `me` is this client's symbol and only matters for networked games; a
    /// networked result without it is ignored.
    #[instrument(skip(self))]
    pub fn record(&mut self, mode: GameMode, outcome: Outcome, me: Option<Symbol>) {
        match mode {
            GameMode::LocalPvp => self.pvp.record(outcome),
            GameMode::VsComputer(difficulty) => self.pvc.get_mut(difficulty).record(outcome),
            GameMode::Networked => {
                let Some(me) = me else {
                    warn!("Networked result without a seat, not counted");
                    return;
                };
                match outcome {
                    Outcome::Winner(winner) if winner == me => self.online.me += 1,
                    Outcome::Winner(_) => self.online.opp += 1,
                    Outcome::Draw => self.online.ties += 1,
                }
            }
        }
        debug!(?outcome, "Score recorded");
    }
}

/// Score storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Score store error: {} at {}:{}", message, file, line)]
pub struct ScoreStoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ScoreStoreError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Port for persisting the score board.
///
/// The core calls `save` when a game ends and `load` at start-up; where the
/// bytes go is up to the implementation.
pub trait ScoreStore: Send {
    /// Loads saved scores, or defaults when nothing usable is stored.
    fn load(&self) -> ScoreBoard;

    /// Saves scores. The online tally is never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the scores cannot be written.
    fn save(&self, scores: &ScoreBoard) -> Result<(), ScoreStoreError>;
}

/// Scores kept as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileScoreStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> ScoreBoard {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(error = %e, "No saved scores, using defaults");
                return ScoreBoard::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(scores) => {
                info!("Scores loaded");
                scores
            }
            Err(e) => {
                warn!(error = %e, "Saved scores unreadable, using defaults");
                ScoreBoard::default()
            }
        }
    }

    #[instrument(skip(self, scores), fields(path = %self.path.display()))]
    fn save(&self, scores: &ScoreBoard) -> Result<(), ScoreStoreError> {
        let json = serde_json::to_string_pretty(scores)
            .map_err(|e| ScoreStoreError::new(format!("Failed to encode scores: {}", e)))?;
        std::fs::write(&self.path, json)
            .map_err(|e| ScoreStoreError::new(format!("Failed to write scores: {}", e)))?;
        debug!("Scores saved");
        Ok(())
    }
}

/// In-memory store for tests. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    saved: Arc<Mutex<Option<String>>>,
}

impl MemoryScoreStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON written by the last save, if any.
    pub fn saved_json(&self) -> Option<String> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> ScoreBoard {
        self.saved_json()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    fn save(&self, scores: &ScoreBoard) -> Result<(), ScoreStoreError> {
        let json = serde_json::to_string(scores)
            .map_err(|e| ScoreStoreError::new(format!("Failed to encode scores: {}", e)))?;
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }
}
