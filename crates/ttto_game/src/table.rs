//! Async driver around a [`GameSession`].
//!
//! The table owns the session, the score board and the score store. It
//! schedules the computer's reply as a delayed task and cancels that task
//! whenever the board is discarded, so a stale move can never land on a fresh
//! board.

use crate::action::MoveError;
use crate::phases::{MoveOutcome, Outcome};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::scores::{ScoreBoard, ScoreStore};
use crate::session::{GameMode, GameSession, RemoteUpdate};
use crate::types::{GridSize, Symbol};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Notifications sent from the table to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// The computer's reply is scheduled.
    ComputerThinking,
    /// A move was applied to the board.
    MoveMade {
        /// Who moved.
        symbol: Symbol,
        /// Square played.
        index: usize,
    },
    /// The game ended.
    GameOver {
        /// Result.
        outcome: Outcome,
        /// Completed line, when someone won.
        line: Option<Vec<usize>>,
    },
    /// Counters changed.
    ScoresChanged(ScoreBoard),
}

struct Shared {
    session: GameSession,
    scores: ScoreBoard,
    store: Box<dyn ScoreStore>,
    rng: StdRng,
}

/// A running game plus everything needed to drive it.
pub struct LocalTable {
    shared: Arc<Mutex<Shared>>,
    events: mpsc::UnboundedSender<TableEvent>,
    computer_delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl LocalTable {
    /// Shortest pause before the computer replies.
    pub const MIN_DELAY: Duration = Duration::from_millis(500);
    /// Longest pause before the computer replies.
    pub const MAX_DELAY: Duration = Duration::from_millis(800);
    /// Pause used unless configured otherwise.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(600);

    /// Opens a table, loading saved scores from `store`.
    #[instrument(skip(store, events))]
    pub fn new(
        mode: GameMode,
        grid_size: GridSize,
        store: Box<dyn ScoreStore>,
        events: mpsc::UnboundedSender<TableEvent>,
    ) -> Self {
        let scores = store.load();
        info!("Opening table");
        Self {
            shared: Arc::new(Mutex::new(Shared {
                session: GameSession::new(mode, grid_size),
                scores,
                store,
                rng: StdRng::from_entropy(),
            })),
            events,
            computer_delay: Self::DEFAULT_DELAY,
            pending: None,
        }
    }

    /// Sets the computer's thinking pause, clamped to 500–800 ms.
    pub fn with_computer_delay(mut self, delay: Duration) -> Self {
        self.computer_delay = delay.clamp(Self::MIN_DELAY, Self::MAX_DELAY);
        self
    }

    /// Seeds the computer's random choices.
    pub fn with_seed(self, seed: u64) -> Self {
        lock(&self.shared).rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The configured thinking pause.
    pub fn computer_delay(&self) -> Duration {
        self.computer_delay
    }

    /// Copy of the session as it stands.
    pub fn session(&self) -> GameSession {
        lock(&self.shared).session.clone()
    }

    /// Current counters.
    pub fn scores(&self) -> ScoreBoard {
        lock(&self.shared).scores
    }

    /// Plays a human move in a local game.
    ///
    /// Against the computer a reply is scheduled when the game goes on, so
    /// this must run inside a tokio runtime. Inputs on the computer's turn are
    /// rejected, not queued.
    ///
    /// # Errors
    ///
    /// Whatever [`GameSession::play`] rejects.
    #[instrument(skip(self))]
    pub fn human_move(&mut self, index: usize) -> Result<MoveOutcome, MoveError> {
        let (outcome, schedule_at) = {
            let mut shared = lock(&self.shared);
            let symbol = shared.session.current();
            let outcome = shared.session.play(index)?;
            self.emit(TableEvent::MoveMade { symbol, index });
            finish_if_over(&mut shared, &outcome, &self.events);
            let schedule_at = shared
                .session
                .computer_to_move()
                .then(|| shared.session.epoch());
            (outcome, schedule_at)
        };

        if let Some(epoch) = schedule_at {
            self.schedule_computer(epoch);
        }

        Ok(outcome)
    }

    /// Starts a new game at the current size and mode.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.cancel_pending();
        lock(&self.shared).session.reset();
    }

    /// Switches the board size; always restarts.
    #[instrument(skip(self))]
    pub fn set_grid_size(&mut self, grid_size: GridSize) {
        self.cancel_pending();
        lock(&self.shared).session.set_grid_size(grid_size);
    }

    /// Switches the mode; always restarts.
    #[instrument(skip(self))]
    pub fn set_mode(&mut self, mode: GameMode) {
        self.cancel_pending();
        lock(&self.shared).session.set_mode(mode);
    }

    /// Builds a networked move request after local gating.
    ///
    /// # Errors
    ///
    /// Whatever [`GameSession::propose_move`] rejects.
    pub fn propose_move(&self, index: usize) -> Result<ClientMessage, MoveError> {
        lock(&self.shared).session.propose_move(index)
    }

    /// Applies a relay message and counts online results.
    ///
    /// # Errors
    ///
    /// Whatever [`GameSession::apply_server_message`] rejects.
    #[instrument(skip(self, message))]
    pub fn apply_server_message(&mut self, message: &ServerMessage) -> Result<RemoteUpdate, MoveError> {
        let mut shared = lock(&self.shared);
        let update = shared.session.apply_server_message(message)?;
        if let RemoteUpdate::Moved { index, outcome } = &update
            && let ServerMessage::MoveMade { symbol, .. } = message
        {
            self.emit(TableEvent::MoveMade {
                symbol: *symbol,
                index: *index,
            });
            finish_if_over(&mut shared, outcome, &self.events);
        }
        Ok(update)
    }

    fn schedule_computer(&mut self, epoch: u64) {
        self.cancel_pending();
        self.emit(TableEvent::ComputerThinking);

        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let delay = self.computer_delay;
        debug!(epoch, ?delay, "Scheduling computer move");

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut guard = lock(&shared);
            if guard.session.epoch() != epoch {
                debug!(epoch, "Board was reset, dropping computer move");
                return;
            }

            let Shared { session, rng, .. } = &mut *guard;
            let Some((index, outcome)) = session.play_computer(rng) else {
                return;
            };
            events
                .send(TableEvent::MoveMade {
                    symbol: GameMode::COMPUTER,
                    index,
                })
                .ok();
            finish_if_over(&mut guard, &outcome, &events);
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            debug!("Cancelled pending computer move");
        }
    }

    fn emit(&self, event: TableEvent) {
        if self.events.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}

impl Drop for LocalTable {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records a finished game and saves the scores.
fn finish_if_over(
    shared: &mut Shared,
    outcome: &MoveOutcome,
    events: &mpsc::UnboundedSender<TableEvent>,
) {
    let Some(result) = outcome.finished() else {
        return;
    };

    let line = match outcome {
        MoveOutcome::Won { line, .. } => Some(line.clone()),
        _ => None,
    };
    events
        .send(TableEvent::GameOver {
            outcome: result,
            line,
        })
        .ok();

    let me = shared.session.seat().symbol;
    shared.scores.record(shared.session.mode(), result, me);
    if let Err(e) = shared.store.save(&shared.scores) {
        warn!(error = %e, "Could not save scores");
    }
    events.send(TableEvent::ScoresChanged(shared.scores)).ok();
}
