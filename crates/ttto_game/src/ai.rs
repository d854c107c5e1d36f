//! Computer opponent.
//!
//! Three difficulty tiers share one heuristic chain: take an immediate win,
//! block the opponent's immediate win, follow a small opening book on 3×3,
//! take the centre, prefer corners over edges, then anything left. Easy never
//! consults the chain and medium consults it on half of its moves.

use crate::rules::check_win;
use crate::types::{Board, Symbol};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// AI strength preset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random empty square.
    Easy,
    /// Heuristic chain half of the time, random otherwise.
    #[default]
    Medium,
    /// Heuristic chain every move.
    Hard,
}

/// Errors from move selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum AiError {
    /// The board has no empty square.
    #[display("No move available on a full board")]
    NoMoveAvailable,
}

impl std::error::Error for AiError {}

/// Chooses a square for `ai` to play.
///
/// `history` is the sequence of indices played so far, oldest first; only the
/// opening book reads it.
///
/// # Errors
///
/// [`AiError::NoMoveAvailable`] when every square is occupied.
#[instrument(skip(board, history, rng), fields(size = %board.size(), moves = history.len()))]
pub fn select_move<R: Rng + ?Sized>(
    board: &Board,
    difficulty: Difficulty,
    ai: Symbol,
    history: &[usize],
    rng: &mut R,
) -> Result<usize, AiError> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return Err(AiError::NoMoveAvailable);
    }

    let chosen = match difficulty {
        Difficulty::Easy => random_square(&empty, rng),
        Difficulty::Medium if rng.gen_bool(0.5) => best_move(board, ai, history, rng),
        Difficulty::Medium => random_square(&empty, rng),
        Difficulty::Hard => best_move(board, ai, history, rng),
    };

    chosen.ok_or(AiError::NoMoveAvailable)
}

/// The full heuristic chain.
fn best_move<R: Rng + ?Sized>(
    board: &Board,
    ai: Symbol,
    history: &[usize],
    rng: &mut R,
) -> Option<usize> {
    if let Some(index) = immediate_win(board, ai) {
        debug!(index, "Taking winning square");
        return Some(index);
    }

    if let Some(index) = immediate_win(board, ai.opponent()) {
        debug!(index, "Blocking opponent");
        return Some(index);
    }

    if let Some(index) = opening_book(board, history, rng) {
        debug!(index, "Answering opposite-corner opening with an edge");
        return Some(index);
    }

    let center = board.center();
    if board.is_vacant(center) {
        return Some(center);
    }

    let corners: Vec<usize> = board
        .corners()
        .into_iter()
        .filter(|&c| board.is_vacant(c))
        .collect();
    if let Some(&corner) = corners.choose(rng) {
        return Some(corner);
    }

    let empty = board.empty_cells();
    let edges: Vec<usize> = empty.iter().copied().filter(|&i| board.is_edge(i)).collect();
    if let Some(&edge) = edges.choose(rng) {
        return Some(edge);
    }

    random_square(&empty, rng)
}

/// First empty square, in index order, that completes a line for `symbol`.
fn immediate_win(board: &Board, symbol: Symbol) -> Option<usize> {
    let mut trial = board.clone();
    for index in board.empty_cells() {
        if trial.apply_move(index, symbol).is_ok() && check_win(&trial, symbol) {
            return Some(index);
        }
        trial.clear(index);
    }
    None
}

/// On 3×3, after corner / centre / opposite corner, a corner reply loses to a
/// fork. Any edge holds the draw.
fn opening_book<R: Rng + ?Sized>(board: &Board, history: &[usize], rng: &mut R) -> Option<usize> {
    if board.size().get() != 3 {
        return None;
    }
    let &[first, second, third] = history else {
        return None;
    };
    let last = board.len() - 1;
    let opens_in_corner = board.corners().contains(&first);
    if !opens_in_corner || second != board.center() || third != last - first {
        return None;
    }

    let edges: Vec<usize> = board
        .empty_cells()
        .into_iter()
        .filter(|&i| board.is_edge(i))
        .collect();
    edges.choose(rng).copied()
}

fn random_square<R: Rng + ?Sized>(empty: &[usize], rng: &mut R) -> Option<usize> {
    empty.choose(rng).copied()
}
