//! Error type shared by every engine component.

use thiserror::Error;

use crate::game::Phase;

/// Errors raised by the rules core.
///
/// Player-triggerable variants leave the session untouched, so the acting
/// seat can simply retry. `InvariantViolation` signals an engine bug and
/// halts the round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Tile not in hand, or no side matches the chosen end.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// Drawing while a legal move exists, or with an empty pile.
    #[error("illegal draw: {0}")]
    IllegalDraw(String),
    /// Passing while a legal move exists or drawing is still possible.
    #[error("illegal pass: {0}")]
    IllegalPass(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("seat {seat} is not a human seat")]
    NotHumanTurn { seat: usize },
    #[error("seat {seat} is not an AI seat")]
    NotAiTurn { seat: usize },
    #[error("expected phase {expected:?}, session is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid tile: {0}")]
    InvalidTile(String),
}

impl GameError {
    /// True for errors caused by an engine bug rather than by a player.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::InvariantViolation(_))
    }
}
