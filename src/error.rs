//! Error types for the game engine.

use crate::round::Phase;

/// The configured session cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// No phrases are configured, so no round can start.
    #[error("no phrases configured")]
    NoPhrases,

    /// A configured phrase is blank after trimming.
    #[error("phrase {index} is empty")]
    EmptyPhrase { index: usize },

    /// The round duration is not a positive number of seconds.
    #[error("invalid round duration: {0} (must be a positive number of seconds)")]
    InvalidDuration(i64),
}

/// Writing the session record failed.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write session record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode session record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The name is not one of the session's players.
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
}

/// Errors raised by the round state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The action is not legal in the current phase. Nothing changed.
    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    /// Reveal was requested before the countdown expired.
    #[error("reveal is locked until the countdown expires")]
    RevealLocked,

    /// Every phrase of this pass has been played.
    #[error("all phrases have been played")]
    GameComplete,

    /// A drag-and-drop move referenced a slot that does not exist.
    #[error("token slot {index} out of range (round has {len} tokens)")]
    TokenOutOfRange { index: usize, len: usize },
}

/// Everything a command handler can report.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Round(#[from] RoundError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
