//! Game rules and persistence for wordmix. The terminal front-end lives in
//! the binary; everything here runs headless.

pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod error;
pub mod game;
pub mod ledger;
pub mod order;
pub mod phrase;
pub mod round;
pub mod runtime;
pub mod selector;
pub mod session;

pub use error::{ConfigurationError, GameError, LedgerError, RoundError, StorageError};
pub use game::Game;
pub use round::{Advance, Phase, RevealPolicy, RoundMachine};
