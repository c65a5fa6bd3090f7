//! Command handlers for a hosted game.
//!
//! [`Game`] owns the session, the round machine and the store. Every handler
//! that changes the session writes it back before returning.

use rand::Rng;
use tracing::{info, warn};

use crate::config::{ConfigEdit, ConfigStore};
use crate::countdown::{CountdownEvent, TickSource};
use crate::error::GameError;
use crate::order::Outcome;
use crate::round::{check_playable, Advance, RevealPolicy, RoundMachine};
use crate::session::Session;

pub struct Game<S: ConfigStore, R: Rng, T: TickSource> {
    store: S,
    session: Session,
    machine: RoundMachine<R, T>,
}

impl<S: ConfigStore, R: Rng, T: TickSource> Game<S, R, T> {
    /// Load the stored session and deal the first round.
    pub fn load(store: S, policy: RevealPolicy, rng: R, ticks: T) -> Result<Self, GameError> {
        let session = Session::from_record(store.load());
        Self::from_session(store, session, policy, rng, ticks)
    }

    /// Start from an explicit session. Nothing is written until a mutation.
    pub fn from_session(
        store: S,
        session: Session,
        policy: RevealPolicy,
        rng: R,
        ticks: T,
    ) -> Result<Self, GameError> {
        let mut machine = RoundMachine::new(
            session.phrases.clone(),
            session.translations.clone(),
            session.duration_secs,
            policy,
            rng,
            ticks,
        )?;
        machine.begin()?;
        info!(
            phrases = session.phrases.len(),
            players = session.ledger.len(),
            duration = session.duration_secs,
            "game loaded"
        );
        Ok(Self {
            store,
            session,
            machine,
        })
    }

    pub fn apply_increment(&mut self, name: &str) -> Result<i64, GameError> {
        let score = self.session.ledger.increment(name)?;
        info!(player = name, score, "score incremented");
        self.persist()?;
        Ok(score)
    }

    pub fn apply_decrement(&mut self, name: &str) -> Result<i64, GameError> {
        let score = self.session.ledger.decrement(name)?;
        info!(player = name, score, "score decremented");
        self.persist()?;
        Ok(score)
    }

    pub fn reset_score(&mut self, name: &str) -> Result<(), GameError> {
        self.session.ledger.reset(name)?;
        info!(player = name, "score reset");
        self.persist()
    }

    pub fn reset_scores(&mut self) -> Result<(), GameError> {
        self.session.ledger.reset_all();
        info!("all scores reset");
        self.persist()
    }

    /// Apply a settings change, save it and deal a fresh pass.
    ///
    /// Nothing changes unless the edit is playable and the store accepts it.
    pub fn save_configuration(&mut self, edit: ConfigEdit) -> Result<(), GameError> {
        check_playable(&edit.phrases, edit.duration as i64)?;
        let mut session = self.session.clone();
        session.apply_edit(edit);
        self.store.save(&session.to_record()).map_err(|e| {
            warn!(error = %e, "failed to save configuration");
            GameError::from(e)
        })?;
        self.machine.reconfigure(
            session.phrases.clone(),
            session.translations.clone(),
            session.duration_secs,
        )?;
        info!(
            phrases = session.phrases.len(),
            players = session.ledger.len(),
            duration = session.duration_secs,
            "configuration saved"
        );
        self.session = session;
        Ok(())
    }

    pub fn reveal(&mut self) -> Result<(), GameError> {
        Ok(self.machine.reveal()?)
    }

    pub fn next(&mut self) -> Result<Advance, GameError> {
        Ok(self.machine.next(&self.session.ledger)?)
    }

    pub fn restart(&mut self) -> Result<usize, GameError> {
        Ok(self.machine.restart()?)
    }

    pub fn tick(&mut self) -> Option<CountdownEvent> {
        self.machine.tick()
    }

    pub fn poll(&mut self) -> Option<CountdownEvent> {
        self.machine.poll()
    }

    pub fn move_token(&mut self, from: usize, to: usize) -> Result<(), GameError> {
        Ok(self.machine.move_token(from, to)?)
    }

    pub fn check_arrangement(&self) -> Result<Outcome, GameError> {
        Ok(self.machine.check_arrangement()?)
    }

    /// Write the session to the store.
    pub fn persist(&self) -> Result<(), GameError> {
        self.store.save(&self.session.to_record()).map_err(|e| {
            warn!(error = %e, "failed to persist session");
            GameError::from(e)
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn machine(&self) -> &RoundMachine<R, T> {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut RoundMachine<R, T> {
        &mut self.machine
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
