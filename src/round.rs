//! Round lifecycle.
//!
//! ```text
//! Idle --begin--> Scrambled --reveal--> Revealed --next--> Scrambled
//!                    |  ^                          \
//!                    expire                         `--next (exhausted)--> Ended
//! ```
//!
//! Under [`RevealPolicy::AfterExpiry`] reveal stays locked until the
//! countdown fires; expiry unlocks it but never reveals on its own.

use rand::Rng;
use tracing::{debug, info};

use crate::countdown::{Countdown, CountdownEvent, TickSource};
use crate::error::{ConfigurationError, RoundError};
use crate::ledger::{ScoreLedger, Standing};
use crate::order::{self, Outcome};
use crate::phrase::{shuffle, tokenize};
use crate::selector::{RoundSelector, Selection};
use crate::session::translation_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Idle,
    Scrambled,
    Revealed,
    Ended,
}

/// When the answer may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealPolicy {
    /// Locked until the countdown expires.
    #[default]
    AfterExpiry,
    /// Allowed as soon as the round starts.
    Immediate,
}

/// The phrase currently on the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub phrase_index: usize,
    pub phrase: String,
    pub translation: Option<String>,
    /// Tokens in reading order.
    pub canonical: Vec<String>,
    /// Tokens as first dealt.
    pub scrambled: Vec<String>,
    /// Tokens as the players have rearranged them so far.
    pub arrangement: Vec<String>,
}

/// What `next` led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Started { phrase_index: usize },
    Ended(Vec<Standing>),
}

/// Reject sessions that cannot produce a round.
pub fn check_playable(phrases: &[String], duration_secs: i64) -> Result<(), ConfigurationError> {
    if phrases.is_empty() {
        return Err(ConfigurationError::NoPhrases);
    }
    if let Some(index) = phrases.iter().position(|p| p.trim().is_empty()) {
        return Err(ConfigurationError::EmptyPhrase { index });
    }
    if duration_secs < 1 {
        return Err(ConfigurationError::InvalidDuration(duration_secs));
    }
    Ok(())
}

pub struct RoundMachine<R: Rng, T: TickSource> {
    phrases: Vec<String>,
    translations: Vec<String>,
    policy: RevealPolicy,
    selector: RoundSelector,
    countdown: Countdown<T>,
    rng: R,
    phase: Phase,
    round: Option<RoundState>,
    reveal_unlocked: bool,
    final_ranking: Option<Vec<Standing>>,
}

impl<R: Rng, T: TickSource> RoundMachine<R, T> {
    pub fn new(
        phrases: Vec<String>,
        translations: Vec<String>,
        duration_secs: u32,
        policy: RevealPolicy,
        rng: R,
        ticks: T,
    ) -> Result<Self, ConfigurationError> {
        check_playable(&phrases, duration_secs as i64)?;
        Ok(Self {
            selector: RoundSelector::new(phrases.len()),
            phrases,
            translations,
            policy,
            countdown: Countdown::new(duration_secs, ticks),
            rng,
            phase: Phase::Idle,
            round: None,
            reveal_unlocked: false,
            final_ranking: None,
        })
    }

    /// Idle → Scrambled. Returns the chosen phrase index.
    pub fn begin(&mut self) -> Result<usize, RoundError> {
        if self.phase != Phase::Idle {
            return Err(self.invalid("begin"));
        }
        self.deal()
    }

    /// Time is up: unlock reveal without revealing.
    pub fn expire(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::Scrambled {
            return Err(self.invalid("expire"));
        }
        self.countdown.stop();
        if !self.reveal_unlocked {
            self.reveal_unlocked = true;
            debug!("reveal unlocked");
        }
        Ok(())
    }

    /// Scrambled → Revealed.
    pub fn reveal(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::Scrambled {
            return Err(self.invalid("reveal"));
        }
        if !self.can_reveal() {
            return Err(RoundError::RevealLocked);
        }
        self.countdown.stop();
        self.phase = Phase::Revealed;
        info!(
            phrase = ?self.round.as_ref().map(|r| r.phrase_index),
            remaining = self.countdown.remaining(),
            "round revealed"
        );
        Ok(())
    }

    /// Revealed → Scrambled with a fresh phrase, or → Ended with the ranking
    /// of `ledger` once every phrase has been played.
    pub fn next(&mut self, ledger: &ScoreLedger) -> Result<Advance, RoundError> {
        if self.phase != Phase::Revealed {
            return Err(self.invalid("advance"));
        }
        if self.selector.is_exhausted() {
            let ranking = ledger.rank();
            self.countdown.stop();
            self.phase = Phase::Ended;
            self.round = None;
            self.final_ranking = Some(ranking.clone());
            info!(players = ranking.len(), "game ended");
            return Ok(Advance::Ended(ranking));
        }
        let phrase_index = self.deal()?;
        Ok(Advance::Started { phrase_index })
    }

    /// Forget the pass and begin again from Idle.
    pub fn restart(&mut self) -> Result<usize, RoundError> {
        self.countdown.stop();
        self.selector.reset();
        self.phase = Phase::Idle;
        self.round = None;
        self.reveal_unlocked = false;
        self.final_ranking = None;
        debug!("round machine reset");
        self.begin()
    }

    /// Swap in a new phrase list and duration, then restart.
    pub fn reconfigure(
        &mut self,
        phrases: Vec<String>,
        translations: Vec<String>,
        duration_secs: u32,
    ) -> Result<usize, RoundError> {
        check_playable(&phrases, duration_secs as i64)?;
        self.countdown.stop();
        self.selector = RoundSelector::new(phrases.len());
        self.phrases = phrases;
        self.translations = translations;
        self.countdown.set_duration(duration_secs);
        self.restart()
    }

    /// Advance the countdown one period; expiry unlocks reveal.
    pub fn tick(&mut self) -> Option<CountdownEvent> {
        let event = self.countdown.tick();
        self.on_countdown(event)
    }

    /// Apply whatever ticks the tick source has accumulated.
    pub fn poll(&mut self) -> Option<CountdownEvent> {
        let event = self.countdown.poll();
        self.on_countdown(event)
    }

    /// Drag-and-drop: move the token in slot `from` to slot `to`.
    pub fn move_token(&mut self, from: usize, to: usize) -> Result<(), RoundError> {
        if self.phase != Phase::Scrambled {
            return Err(self.invalid("move a token"));
        }
        let Some(round) = self.round.as_mut() else {
            return Err(RoundError::InvalidTransition {
                action: "move a token",
                phase: self.phase,
            });
        };
        let len = round.arrangement.len();
        for index in [from, to] {
            if index >= len {
                return Err(RoundError::TokenOutOfRange { index, len });
            }
        }
        let token = round.arrangement.remove(from);
        round.arrangement.insert(to, token);
        Ok(())
    }

    /// Compare the current arrangement with the phrase.
    pub fn check_arrangement(&self) -> Result<Outcome, RoundError> {
        match (&self.round, self.phase) {
            (Some(round), Phase::Scrambled | Phase::Revealed) => {
                Ok(order::validate(&round.canonical, &round.arrangement))
            }
            _ => Err(self.invalid("check the arrangement")),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    /// Tokens to show: the arrangement while scrambled, the phrase once revealed.
    pub fn visible_tokens(&self) -> Option<&[String]> {
        let round = self.round.as_ref()?;
        match self.phase {
            Phase::Scrambled => Some(&round.arrangement),
            Phase::Revealed => Some(&round.canonical),
            Phase::Idle | Phase::Ended => None,
        }
    }

    pub fn can_reveal(&self) -> bool {
        self.phase == Phase::Scrambled
            && (self.reveal_unlocked || self.policy == RevealPolicy::Immediate)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn duration_secs(&self) -> u32 {
        self.countdown.duration()
    }

    pub fn progress(&self) -> f64 {
        self.countdown.progress()
    }

    pub fn final_ranking(&self) -> Option<&[Standing]> {
        self.final_ranking.as_deref()
    }

    pub fn played_count(&self) -> usize {
        self.selector.played().len()
    }

    pub fn total_phrases(&self) -> usize {
        self.selector.total()
    }

    pub fn countdown(&self) -> &Countdown<T> {
        &self.countdown
    }

    pub fn countdown_mut(&mut self) -> &mut Countdown<T> {
        &mut self.countdown
    }

    fn deal(&mut self) -> Result<usize, RoundError> {
        let phrase_index = match self.selector.select_next(&mut self.rng) {
            Selection::Next(idx) => idx,
            Selection::Complete => return Err(RoundError::GameComplete),
        };
        let phrase = self.phrases[phrase_index].clone();
        let canonical = tokenize(&phrase);
        let scrambled = shuffle(&canonical, &mut self.rng);
        let translation = translation_for(&self.translations, phrase_index).map(str::to_string);

        self.round = Some(RoundState {
            phrase_index,
            phrase,
            translation,
            canonical,
            arrangement: scrambled.clone(),
            scrambled,
        });
        self.reveal_unlocked = false;
        self.phase = Phase::Scrambled;
        self.countdown.start();
        info!(
            phrase = phrase_index,
            played = self.selector.played().len(),
            total = self.selector.total(),
            "round started"
        );
        Ok(phrase_index)
    }

    fn on_countdown(&mut self, event: Option<CountdownEvent>) -> Option<CountdownEvent> {
        if event == Some(CountdownEvent::Expired) && self.phase == Phase::Scrambled {
            let _ = self.expire();
        }
        event
    }

    fn invalid(&self, action: &'static str) -> RoundError {
        RoundError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }
}
