use crate::config::{ConfigEdit, SessionRecord, DEFAULT_DURATION_SECS};
use crate::ledger::ScoreLedger;

/// Configuration and scores of the game being hosted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub phrases: Vec<String>,
    pub translations: Vec<String>,
    pub duration_secs: u32,
    pub ledger: ScoreLedger,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_record(SessionRecord::default())
    }
}

impl Session {
    /// Build from a stored record; every name gets a score entry.
    pub fn from_record(record: SessionRecord) -> Self {
        let ledger = ScoreLedger::from_scores(&record.names, &record.scores);
        Self {
            phrases: record.phrases,
            translations: record.translations,
            duration_secs: if record.duration == 0 {
                DEFAULT_DURATION_SECS
            } else {
                record.duration
            },
            ledger,
        }
    }

    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            phrases: self.phrases.clone(),
            translations: self.translations.clone(),
            names: self.ledger.players().map(str::to_string).collect(),
            duration: self.duration_secs,
            scores: self.ledger.to_scores(),
        }
    }

    /// Replace the configuration; scores of kept players survive.
    pub fn apply_edit(&mut self, edit: ConfigEdit) {
        self.phrases = edit.phrases;
        self.translations = edit.translations;
        self.duration_secs = edit.duration;
        self.ledger.sync_players(&edit.names);
    }

}

/// The translation paired with phrase `index`, if it has any text.
pub fn translation_for(translations: &[String], index: usize) -> Option<&str> {
    translations
        .get(index)
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
}
