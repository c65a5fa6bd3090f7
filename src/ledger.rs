use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub score: i64,
}

/// Player scores, kept in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    entries: Vec<Standing>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger for `names`, every score at zero.
    pub fn with_players<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ledger = Self::new();
        ledger.sync_players(names);
        ledger
    }

    /// A ledger for `names` taking scores from `scores`; missing entries are 0
    /// and entries for other names are dropped.
    pub fn from_scores<I, S>(names: I, scores: &BTreeMap<String, i64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ledger = Self::with_players(names);
        for entry in &mut ledger.entries {
            entry.score = scores.get(&entry.name).copied().unwrap_or(0);
        }
        ledger
    }

    pub fn increment(&mut self, name: &str) -> Result<i64, LedgerError> {
        let entry = self.entry_mut(name)?;
        entry.score = entry.score.saturating_add(1);
        Ok(entry.score)
    }

    /// Scores have no floor.
    pub fn decrement(&mut self, name: &str) -> Result<i64, LedgerError> {
        let entry = self.entry_mut(name)?;
        entry.score = entry.score.saturating_sub(1);
        Ok(entry.score)
    }

    pub fn reset(&mut self, name: &str) -> Result<(), LedgerError> {
        self.entry_mut(name)?.score = 0;
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for entry in &mut self.entries {
            entry.score = 0;
        }
    }

    /// Players by descending score; ties keep configured order.
    pub fn rank(&self) -> Vec<Standing> {
        self.entries
            .iter()
            .cloned()
            .sorted_by(|a, b| b.score.cmp(&a.score))
            .collect()
    }

    /// Make the ledger hold exactly `names`, in that order.
    ///
    /// Kept players keep their score, new players start at 0, removed players
    /// lose theirs. Blank and repeated names are skipped.
    pub fn sync_players<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut previous = std::mem::take(&mut self.entries);
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || self.contains(name) {
                continue;
            }
            let score = previous
                .iter()
                .position(|e| e.name == name)
                .map(|pos| previous.swap_remove(pos).score)
                .unwrap_or(0);
            self.entries.push(Standing {
                name: name.to_string(),
                score,
            });
        }
    }

    pub fn score(&self, name: &str) -> Option<i64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.score)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Player names in configured order.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_scores(&self) -> BTreeMap<String, i64> {
        self.entries
            .iter()
            .map(|e| (e.name.clone(), e.score))
            .collect()
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut Standing, LedgerError> {
        self.entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| LedgerError::UnknownPlayer(name.to_string()))
    }
}
