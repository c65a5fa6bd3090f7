use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::error::{ConfigurationError, StorageError};

pub const DEFAULT_PHRASE: &str = "Bonjour tout le monde.";
pub const DEFAULT_DURATION_SECS: u32 = 30;

/// The flat record persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub phrases: Vec<String>,
    pub translations: Vec<String>,
    pub names: Vec<String>,
    pub duration: u32,
    pub scores: BTreeMap<String, i64>,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            phrases: vec![DEFAULT_PHRASE.to_string()],
            translations: Vec::new(),
            names: Vec::new(),
            duration: DEFAULT_DURATION_SECS,
            scores: BTreeMap::new(),
        }
    }
}

impl SessionRecord {
    /// Decode a stored record, falling back to defaults field by field.
    ///
    /// Unparseable input gives the default record. Fields of the wrong shape
    /// (non-arrays, a missing or non-positive duration, a non-object score map)
    /// are replaced by their default without touching the other fields.
    pub fn from_json_lenient(bytes: &[u8]) -> Self {
        let defaults = Self::default();
        let object = match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                warn!(kind = json_kind(&other), "stored session is not an object, using defaults");
                return defaults;
            }
            Err(e) => {
                warn!(error = %e, "stored session is corrupt, using defaults");
                return defaults;
            }
        };

        Self {
            phrases: string_list(&object, "phrases").unwrap_or(defaults.phrases),
            translations: string_list(&object, "translations").unwrap_or(defaults.translations),
            names: string_list(&object, "names").unwrap_or(defaults.names),
            duration: duration(&object).unwrap_or(defaults.duration),
            scores: scores(&object).unwrap_or(defaults.scores),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn string_list(object: &Map<String, Value>, field: &str) -> Option<Vec<String>> {
    match object.get(field)? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        other => {
            warn!(field, kind = json_kind(other), "stored field is not a list, using default");
            None
        }
    }
}

fn duration(object: &Map<String, Value>) -> Option<u32> {
    let parsed = match object.get("duration")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed.filter(|d| *d > 0).and_then(|d| u32::try_from(d).ok()) {
        Some(d) => Some(d),
        None => {
            warn!("stored duration is missing or invalid, using default");
            None
        }
    }
}

fn scores(object: &Map<String, Value>) -> Option<BTreeMap<String, i64>> {
    match object.get("scores")? {
        Value::Object(entries) => Some(
            entries
                .iter()
                .filter_map(|(name, v)| v.as_i64().map(|score| (name.clone(), score)))
                .collect(),
        ),
        _ => {
            warn!("stored scores are not a map, using default");
            None
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> SessionRecord;
    fn save(&self, record: &SessionRecord) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::session_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> SessionRecord {
        match fs::read(&self.path) {
            Ok(bytes) => SessionRecord::from_json_lenient(&bytes),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no stored session, using defaults");
                SessionRecord::default()
            }
        }
    }

    fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(record)?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }
}

/// Store that keeps the record in memory, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    record: RefCell<Option<SessionRecord>>,
    saves: RefCell<usize>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            record: RefCell::new(Some(record)),
            saves: RefCell::new(0),
        }
    }

    /// The last record saved (or seeded).
    pub fn stored(&self) -> Option<SessionRecord> {
        self.record.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> SessionRecord {
        self.record.borrow().clone().unwrap_or_default()
    }

    fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
        *self.record.borrow_mut() = Some(record.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

/// Raw text of the settings editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub phrases: String,
    pub translations: String,
    pub names: String,
    pub duration: String,
}

impl SettingsForm {
    /// Pre-fill the editor from a record.
    pub fn from_record(record: &SessionRecord) -> Self {
        Self {
            phrases: record.phrases.join("\n"),
            translations: record.translations.join("\n"),
            names: record.names.join(", "),
            duration: record.duration.to_string(),
        }
    }
}

/// A validated configuration change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEdit {
    pub phrases: Vec<String>,
    pub translations: Vec<String>,
    pub names: Vec<String>,
    pub duration: u32,
}

impl ConfigEdit {
    pub fn parse(form: &SettingsForm) -> Result<Self, ConfigurationError> {
        let phrases = parse_phrases(&form.phrases);
        if phrases.is_empty() {
            return Err(ConfigurationError::NoPhrases);
        }
        Ok(Self {
            phrases,
            translations: parse_translations(&form.translations),
            names: parse_names(&form.names),
            duration: parse_duration(&form.duration)?,
        })
    }
}

/// One phrase per non-blank line.
pub fn parse_phrases(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// One translation per line; runs of newlines count as one break.
pub fn parse_translations(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|l| !l.is_empty())
        .map(|l| l.trim().to_string())
        .collect()
}

/// Comma-separated player names.
pub fn parse_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

/// Empty, unparseable or zero input means the default; negatives are errors.
pub fn parse_duration(text: &str) -> Result<u32, ConfigurationError> {
    match text.trim().parse::<i64>() {
        Ok(0) | Err(_) => Ok(DEFAULT_DURATION_SECS),
        Ok(n) if n < 0 => Err(ConfigurationError::InvalidDuration(n)),
        Ok(n) => u32::try_from(n).map_err(|_| ConfigurationError::InvalidDuration(n)),
    }
}
