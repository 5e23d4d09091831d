use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

pub const HISTORY_CAPACITY: usize = 10;

/// One successful launch, kept so the user can repeat it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub version: String,
    pub username: String,
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn now(version: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            username: username.into(),
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }
}

/// Newest-first launch log bounded to [`HISTORY_CAPACITY`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }
}

impl From<Vec<HistoryEntry>> for HistoryLog {
    fn from(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }
}

impl From<HistoryLog> for Vec<HistoryEntry> {
    fn from(log: HistoryLog) -> Self {
        log.entries
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
