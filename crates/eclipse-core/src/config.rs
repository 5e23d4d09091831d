use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::LauncherError;
use crate::history::{HistoryEntry, HistoryLog};
use crate::paths::{ensure_dir, file_exists};

pub const DEFAULT_RAM_GB: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Purple,
    Blue,
    Green,
    Red,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Purple, Theme::Blue, Theme::Green, Theme::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Purple => "purple",
            Theme::Blue => "blue",
            Theme::Green => "green",
            Theme::Red => "red",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("Unknown theme '{value}' (expected purple, blue, green or red)"))
    }
}

/// The persisted launcher document. Keys the launcher does not know about
/// are carried in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub last_username: String,
    pub ram_allocation: u32,
    pub theme: Theme,
    pub dark_mode: bool,
    pub tutorial_shown: bool,
    pub launch_history: HistoryLog,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            last_username: String::new(),
            ram_allocation: DEFAULT_RAM_GB,
            theme: Theme::default(),
            dark_mode: true,
            tutorial_shown: false,
            launch_history: HistoryLog::new(),
            extra: Map::new(),
        }
    }
}

impl Configuration {
    /// Shallow merge of a persisted document over the defaults. A known key
    /// whose value does not fit its type keeps the default.
    pub fn merged_over_defaults(persisted: Map<String, Value>) -> Self {
        let defaults = default_document();
        let mut merged = defaults.clone();
        merged.extend(persisted.clone());

        if let Ok(config) = serde_json::from_value(Value::Object(merged.clone())) {
            return config;
        }

        for key in defaults.keys() {
            let Some(value) = persisted.get(key) else {
                continue;
            };
            let mut probe = defaults.clone();
            probe.insert(key.clone(), value.clone());
            if serde_json::from_value::<Configuration>(Value::Object(probe)).is_err() {
                tracing::warn!(key = %key, "ignoring persisted config value with unexpected shape");
                merged.insert(key.clone(), defaults[key].clone());
            }
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }
}

fn default_document() -> Map<String, Value> {
    match serde_json::to_value(Configuration::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Reads the document at `path`. A missing or unreadable document yields
/// the defaults; this never fails.
pub fn load_configuration(path: &Path) -> Configuration {
    if !file_exists(path) {
        return Configuration::default();
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %path.display(), "failed to read config: {err}");
            return Configuration::default();
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Configuration::merged_over_defaults(map),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "config is not a JSON object; using defaults");
            Configuration::default()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "failed to parse config: {err}");
            Configuration::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    Username(String),
    RamAllocation(u32),
    Theme(Theme),
    DarkMode(bool),
    TutorialShown(bool),
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Configuration,
}

pub type SharedConfig = Arc<Mutex<ConfigStore>>;

impl ConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = load_configuration(&path);
        Self { path, config }
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(Mutex::new(self))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn try_save(&self) -> Result<(), LauncherError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let payload = serde_json::to_vec_pretty(&self.config)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    /// Persists the whole document. Failures are logged, not returned.
    pub fn save(&self) {
        if let Err(err) = self.try_save() {
            tracing::error!(path = %self.path.display(), "error saving config: {err}");
        }
    }

    pub fn update(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::Username(name) => self.config.last_username = name,
            ConfigUpdate::RamAllocation(gb) => self.config.ram_allocation = gb,
            ConfigUpdate::Theme(theme) => self.config.theme = theme,
            ConfigUpdate::DarkMode(enabled) => self.config.dark_mode = enabled,
            ConfigUpdate::TutorialShown(shown) => self.config.tutorial_shown = shown,
        }
        self.save();
    }

    pub fn record_launch(&mut self, entry: HistoryEntry) -> Vec<HistoryEntry> {
        self.config.launch_history.append(entry);
        self.save();
        self.config.launch_history.entries().to_vec()
    }

    /// Deletes the persisted document and falls back to defaults.
    pub fn reset(&mut self) -> Result<(), LauncherError> {
        if file_exists(&self.path) {
            fs::remove_file(&self.path)?;
        }
        self.config = load_configuration(&self.path);
        tracing::info!(path = %self.path.display(), "launcher configuration reset");
        Ok(())
    }
}

/// Locks the shared store, recovering the guard if a previous holder panicked.
pub fn lock_store(store: &SharedConfig) -> MutexGuard<'_, ConfigStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}
