//! Per-conversation configuration, durably persisted.
//!
//! The settings document is a single JSON object mapping conversation keys
//! to `{model, history}` and is rewritten in full on every mutation. A
//! missing or unreadable document is an empty store, never a startup
//! failure.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::key::ConversationKey;

/// Model identifiers the bot can be switched to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "o3-mini")]
    O3Mini,
    #[serde(rename = "o1-mini")]
    O1Mini,
}

impl ModelId {
    pub const ALL: [ModelId; 4] = [
        ModelId::Gpt4oMini,
        ModelId::Gpt4o,
        ModelId::O3Mini,
        ModelId::O1Mini,
    ];

    /// The identifier sent to the completion API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt4oMini => "gpt-4o-mini",
            ModelId::Gpt4o => "gpt-4o",
            ModelId::O3Mini => "o3-mini",
            ModelId::O1Mini => "o1-mini",
        }
    }
}

impl std::str::FromStr for ModelId {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .iter()
            .copied()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown model '{0}'")]
pub struct UnknownModel(pub String);

/// Configuration for one conversation scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub model: ModelId,
    #[serde(rename = "history")]
    pub history_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ModelId::default(),
            history_enabled: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to persist settings: {0}")]
    Persist(#[from] std::io::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keyed settings with write-through JSON persistence.
pub struct SettingsStore {
    path: PathBuf,
    entries: Mutex<HashMap<ConversationKey, Settings>>,
}

impl SettingsStore {
    /// Load prior settings from `path`. A missing, empty, or malformed file
    /// means no settings yet: the store starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "settings file is malformed, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// The settings for `key`, seeding and persisting the default on first
    /// touch. A failed seed write only goes to the log; the in-memory copy
    /// is authoritative for the rest of the process lifetime either way.
    pub fn get(&self, key: &ConversationKey) -> Settings {
        let mut entries = self.entries.lock().unwrap();
        if let Some(settings) = entries.get(key) {
            return *settings;
        }

        let settings = Settings::default();
        entries.insert(key.clone(), settings);
        if let Err(err) = self.write(&entries) {
            warn!(key = %key, error = %err, "failed to persist seeded default settings");
        }
        settings
    }

    pub fn set_model(&self, key: &ConversationKey, model: ModelId) -> Result<(), SettingsError> {
        self.update(key, |settings| settings.model = model)
    }

    pub fn set_history_enabled(
        &self,
        key: &ConversationKey,
        enabled: bool,
    ) -> Result<(), SettingsError> {
        self.update(key, |settings| settings.history_enabled = enabled)
    }

    /// Merge one field and persist synchronously before returning. On a
    /// write failure the in-memory update stays applied and the error goes
    /// to the caller.
    fn update(
        &self,
        key: &ConversationKey,
        apply: impl FnOnce(&mut Settings),
    ) -> Result<(), SettingsError> {
        let mut entries = self.entries.lock().unwrap();
        let settings = entries.entry(key.clone()).or_default();
        apply(settings);
        self.write(&entries)
    }

    fn write(&self, entries: &HashMap<ConversationKey, Settings>) -> Result<(), SettingsError> {
        let serialized = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}
