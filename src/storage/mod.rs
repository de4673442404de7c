//! Key-value persistence for calculator state.
//!
//! Each piece of persisted state lives under its own key as a text blob:
//! the history as a JSON array, preferences as a JSON object, memory as a
//! plain number and the theme as `dark` or `light`.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;
use crate::history::HistoryEntry;
use crate::preferences::{Preferences, Theme};
use serde::de::DeserializeOwned;
use tracing::warn;

pub const HISTORY_KEY: &str = "calcHistory";
pub const PREFERENCES_KEY: &str = "calcPreferences";
pub const MEMORY_KEY: &str = "calcMemory";
pub const THEME_KEY: &str = "theme";

/// A store of text blobs addressed by key.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Everything restored at startup.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub history: Vec<HistoryEntry>,
    pub preferences: Preferences,
    pub memory: f64,
    pub theme: Theme,
}

impl Snapshot {
    /// Read all persisted state.
    ///
    /// Missing keys yield defaults. Blobs that fail to decode are logged and
    /// replaced by defaults; only storage I/O failures are returned.
    pub fn load(storage: &impl Storage) -> Result<Self, StorageError> {
        let history = load_json(storage, HISTORY_KEY)?.unwrap_or_default();
        let preferences = load_json(storage, PREFERENCES_KEY)?.unwrap_or_default();

        let memory: f64 = match storage.get(MEMORY_KEY)? {
            Some(text) => text
                .trim()
                .parse()
                .ok()
                .filter(|memory: &f64| memory.is_finite())
                .unwrap_or_else(|| {
                    warn!(key = MEMORY_KEY, value = %text, "ignoring unreadable memory value");
                    0.0
                }),
            None => 0.0,
        };

        let theme = match storage.get(THEME_KEY)? {
            Some(text) => text.parse().unwrap_or_else(|_| {
                warn!(key = THEME_KEY, value = %text, "ignoring unknown theme");
                Theme::default()
            }),
            None => Theme::default(),
        };

        Ok(Self {
            history,
            preferences,
            memory,
            theme,
        })
    }
}

fn load_json<T: DeserializeOwned>(
    storage: &impl Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(text) = storage.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "ignoring corrupt stored value");
            Ok(None)
        }
    }
}

pub fn save_history(
    storage: &mut impl Storage,
    entries: &[HistoryEntry],
) -> Result<(), StorageError> {
    storage.set(HISTORY_KEY, &serde_json::to_string(entries)?)
}

pub fn save_preferences(
    storage: &mut impl Storage,
    preferences: &Preferences,
) -> Result<(), StorageError> {
    storage.set(PREFERENCES_KEY, &serde_json::to_string(preferences)?)
}

pub fn save_memory(storage: &mut impl Storage, memory: f64) -> Result<(), StorageError> {
    storage.set(MEMORY_KEY, &memory.to_string())
}

pub fn save_theme(storage: &mut impl Storage, theme: Theme) -> Result<(), StorageError> {
    storage.set(THEME_KEY, theme.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::DecimalPlaces;
    use crate::preferences::DEFAULT_MAX_HISTORY;

    #[test]
    fn test_empty_storage_loads_defaults() {
        let snapshot = Snapshot::load(&MemoryStorage::default()).unwrap();
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.preferences, Preferences::default());
        assert_eq!(snapshot.memory, 0.0);
        assert_eq!(snapshot.theme, Theme::Dark);
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::default();
        let mut preferences = Preferences::default();
        preferences.decimal_places = DecimalPlaces::Fixed(2);

        save_history(&mut storage, &[HistoryEntry::new("5 + 3", 8.0)]).unwrap();
        save_preferences(&mut storage, &preferences).unwrap();
        save_memory(&mut storage, 42.5).unwrap();
        save_theme(&mut storage, Theme::Light).unwrap();

        let snapshot = Snapshot::load(&storage).unwrap();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].expression, "5 + 3");
        assert_eq!(snapshot.preferences.decimal_places, DecimalPlaces::Fixed(2));
        assert_eq!(snapshot.memory, 42.5);
        assert_eq!(snapshot.theme, Theme::Light);
        assert_eq!(storage.get(MEMORY_KEY).unwrap().as_deref(), Some("42.5"));
    }

    #[test]
    fn test_corrupt_blobs_fall_back() {
        let mut storage = MemoryStorage::default();
        storage.set(HISTORY_KEY, "[{not json").unwrap();
        storage.set(PREFERENCES_KEY, "42").unwrap();
        storage.set(MEMORY_KEY, "lots").unwrap();
        storage.set(THEME_KEY, "neon").unwrap();

        let snapshot = Snapshot::load(&storage).unwrap();
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.preferences, Preferences::default());
        assert_eq!(snapshot.memory, 0.0);
        assert_eq!(snapshot.theme, Theme::Dark);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let mut storage = MemoryStorage::default();
        storage.set(MEMORY_KEY, "inf").unwrap();
        storage.set(PREFERENCES_KEY, r#"{"maxHistory": 0}"#).unwrap();

        let snapshot = Snapshot::load(&storage).unwrap();
        assert_eq!(snapshot.memory, 0.0);
        assert_eq!(snapshot.preferences.max_history, DEFAULT_MAX_HISTORY);
    }
}
