//! A calculator session.
//!
//! [`App`] owns the engine, the history, the preferences and the storage
//! backend. Calculations coming out of the engine are recorded in history,
//! and user-facing messages are returned as [`Notice`]s for the front end to
//! show. Nothing is written to storage until the caller invokes [`App::save`].

use crate::calculator::{Calculation, Calculator, Display, Key};
use crate::error::{CalcError, HistoryError, PreferenceError, StorageError};
use crate::history::{HistoryEntry, HistoryStats, HistoryStore};
use crate::preferences::{Preferences, Theme, Toggle};
use crate::storage::{self, Snapshot, Storage};
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const CLEAR_HISTORY_TITLE: &str = "Clear History";
pub const CLEAR_HISTORY_MESSAGE: &str =
    "Are you sure you want to clear all calculation history? This action cannot be undone.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A short message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Which persisted blobs changed since the last save.
#[derive(Clone, Copy, Debug, Default)]
struct Dirty {
    history: bool,
    preferences: bool,
    memory: bool,
    theme: bool,
}

impl Dirty {
    fn any(&self) -> bool {
        self.history || self.preferences || self.memory || self.theme
    }
}

pub struct App<S: Storage> {
    calculator: Calculator,
    history: HistoryStore,
    preferences: Preferences,
    theme: Theme,
    storage: S,
    dirty: Dirty,
}

impl<S: Storage> App<S> {
    /// Restore a session from `storage`.
    pub fn load(storage: S, error_reset: Duration) -> Result<Self, StorageError> {
        let Snapshot {
            history,
            preferences,
            memory,
            theme,
        } = Snapshot::load(&storage)?;

        info!(
            entries = history.len(),
            memory,
            theme = theme.as_str(),
            "restored session"
        );

        Ok(Self {
            calculator: Calculator::new(memory).with_error_reset(error_reset),
            history: HistoryStore::from_entries(history, preferences.max_history),
            preferences,
            theme,
            storage,
            dirty: Dirty::default(),
        })
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn display(&self) -> Display {
        self.calculator.display(&self.preferences.formatting())
    }

    /// Handle a single key press.
    pub fn press(&mut self, key: Key) -> Option<Notice> {
        let fmt = self.preferences.formatting();
        match key {
            Key::Digit(digit) => {
                self.calculator.append_digit(digit);
                None
            }
            Key::Operator(op) => {
                let outcome = self.calculator.choose_operator(op, &fmt);
                self.finish(outcome)
            }
            Key::Evaluate => {
                let outcome = self.calculator.evaluate(&fmt);
                self.finish(outcome)
            }
            Key::Clear => {
                self.calculator.clear_all();
                None
            }
            Key::Backspace => {
                self.calculator.delete_digit();
                None
            }
            Key::Percent => {
                let calculation = self.calculator.percentage();
                self.record(calculation);
                None
            }
            Key::Square => {
                let outcome = self.calculator.square(&fmt);
                self.finish(outcome)
            }
            Key::SquareRoot => {
                let outcome = self.calculator.square_root(&fmt);
                self.finish(outcome)
            }
            Key::MemoryRecall => self
                .calculator
                .memory_recall()
                .then(|| Notice::success("Memory recalled")),
            Key::MemoryAdd => match self.calculator.memory_add() {
                Ok(true) => {
                    self.dirty.memory = true;
                    Some(Notice::success("Added to memory"))
                }
                Ok(false) => None,
                Err(e) => Some(Notice::error(e.to_string())),
            },
            Key::MemoryClear => {
                self.calculator.memory_clear();
                self.dirty.memory = true;
                Some(Notice::success("Memory cleared"))
            }
        }
    }

    /// Type a whole operand at once. Returns `false` if it is not a number.
    pub fn enter(&mut self, operand: &str) -> bool {
        self.calculator.set_operand(operand)
    }

    /// Expire the error display if its delay has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.calculator.tick(now)
    }

    pub fn error_deadline(&self) -> Option<Instant> {
        self.calculator.error_deadline()
    }

    pub fn search_history(&self, term: &str) -> Vec<(usize, &HistoryEntry)> {
        self.history.search(term)
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats(Local::now())
    }

    /// Load the result of a history entry into the calculator.
    ///
    /// `index` is zero-based; errors report the one-based position.
    pub fn reuse(&mut self, index: usize) -> Result<Notice, HistoryError> {
        let result = self
            .history
            .get(index)
            .map(|entry| entry.result)
            .ok_or(HistoryError::NoSuchEntry(index + 1))?;
        self.calculator.reuse(result);
        Ok(Notice::success("Calculation loaded"))
    }

    pub fn delete_history(&mut self, index: usize) -> Result<Notice, HistoryError> {
        let removed = self
            .history
            .delete(index)
            .ok_or(HistoryError::NoSuchEntry(index + 1))?;
        debug!(expression = %removed.expression, "deleted history entry");
        self.dirty.history = true;
        Ok(Notice::success("Item deleted"))
    }

    /// Clear all history once `confirm` agrees.
    ///
    /// `confirm` receives a dialog title and message and returns whether the
    /// user accepted. Declining leaves the history untouched.
    pub fn clear_history(&mut self, confirm: impl FnOnce(&str, &str) -> bool) -> Option<Notice> {
        let pending = self.history.request_clear();
        if !confirm(CLEAR_HISTORY_TITLE, CLEAR_HISTORY_MESSAGE) {
            return None;
        }
        pending.confirm();
        self.dirty.history = true;
        Some(Notice::success("History cleared"))
    }

    pub fn export_history(&self) -> Result<String, HistoryError> {
        self.history.export()
    }

    /// Flip a boolean preference.
    pub fn toggle(&mut self, toggle: Toggle) -> Option<Notice> {
        let enabled = self.preferences.toggle(toggle);
        self.dirty.preferences = true;

        if toggle == Toggle::AutoSave && enabled {
            self.dirty.history = true;
            return Some(Notice::success("Auto-save enabled"));
        }
        None
    }

    pub fn set_preference(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let auto_save = self.preferences.auto_save;
        self.preferences.set(key, value)?;
        self.dirty.preferences = true;

        if self.history.set_max_len(self.preferences.max_history) > 0 {
            self.dirty.history = true;
        }
        if !auto_save && self.preferences.auto_save {
            self.dirty.history = true;
        }
        Ok(())
    }

    pub fn reset_colors(&mut self) -> Notice {
        self.preferences.reset_colors();
        self.dirty.preferences = true;
        Notice::success("Colors reset to default")
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.dirty.theme = true;
        self.theme
    }

    /// Whether there are changes that [`App::save`] would write.
    pub fn is_dirty(&self) -> bool {
        self.dirty.any()
    }

    /// Write every changed blob to storage.
    ///
    /// History is only written while auto save is enabled.
    pub fn save(&mut self) -> Result<(), StorageError> {
        if self.dirty.history {
            if self.preferences.auto_save {
                storage::save_history(&mut self.storage, self.history.entries())?;
                info!(entries = self.history.len(), "saved history");
            }
            self.dirty.history = false;
        }
        if self.dirty.preferences {
            storage::save_preferences(&mut self.storage, &self.preferences)?;
            self.dirty.preferences = false;
        }
        if self.dirty.memory {
            storage::save_memory(&mut self.storage, self.calculator.memory())?;
            self.dirty.memory = false;
        }
        if self.dirty.theme {
            storage::save_theme(&mut self.storage, self.theme)?;
            self.dirty.theme = false;
        }
        Ok(())
    }

    fn finish(&mut self, outcome: Result<Option<Calculation>, CalcError>) -> Option<Notice> {
        match outcome {
            Ok(calculation) => {
                self.record(calculation);
                None
            }
            Err(e) => {
                debug!(error = %e, "calculation rejected");
                Some(Notice::error(e.to_string()))
            }
        }
    }

    fn record(&mut self, calculation: Option<Calculation>) {
        if let Some(Calculation { expression, result }) = calculation {
            self.history.append(expression, result);
            self.dirty.history = true;
        }
    }
}
