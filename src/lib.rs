//! Arithmetic calculator with persistent history, memory and preferences.
//!
//! The [`calculator`] engine turns key presses into `(expression, result)`
//! pairs, the [`history`] store keeps a bounded log of them, and [`App`]
//! ties both to [`preferences`] and a [`storage`] backend.

pub mod app;
pub mod calculator;
pub mod config;
pub mod error;
pub mod history;
pub mod preferences;
pub mod storage;

pub use app::{App, Notice, NoticeLevel};
pub use error::{CalcError, HistoryError, PreferenceError, StorageError};
