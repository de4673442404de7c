//! Error types for the calculator library.

use thiserror::Error;

/// Failures raised by calculator operations.
///
/// The `Display` text doubles as the user-facing notice.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error("Cannot divide by zero!")]
    DivisionByZero,

    #[error("Cannot calculate square root of negative number!")]
    NegativeSquareRoot,

    #[error("Result is out of range!")]
    Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("No history to export")]
    NothingToExport,

    /// Carries the one-based position as the user sees it.
    #[error("No history entry at position {0}")]
    NoSuchEntry(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("Unknown preference: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl PreferenceError {
    pub(crate) fn invalid(key: &str, value: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
