//! Configuration file support.
//!
//! Loads config from `<config dir>/zcalc/config.toml`. Every key is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::calculator::DEFAULT_ERROR_RESET;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding history, preferences, memory and theme.
    pub data_dir: Option<PathBuf>,

    /// How long the error display lasts after a division by zero, in milliseconds.
    pub error_reset_ms: Option<u64>,
}

impl Config {
    /// Load config from the default location.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from `path`, falling back to defaults if it is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse config");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config");
                Self::default()
            }
        }
    }

    pub fn error_reset(&self) -> Duration {
        self.error_reset_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ERROR_RESET)
    }

    /// The data directory: explicit override, then config file, then the platform default.
    pub fn resolve_data_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(default_data_dir)
    }
}

/// Get the config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zcalc").join("config.toml"))
}

/// Platform data directory, or `./.zcalc` when none is known.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("zcalc"))
        .unwrap_or_else(|| PathBuf::from(".zcalc"))
}
