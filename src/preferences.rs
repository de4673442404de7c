//! User preferences and theme.
//!
//! Preferences are a flat set of toggles and values persisted as a single
//! JSON object. Missing keys in a saved blob fall back to their defaults.

use crate::calculator::{DecimalPlaces, Formatting};
use crate::error::PreferenceError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PRIMARY_COLOR: &str = "#11998e";
pub const DEFAULT_SECONDARY_COLOR: &str = "#38ef7d";
pub const DEFAULT_BG_COLOR_START: &str = "#0f2027";
pub const DEFAULT_BG_COLOR_END: &str = "#2c5364";
pub const DEFAULT_MAX_HISTORY: usize = 20;

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub show_history: bool,
    pub sound_enabled: bool,
    pub animations_enabled: bool,
    pub decimal_places: DecimalPlaces,
    #[serde(deserialize_with = "history_length")]
    pub max_history: usize,
    pub primary_color: String,
    pub secondary_color: String,
    pub bg_color_start: String,
    pub bg_color_end: String,
    pub thousands_separator: bool,
    pub auto_save: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            show_history: true,
            sound_enabled: false,
            animations_enabled: true,
            decimal_places: DecimalPlaces::Auto,
            max_history: DEFAULT_MAX_HISTORY,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            bg_color_start: DEFAULT_BG_COLOR_START.to_string(),
            bg_color_end: DEFAULT_BG_COLOR_END.to_string(),
            thousands_separator: false,
            auto_save: true,
        }
    }
}

/// Boolean preferences that can be flipped on and off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    ShowHistory,
    Sound,
    Animations,
    ThousandsSeparator,
    AutoSave,
}

impl FromStr for Toggle {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "showHistory" | "history" => Ok(Self::ShowHistory),
            "soundEnabled" | "sound" => Ok(Self::Sound),
            "animationsEnabled" | "animations" => Ok(Self::Animations),
            "thousandsSeparator" | "separator" => Ok(Self::ThousandsSeparator),
            "autoSave" | "autosave" => Ok(Self::AutoSave),
            _ => Err(PreferenceError::UnknownKey(s.to_string())),
        }
    }
}

/// Custom colors applied in the dark theme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub bg_start: String,
    pub bg_end: String,
}

impl Palette {
    /// Gradient used for the display and operator keys.
    pub fn accent_gradient(&self) -> String {
        gradient(&self.primary, &self.secondary)
    }

    /// Gradient used for the page background.
    pub fn background_gradient(&self) -> String {
        gradient(&self.bg_start, &self.bg_end)
    }
}

fn gradient(from: &str, to: &str) -> String {
    format!("linear-gradient(135deg, {} 0%, {} 100%)", from, to)
}

impl Preferences {
    /// The formatting options derived from these preferences.
    pub fn formatting(&self) -> Formatting {
        Formatting {
            decimal_places: self.decimal_places,
            thousands_separator: self.thousands_separator,
        }
    }

    /// Flip a toggle and return its new value.
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        let flag = match toggle {
            Toggle::ShowHistory => &mut self.show_history,
            Toggle::Sound => &mut self.sound_enabled,
            Toggle::Animations => &mut self.animations_enabled,
            Toggle::ThousandsSeparator => &mut self.thousands_separator,
            Toggle::AutoSave => &mut self.auto_save,
        };
        *flag = !*flag;
        *flag
    }

    /// Set a preference from its persisted key name and a text value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let value = value.trim();
        match key {
            "decimalPlaces" => {
                self.decimal_places = value
                    .parse()
                    .map_err(|_| PreferenceError::invalid(key, value))?;
            }
            "maxHistory" => {
                self.max_history = value
                    .parse()
                    .ok()
                    .filter(|&n: &usize| n >= 1)
                    .ok_or_else(|| PreferenceError::invalid(key, value))?;
            }
            "primaryColor" => self.primary_color = parse_color(key, value)?,
            "secondaryColor" => self.secondary_color = parse_color(key, value)?,
            "bgColorStart" => self.bg_color_start = parse_color(key, value)?,
            "bgColorEnd" => self.bg_color_end = parse_color(key, value)?,
            _ => {
                let toggle: Toggle = key.parse()?;
                let wanted = parse_bool(value).ok_or_else(|| PreferenceError::invalid(key, value))?;
                let current = match toggle {
                    Toggle::ShowHistory => self.show_history,
                    Toggle::Sound => self.sound_enabled,
                    Toggle::Animations => self.animations_enabled,
                    Toggle::ThousandsSeparator => self.thousands_separator,
                    Toggle::AutoSave => self.auto_save,
                };
                if current != wanted {
                    self.toggle(toggle);
                }
            }
        }
        Ok(())
    }

    pub fn reset_colors(&mut self) {
        self.primary_color = DEFAULT_PRIMARY_COLOR.to_string();
        self.secondary_color = DEFAULT_SECONDARY_COLOR.to_string();
        self.bg_color_start = DEFAULT_BG_COLOR_START.to_string();
        self.bg_color_end = DEFAULT_BG_COLOR_END.to_string();
    }

    /// Transition duration for the UI, zero when animations are disabled.
    pub fn animation_speed(&self) -> &'static str {
        if self.animations_enabled { "0.3s" } else { "0s" }
    }

    /// Custom colors for the given theme. The light theme uses its built-in styling.
    pub fn palette(&self, theme: Theme) -> Option<Palette> {
        match theme {
            Theme::Light => None,
            Theme::Dark => Some(Palette {
                primary: self.primary_color.clone(),
                secondary: self.secondary_color.clone(),
                bg_start: self.bg_color_start.clone(),
                bg_end: self.bg_color_end.clone(),
            }),
        }
    }
}

/// A stored `maxHistory` must keep at least one entry.
fn history_length<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    match usize::deserialize(deserializer)? {
        0 => Err(de::Error::invalid_value(
            Unexpected::Unsigned(0),
            &"a history length of at least 1",
        )),
        n => Ok(n),
    }
}

fn parse_color(key: &str, value: &str) -> Result<String, PreferenceError> {
    if HEX_COLOR.is_match(value) {
        Ok(value.to_lowercase())
    } else {
        Err(PreferenceError::invalid(key, value))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Label for the theme switch.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dark => "🌙 Dark",
            Self::Light => "☀️ Light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(PreferenceError::invalid("theme", other)),
        }
    }
}
