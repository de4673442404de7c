//! A single recorded calculation.

use crate::calculator::format_number;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The expression as typed, e.g. `5 + 3` or `√9`.
    pub expression: String,
    pub result: f64,
    /// When the calculation was made. Stored as RFC 3339.
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: f64) -> Self {
        Self::at(expression, result, Utc::now())
    }

    pub fn at(expression: impl Into<String>, result: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            expression: expression.into(),
            result,
            timestamp,
        }
    }

    /// The result in its natural string form.
    pub fn result_text(&self) -> String {
        format_number(self.result)
    }

    /// The timestamp in local time, for display.
    pub fn display_time(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Case-insensitive match against the expression or the result text.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.expression.to_lowercase().contains(needle) || self.result_text().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let timestamp = DateTime::parse_from_rfc3339("2024-03-01T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = HistoryEntry::at("5 + 3", 8.0, timestamp);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["expression"], "5 + 3");
        assert_eq!(json["result"], 8.0);
        assert_eq!(json["timestamp"], "2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_extra_fields_ignored() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"expression":"√9","result":3,
                "timestamp":"2024-03-01T12:30:00.000Z","displayTime":"3/1/2024"}"#,
        )
        .unwrap();
        assert_eq!(entry.expression, "√9");
        assert_eq!(entry.result_text(), "3");
    }

    #[test]
    fn test_matches() {
        let entry = HistoryEntry::new("Sqrt 16", 4.0);
        assert!(entry.matches("sqrt"));
        assert!(entry.matches("4"));
        assert!(!entry.matches("5"));
    }
}
