//! Plain-text export of the calculation history.

use super::HistoryEntry;
use crate::error::HistoryError;
use chrono::NaiveDate;

const TITLE: &str = "Calculator History Export";

/// Render entries as a numbered text report, newest first.
///
/// Fails with [`HistoryError::NothingToExport`] when there are no entries.
pub fn export_report(entries: &[HistoryEntry]) -> Result<String, HistoryError> {
    if entries.is_empty() {
        return Err(HistoryError::NothingToExport);
    }

    let mut report = String::new();
    report.push_str(TITLE);
    report.push('\n');
    report.push_str(&"=".repeat(TITLE.len() - 1));
    report.push_str("\n\n");

    for (index, entry) in entries.iter().enumerate() {
        report.push_str(&format!(
            "{}. {} = {}\n",
            index + 1,
            entry.expression,
            entry.result_text()
        ));
        report.push_str(&format!("   Time: {}\n\n", entry.display_time()));
    }

    Ok(report)
}

/// Default file name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("calculator-history-{}.txt", date.format("%Y-%m-%d"))
}
