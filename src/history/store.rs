//! Bounded, newest-first log of calculations.

use super::HistoryEntry;
use super::export::export_report;
use crate::error::HistoryError;
use chrono::{DateTime, Local};
use tracing::debug;

/// Counts shown next to the history list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    /// Entries made on the same local calendar day as `now`.
    pub today: usize,
}

#[derive(Clone, Debug)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    max_len: usize,
}

impl HistoryStore {
    pub fn new(max_len: usize) -> Self {
        Self::from_entries(Vec::new(), max_len)
    }

    /// Restore a saved list, trimming it to `max_len`.
    pub fn from_entries(mut entries: Vec<HistoryEntry>, max_len: usize) -> Self {
        entries.truncate(max_len);
        Self { entries, max_len }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Record a calculation made now.
    pub fn append(&mut self, expression: impl Into<String>, result: f64) {
        self.push(HistoryEntry::new(expression, result));
    }

    /// Insert an entry at the head and drop the oldest beyond the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        debug!(expression = %entry.expression, "history append");
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_len);
    }

    /// Change the limit, dropping the oldest entries if it shrank.
    ///
    /// Returns how many entries were removed.
    pub fn set_max_len(&mut self, max_len: usize) -> usize {
        self.max_len = max_len;
        let before = self.entries.len();
        self.entries.truncate(max_len);
        before - self.entries.len()
    }

    /// Entries whose expression or result contains `term`, ignoring case.
    ///
    /// Each match carries its index in the store so it can be deleted or
    /// reused. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<(usize, &HistoryEntry)> {
        let needle = term.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| needle.is_empty() || entry.matches(&needle))
            .collect()
    }

    /// Remove one entry. Out-of-range indices remove nothing.
    pub fn delete(&mut self, index: usize) -> Option<HistoryEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Begin clearing the whole history.
    ///
    /// Nothing is removed until [`PendingClear::confirm`] is called; dropping
    /// the guard cancels the request.
    pub fn request_clear(&mut self) -> PendingClear<'_> {
        PendingClear { store: self }
    }

    /// Render every entry as a text report.
    pub fn export(&self) -> Result<String, HistoryError> {
        export_report(&self.entries)
    }

    pub fn stats(&self, now: DateTime<Local>) -> HistoryStats {
        let today = now.date_naive();
        HistoryStats {
            total: self.entries.len(),
            today: self
                .entries
                .iter()
                .filter(|entry| entry.timestamp.with_timezone(&Local).date_naive() == today)
                .count(),
        }
    }
}

/// A clear request awaiting confirmation.
#[must_use = "the history is only cleared once the request is confirmed"]
pub struct PendingClear<'a> {
    store: &'a mut HistoryStore,
}

impl PendingClear<'_> {
    /// Number of entries that would be removed.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove every entry. Returns how many were removed.
    pub fn confirm(self) -> usize {
        let removed = self.store.entries.len();
        self.store.entries.clear();
        debug!(removed, "history cleared");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn store_with(expressions: &[(&str, f64)]) -> HistoryStore {
        let mut store = HistoryStore::new(20);
        for (expression, result) in expressions {
            store.append(*expression, *result);
        }
        store
    }

    #[test]
    fn test_append_newest_first() {
        let store = store_with(&[("5 + 3", 8.0), ("√9", 3.0)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].expression, "√9");
        assert_eq!(store.entries()[1].expression, "5 + 3");
    }

    #[test]
    fn test_append_trims_oldest() {
        let mut store = HistoryStore::new(2);
        store.append("1 + 1", 2.0);
        store.append("2 + 2", 4.0);
        store.append("3 + 3", 6.0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[1].expression, "2 + 2");
    }

    #[test]
    fn test_shrinking_limit_trims() {
        let mut store = store_with(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        assert_eq!(store.set_max_len(1), 2);
        assert_eq!(store.entries()[0].expression, "c");
        assert_eq!(store.set_max_len(10), 0);
    }

    #[test]
    fn test_search() {
        let store = store_with(&[("5 + 3", 8.0), ("10 × 12", 120.0), ("√9", 3.0)]);

        let hits = store.search("12");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 1);

        // Matches on the result text, not just the expression.
        let hits = store.search("8");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.expression, "5 + 3");

        assert!(store.search("nothing").is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_search_ignores_case() {
        let store = store_with(&[("Total", 1.0)]);
        assert_eq!(store.search("TOTAL").len(), 1);
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let store = store_with(&[("5 + 3", 8.0), ("√9", 3.0)]);
        let all: Vec<usize> = store.search("").into_iter().map(|(i, _)| i).collect();
        assert_eq!(all, vec![0, 1]);
    }

    #[test]
    fn test_delete() {
        let mut store = store_with(&[("5 + 3", 8.0), ("√9", 3.0)]);
        let removed = store.delete(0).unwrap();
        assert_eq!(removed.expression, "√9");
        assert!(store.delete(5).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut store = store_with(&[("5 + 3", 8.0), ("√9", 3.0)]);

        {
            let pending = store.request_clear();
            assert_eq!(pending.len(), 2);
        }
        assert_eq!(store.len(), 2);

        assert_eq!(store.request_clear().confirm(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_export_empty_fails() {
        let store = HistoryStore::new(5);
        assert_eq!(store.export(), Err(HistoryError::NothingToExport));
    }

    #[test]
    fn test_stats_counts_today() {
        let now = Local::now();
        let mut store = HistoryStore::new(10);
        store.push(HistoryEntry::at("old", 1.0, Utc::now() - Duration::days(3)));
        store.push(HistoryEntry::at("new", 2.0, now.with_timezone(&Utc)));

        let stats = store.stats(now);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.today, 1);
    }

    #[test]
    fn test_restore_trims() {
        let entries = (0..5).map(|i| HistoryEntry::new(i.to_string(), 0.0)).collect();
        let store = HistoryStore::from_entries(entries, 3);
        assert_eq!(store.len(), 3);
        assert_eq!(store.entries()[0].expression, "0");
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_limit(max_len in 0usize..30, appends in 0usize..80) {
            let mut store = HistoryStore::new(max_len);
            for i in 0..appends {
                store.append(format!("{} + 1", i), i as f64 + 1.0);
                prop_assert!(store.len() <= max_len);
            }
            prop_assert_eq!(store.len(), appends.min(max_len));
        }
    }
}
