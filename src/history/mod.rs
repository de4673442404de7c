//! Calculation history.
//!
//! An ordered, size-bounded log of past calculations with search, deletion,
//! confirmed bulk clear and text export.

mod entry;
mod export;
mod store;

pub use entry::HistoryEntry;
pub use export::{export_file_name, export_report};
pub use store::{HistoryStats, HistoryStore, PendingClear};
