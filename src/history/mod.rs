//! Feedback history feature for rhythm.
//!
//! Persists the feedback returned for each successful submission and provides
//! an interactive viewer for browsing past practice attempts.

pub mod storage;
pub mod ui;

pub use storage::{FeedbackEntry, HistoryManager};
pub use ui::HistoryViewer;
