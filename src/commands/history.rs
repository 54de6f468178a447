//! Feedback history browser.
//!
//! Loads past practice feedback from the database and runs the interactive
//! viewer. Selecting an entry copies the feedback message to the clipboard.

use crate::clipboard::copy_to_clipboard;
use crate::history::{HistoryManager, HistoryViewer};
use crate::session::takes;

/// Shows the feedback history viewer.
///
/// # Errors
/// - If the data directory cannot be determined
/// - If the history database cannot be read
/// - If the viewer UI fails
pub async fn handle_history() -> Result<(), anyhow::Error> {
    tracing::info!("=== rhythm history ===");

    let data_dir = takes::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    let mut manager = HistoryManager::new(&data_dir)?;
    let entries = manager.get_all_feedback()?;

    if entries.is_empty() {
        println!("No feedback yet. Practice a script with 'rhythm' and submit it.");
        return Ok(());
    }

    let mut viewer = HistoryViewer::new(entries)?;
    if let Some(selected) = viewer.run()? {
        if let Err(e) = copy_to_clipboard(&selected) {
            tracing::warn!("Failed to copy feedback to clipboard: {}", e);
        }
    }

    Ok(())
}
