//! Feedback history storage and retrieval using SQLite.
//!
//! Stores the script and backend feedback for every successful submission,
//! and provides querying capabilities for the history viewer.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// One practiced script and the feedback it received.
#[derive(Debug, Clone)]
pub struct FeedbackEntry {
    /// Unique identifier for this entry
    pub id: i64,
    /// The script that was practiced
    pub script: String,
    /// The backend's feedback message
    pub message: String,
    /// When the submission completed
    pub created_at: DateTime<Local>,
}

/// Manages the feedback history database.
pub struct HistoryManager {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl HistoryManager {
    /// Creates a new history manager for the given data directory.
    ///
    /// # Errors
    /// - If the data directory cannot be accessed
    pub fn new(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join("feedback_history.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Initializes database connection and creates tables if necessary.
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let connection = Connection::open(&self.database_path)?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS feedback (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    script TEXT NOT NULL,
                    message TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Saves the feedback for one submission.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If insertion fails
    pub fn save_feedback(&mut self, script: &str, message: &str) -> Result<()> {
        let connection = self.get_connection()?;
        let timestamp = Local::now().to_rfc3339();

        connection.execute(
            "INSERT INTO feedback (script, message, created_at) VALUES (?1, ?2, ?3)",
            params![script, message, timestamp],
        )?;

        tracing::debug!("Feedback saved to history");
        Ok(())
    }

    /// Retrieves all feedback entries ordered by most recent first.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution fails
    /// - If timestamp parsing fails
    pub fn get_all_feedback(&mut self) -> Result<Vec<FeedbackEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, script, message, created_at FROM feedback ORDER BY created_at DESC",
        )?;

        let entries = statement
            .query_map([], |row| {
                let id = row.get::<_, i64>(0)?;
                let script = row.get::<_, String>(1)?;
                let message = row.get::<_, String>(2)?;
                let timestamp_str = row.get::<_, String>(3)?;

                let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(FeedbackEntry {
                    id,
                    script,
                    message,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_manager(tag: &str) -> (PathBuf, HistoryManager) {
        let dir =
            std::env::temp_dir().join(format!("rhythm_history_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let manager = HistoryManager::new(&dir).unwrap();
        (dir, manager)
    }

    #[test]
    fn test_save_and_list() {
        let (dir, mut manager) = temp_manager("save");

        manager
            .save_feedback("Friends, Romans, countrymen", "Strong opening, rushed close.")
            .unwrap();
        manager
            .save_feedback("Lend me your ears", "Project the second phrase.")
            .unwrap();

        let entries = manager.get_all_feedback().unwrap();
        assert_eq!(entries.len(), 2);
        // Most recent first
        assert_eq!(entries[0].script, "Lend me your ears");
        assert_eq!(entries[1].message, "Strong opening, rushed close.");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_history() {
        let (dir, mut manager) = temp_manager("empty");
        assert!(manager.get_all_feedback().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
