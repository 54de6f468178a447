//! Archive of recent takes for replay.
//!
//! Each finalized, non-empty clip is also written to the data directory with
//! JSON metadata so it can be replayed later. Only the 10 most recent takes
//! are kept.

use crate::session::Clip;
use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of archived takes.
const MAX_TAKES: usize = 10;

/// Metadata about an archived take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeMetadata {
    /// Unique identifier for this take
    pub id: String,
    /// Path to the WAV file
    pub audio_path: PathBuf,
    /// Recorded duration in seconds
    pub duration_secs: f64,
    /// Timestamp when the take was recorded
    pub created_at: DateTime<Local>,
}

/// Manages the on-disk archive of recent takes.
pub struct TakeArchive {
    takes_dir: PathBuf,
}

impl TakeArchive {
    /// Creates a take archive rooted in the given data directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let takes_dir = data_dir.join("takes");
        fs::create_dir_all(&takes_dir)?;
        Ok(Self { takes_dir })
    }

    /// Archives a clip, evicting the oldest take once the archive is full.
    ///
    /// Returns the id of the stored take.
    pub fn save(&self, clip: &Clip) -> Result<String> {
        self.evict_oldest()?;

        let now = Local::now();
        let take_id = now.timestamp_millis().to_string();
        let audio_path = self.takes_dir.join(format!("{take_id}.wav"));
        clip.save(&audio_path)?;

        let metadata = TakeMetadata {
            id: take_id.clone(),
            audio_path,
            duration_secs: clip.duration().as_secs_f64(),
            created_at: now,
        };
        let metadata_path = self.takes_dir.join(format!("{take_id}.json"));
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(metadata_path, json)?;
        tracing::info!("Take archived with ID: {}", take_id);

        Ok(take_id)
    }

    /// Returns all archived takes, newest first.
    pub fn all(&self) -> Result<Vec<TakeMetadata>> {
        let mut takes: Vec<TakeMetadata> = fs::read_dir(&self.takes_dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().map(|ext| ext == "json").unwrap_or(false) {
                    let content = fs::read_to_string(&path).ok()?;
                    serde_json::from_str(&content).ok()
                } else {
                    None
                }
            })
            .collect();

        takes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(takes)
    }

    /// Returns the take at `index`, where 1 is the most recent.
    pub fn get(&self, index: usize) -> Result<TakeMetadata> {
        let takes = self.all()?;
        if takes.is_empty() {
            return Err(anyhow::anyhow!("No takes found in archive"));
        }
        if index < 1 || index > takes.len() {
            return Err(anyhow::anyhow!(
                "Take index out of range. Available takes: 1-{}",
                takes.len()
            ));
        }
        Ok(takes[index - 1].clone())
    }

    /// Removes the oldest take while the archive is at capacity.
    fn evict_oldest(&self) -> Result<()> {
        let takes = self.all()?;
        if takes.len() < MAX_TAKES {
            return Ok(());
        }

        // `all` returns newest first; everything past the limit goes
        for take in takes.iter().skip(MAX_TAKES - 1) {
            if take.audio_path.exists() {
                if let Err(e) = fs::remove_file(&take.audio_path) {
                    tracing::warn!("Failed to delete old take audio: {}", e);
                }
            }
            let metadata_path = self.takes_dir.join(format!("{}.json", take.id));
            if let Err(e) = fs::remove_file(&metadata_path) {
                tracing::warn!("Failed to delete old take metadata: {}", e);
            } else {
                tracing::info!("Evicted old take {}", take.id);
            }
        }

        Ok(())
    }
}

/// Returns the rhythm data directory (`~/.local/share/rhythm`).
pub fn data_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("rhythm");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_archive(tag: &str) -> (PathBuf, TakeArchive) {
        let dir = std::env::temp_dir().join(format!("rhythm_takes_{tag}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let archive = TakeArchive::new(&dir).unwrap();
        (dir, archive)
    }

    #[test]
    fn test_save_and_get() {
        let (dir, archive) = temp_archive("save");
        let clip = Clip::from_samples(vec![0i16; 1600], 16000).unwrap();

        let id = archive.save(&clip).unwrap();
        let take = archive.get(1).unwrap();
        assert_eq!(take.id, id);
        assert!(take.audio_path.exists());
        assert!((take.duration_secs - 0.1).abs() < 1e-9);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_get_out_of_range() {
        let (dir, archive) = temp_archive("range");
        assert!(archive.get(1).is_err());

        let clip = Clip::from_samples(vec![0i16; 16], 16000).unwrap();
        archive.save(&clip).unwrap();
        assert!(archive.get(0).is_err());
        assert!(archive.get(2).is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
