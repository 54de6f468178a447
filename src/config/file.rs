//! Configuration file management for rhythm.
//!
//! Loads and saves the application configuration from a TOML file in the
//! user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture and visualization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio input device. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `rhythm list-devices`
    /// - device name from `rhythm list-devices`
    pub device: String,
    /// Recording sample rate in Hz (the device may override this)
    pub sample_rate: u32,
    /// Reference level in dBFS for 100% on the visualizer (typical: -20 to -6 dBFS)
    #[serde(default = "default_reference_level_db")]
    pub reference_level_db: i8,
    /// Recording auto-stops after this many seconds; playback display is
    /// clamped to the same limit
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
}

fn default_reference_level_db() -> i8 {
    -20
}

fn default_max_duration_secs() -> u64 {
    120
}

/// Inference backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the feedback backend. The submission flow posts to
    /// `{url}/predict`.
    #[serde(default = "default_backend_url")]
    pub url: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmConfig {
    pub audio: AudioConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl RhythmConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: RhythmConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }

    /// Returns default configuration values.
    pub(crate) fn default() -> Self {
        RhythmConfig {
            audio: AudioConfig {
                device: "default".to_string(),
                sample_rate: 44100,
                reference_level_db: default_reference_level_db(),
                max_duration_secs: default_max_duration_secs(),
            },
            backend: BackendConfig::default(),
        }
    }
}

/// Retrieves the path to the config file.
///
/// Assumes the config file exists (created by setup if needed).
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let config_dir = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_path = config_dir.join(".config").join("rhythm").join("rhythm.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RhythmConfig::default();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.max_duration_secs, 120);
        assert_eq!(config.backend.url, "http://localhost:8000");
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let toml_str = r#"
            [audio]
            device = "default"
            sample_rate = 16000
        "#;
        let config: RhythmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.reference_level_db, -20);
        assert_eq!(config.audio.max_duration_secs, 120);
        assert_eq!(config.backend.url, "http://localhost:8000");
    }

    #[test]
    fn test_backend_url_override() {
        let toml_str = r#"
            [audio]
            device = "1"
            sample_rate = 44100

            [backend]
            url = "https://feedback.example.com"
        "#;
        let config: RhythmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.url, "https://feedback.example.com");
    }
}
