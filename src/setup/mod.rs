//! Setup module for initial application configuration.
//!
//! Handles first-run setup by writing the default config file, and re-runs
//! when the config predates the installed version.

pub mod version;

use anyhow::anyhow;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/rhythm.toml");

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the setup process if the main config file is missing or stale.
///
/// Creates the config directory and writes the default config with a version
/// header.
///
/// # Errors
/// Returns an error if any file operations fail.
pub fn run_setup() -> anyhow::Result<()> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("rhythm");
    std::fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("rhythm.toml");
    let version_header = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let full_config = format!("{}\n{}", version_header, DEFAULT_CONFIG);
    std::fs::write(&config_path, full_config)?;

    tracing::info!("Default configuration written to {}", config_path.display());
    Ok(())
}
