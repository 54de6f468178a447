//! Version comparison and migration logic.
//!
//! Determines whether setup needs to run by comparing the embedded crate
//! version against the `config_version` header of the config file.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A parsed major.minor.patch version.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    /// Parses a version string like "0.1.0".
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();
        let &[major, minor, patch] = parts.as_slice() else {
            return Err(anyhow!(
                "Invalid version format: '{}'. Expected 'major.minor.patch'",
                version_str
            ));
        };

        let field = |name: &str, value: &str| {
            value
                .parse::<u32>()
                .map_err(|_| anyhow!("Invalid {name} version: '{value}'"))
        };

        Ok(SemanticVersion {
            major: field("major", major)?,
            minor: field("minor", minor)?,
            patch: field("patch", patch)?,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Reads the config version from the first line of the config file.
///
/// Expects the first line to match: `config_version = "X.Y.Z"`.
///
/// # Errors
/// Returns an error if the file can't be read.
fn read_config_version_from_file(config_path: &Path) -> anyhow::Result<Option<String>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let first_line = std::fs::read_to_string(config_path).and_then(|content| {
        content
            .lines()
            .next()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "config file is empty")
            })
            .map(|s| s.to_string())
    })?;

    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    if let Some(caps) = regex.captures(&first_line) {
        return Ok(Some(caps[1].to_string()));
    }

    Ok(None)
}

/// Determines if setup is needed by checking version and config file existence.
///
/// Setup is needed if:
/// 1. Config file doesn't exist, OR
/// 2. Config file exists but has no version header (legacy config), OR
/// 3. Config file version is older than current version
///
/// Returns the version the config file was at (None if the file doesn't exist
/// or carries no version).
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<String>> {
    if !config_path.exists() {
        return Ok(Some("none (first run)".to_string()));
    }

    match read_config_version_from_file(config_path)? {
        Some(config_version) => {
            let config_parsed = SemanticVersion::parse(&config_version)?;
            let current_parsed = SemanticVersion::parse(CURRENT_VERSION)?;

            match config_parsed.cmp(&current_parsed) {
                Ordering::Less => Ok(Some(config_version)),
                Ordering::Equal => Ok(None),
                Ordering::Greater => {
                    // Config is newer than the binary; don't block startup
                    tracing::warn!(
                        "Config version {} is newer than app version {}",
                        config_version,
                        CURRENT_VERSION
                    );
                    Ok(None)
                }
            }
        }
        None => Ok(Some("unknown (legacy config)".to_string())),
    }
}

/// Adds or updates the config_version line as the first line of the config file.
///
/// Preserves all other content by removing any existing config_version line
/// and prepending the new one.
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;

    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().starts_with("config_version"))
        .collect();

    let version_line = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let new_content = if lines.is_empty() {
        version_line
    } else {
        format!("{}\n{}", version_line, lines.join("\n"))
    };

    std::fs::write(config_path, new_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_parse() {
        let v = SemanticVersion::parse("0.1.0").unwrap();
        assert_eq!(v.major, 0);
        assert_eq!(v.minor, 1);
        assert_eq!(v.patch, 0);
    }

    #[test]
    fn test_semantic_version_comparison() {
        let v1 = SemanticVersion::parse("0.0.9").unwrap();
        let v2 = SemanticVersion::parse("0.1.0").unwrap();
        let v3 = SemanticVersion::parse("1.0.0").unwrap();

        assert!(v1 < v2);
        assert!(v2 < v3);
        assert_eq!(v1, v1.clone());
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.0.1").is_err());
        assert!(SemanticVersion::parse("invalid").is_err());
    }

    #[test]
    fn test_missing_config_triggers_first_run_setup() {
        let path = Path::new("/nonexistent/rhythm.toml");
        assert_eq!(
            check_setup_needed(path).unwrap(),
            Some("none (first run)".to_string())
        );
    }

    #[test]
    fn test_current_version_needs_no_setup() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("rhythm_version_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            format!("config_version = \"{}\"\n[audio]\n", CURRENT_VERSION),
        )
        .unwrap();

        assert_eq!(check_setup_needed(&path).unwrap(), None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_older_version_triggers_setup() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("rhythm_version_old_{}.toml", std::process::id()));
        std::fs::write(&path, "config_version = \"0.0.1\"\n[audio]\n").unwrap();

        assert_eq!(
            check_setup_needed(&path).unwrap(),
            Some("0.0.1".to_string())
        );
        let _ = std::fs::remove_file(&path);
    }
}
