//! Configuration management for rhythm.
//!
//! Handles loading and saving application configuration from TOML files.
//! Configuration lives in the user's config directory under
//! `~/.config/rhythm/rhythm.toml`.

pub mod file;

pub use file::{AudioConfig, BackendConfig, RhythmConfig};
