//! Application command handlers for rhythm.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command.
//!
//! # Commands
//! - `practice`: The main flow: record a script delivery, visualize, play back, submit
//! - `replay`: Replay an archived take through the playback controller
//! - `history`: Feedback history viewer
//! - `setup`: Guided input device and backend selection
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod history;
pub mod list_devices;
pub mod logs;
pub mod practice;
pub mod replay;
pub mod setup;

pub use config::handle_config;
pub use history::handle_history;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use practice::handle_practice;
pub use replay::handle_replay;
pub use setup::handle_setup;
