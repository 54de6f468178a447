//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use dirs;
use std::io;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// This is called early in the startup sequence, before command handling.
/// It checks:
/// 1. If the config file doesn't exist, writes the default config
/// 2. If the config version is older than the app version, re-writes it and logs the migration
/// 3. If the config version matches the app version, does nothing
async fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("rhythm")
        .join("rhythm.toml");

    match crate::setup::version::check_setup_needed(&config_path)? {
        Some(old_version) => {
            tracing::info!(
                "Setup needed - migrating from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
            crate::setup::run_setup().map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
            crate::setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Setup completed successfully - migrated to version {}",
                env!("CARGO_PKG_VERSION")
            );
        }
        None => {
            tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// A terminal speech trainer with real-time spectrum visualization
#[derive(Parser)]
#[command(name = "rhythm")]
#[command(version)]
#[command(about = "rhythm: train your inner speaker")]
#[command(
    long_about = "rhythm: train your inner speaker\n\nPaste a script, record yourself delivering it with a live frequency\nvisualizer, replay and export the take, and submit script plus audio to an\ninference backend for feedback on your delivery.\n\nDEFAULT COMMAND:\n    If no command is specified, 'practice' is used by default.\n    The practice option (-s) can be used without explicitly saying 'practice'.\n\nEXAMPLES:\n    # Open the practice screen (with the landing intro)\n    $ rhythm\n    \n    # Skip the intro and go straight to practicing\n    $ rhythm -s\n    $ rhythm practice --skip-intro\n    \n    # Replay your most recent take\n    $ rhythm replay\n    \n    # Replay take #2\n    $ rhythm replay 2\n    \n    # Browse past feedback\n    $ rhythm history\n    \n    # Pick an input device and backend\n    $ rhythm setup\n    \n    # Edit configuration file\n    $ rhythm config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/rhythm/rhythm.toml\n    Takes and history:  ~/.local/share/rhythm/\n    Logs:               ~/.local/state/rhythm/rhythm.log.*"
)]
struct Cli {
    /// Skip the landing intro and open the practice screen directly (practice default command)
    #[arg(short, long, global = true)]
    skip_intro: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Practice a script with recording and live visualization (default)
    ///
    /// Paste a script, press Ctrl+R to record with the frequency visualizer,
    /// Ctrl+P to play the take back, Ctrl+S to export recording.wav, and
    /// Enter to submit script plus audio for feedback.
    #[command(visible_alias = "p")]
    Practice {
        /// Skip the landing intro and open the practice screen directly
        #[arg(short, long)]
        skip_intro: bool,
    },

    /// Replay a previous take
    ///
    /// Plays an archived take with a progress gauge. Space pauses, arrow keys
    /// seek, q exits.
    #[command(visible_alias = "rp")]
    Replay {
        /// Take index (1 = most recent, 2 = second most recent, etc.)
        #[arg(value_name = "N")]
        index: Option<usize>,
    },

    /// View and browse feedback history
    ///
    /// Browse feedback from previous submissions, select one to copy to
    /// clipboard. Use arrow keys to navigate, Enter to copy, Esc to exit.
    #[command(visible_alias = "h")]
    History,

    /// Select the audio input device and feedback backend
    ///
    /// Guided selection over the enumerated input devices plus the backend
    /// URL; selections are written to the config file.
    Setup,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio settings, the backend URL, and other configuration.
    /// Uses $EDITOR environment variable or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in rhythm.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   rhythm completions bash > rhythm.bash
    ///   rhythm completions zsh > _rhythm
    ///   rhythm completions fish > rhythm.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "rhythm", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Check if setup is needed (version check or missing config)
    check_and_run_setup().await?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Practice { .. }) => {
            // Default command is practice
            // Merge the top-level option with the explicit practice command option
            let skip_intro = match cli.command {
                Some(Commands::Practice { skip_intro }) => skip_intro,
                None => cli.skip_intro,
                _ => unreachable!(),
            };
            commands::handle_practice(skip_intro).await?;
        }
        Some(Commands::Replay { index }) => {
            commands::handle_replay(index).await?;
        }
        Some(Commands::History) => {
            commands::handle_history().await?;
        }
        Some(Commands::Setup) => {
            if let Err(e) = commands::handle_setup().await {
                // Check if it's a cancellation error (cliclack already displayed the message)
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
