//! Clipboard utilities for rhythm.
//!
//! Copies feedback text to the system clipboard using pbcopy (macOS),
//! wl-copy (Wayland), or xclip (X11).

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Copies text to the system clipboard.
///
/// Attempts pbcopy first on macOS, wl-copy for Wayland environments, then
/// falls back to xclip for X11. Clipboard unavailability is a warning, not an
/// error, so the surrounding flow always succeeds.
pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if pipe_into("pbcopy", &[], text) {
            return Ok(());
        }
    }

    if pipe_into("wl-copy", &["--type", "text/plain", "--trim-newline"], text) {
        return Ok(());
    }

    if pipe_into("xclip", &["-selection", "clipboard", "-in", "-quiet"], text) {
        return Ok(());
    }

    #[cfg(target_os = "macos")]
    tracing::warn!("No clipboard tool available (pbcopy not found)");
    #[cfg(not(target_os = "macos"))]
    tracing::warn!("No clipboard tool available (wl-copy or xclip not found)");
    Ok(())
}

/// Spawns a clipboard tool and writes `text` to its stdin.
///
/// Returns true when the text was handed off successfully.
fn pipe_into(tool: &str, args: &[&str], text: &str) -> bool {
    let child = Command::new(tool).args(args).stdin(Stdio::piped()).spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(_) => {
            tracing::debug!("{tool} not found or not executable");
            return false;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        match write!(stdin, "{text}") {
            Ok(_) => {
                drop(stdin);
                // Give the tool a moment to take ownership of the selection
                thread::sleep(Duration::from_millis(100));
                tracing::debug!("Feedback copied to clipboard via {tool}");
                return true;
            }
            Err(e) => {
                tracing::warn!("Failed to write to {tool} stdin: {e}");
            }
        }
    }

    false
}
