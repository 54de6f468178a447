//! Guided device and backend selection.
//!
//! Interactive flow: pick the input device from the enumerated list and
//! confirm the feedback backend URL. Selections are written to the config
//! file.

use crate::config::RhythmConfig;
use cliclack::{input, intro, note, outro, select};
use console::style;
use cpal::traits::{DeviceTrait, HostTrait};

/// Handles input device and backend URL selection.
///
/// Shows all available input devices for the user to choose from, offers the
/// system default as the first option, then prompts for the backend URL
/// (press Enter to keep the current one).
pub async fn handle_setup() -> Result<(), anyhow::Error> {
    tracing::info!("=== rhythm setup ===");

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    println!("\nrhythm\n");

    intro(style(" setup ").on_white().black())?;

    let mut config = RhythmConfig::load().unwrap_or_else(|_| RhythmConfig::default());
    note("current device", &config.audio.device)?;

    // Build the device list: system default first, then every named device
    let host = cpal::default_host();
    let device_names: Vec<String> = host
        .input_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default();

    let mut select_prompt = select("Select audio input device:");
    select_prompt = select_prompt.item(0usize, "System default", "");
    for (i, name) in device_names.iter().enumerate() {
        select_prompt = select_prompt.item(i + 1, name, "");
    }
    let selected_idx: usize = select_prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;

    config.audio.device = if selected_idx == 0 {
        "default".to_string()
    } else {
        device_names[selected_idx - 1].clone()
    };

    let backend_url: String = input("Feedback backend URL:")
        .default_input(&config.backend.url)
        .interact()
        .map_err(|e| anyhow::anyhow!("Input cancelled: {e}"))?;
    config.backend.url = backend_url.trim_end_matches('/').to_string();

    config.save()?;

    tracing::info!(
        "Setup complete: device={}, backend={}",
        config.audio.device,
        config.backend.url
    );
    outro(format!(
        "Recording from '{}', feedback via {}",
        config.audio.device, config.backend.url
    ))?;

    Ok(())
}
