//! Replay an archived take.
//!
//! Loads a previous take from the archive and drives the playback controller
//! over it with a progress gauge and seek keys.

use crate::config;
use crate::session::takes::{self, TakeArchive};
use crate::session::{Clip, PlaybackController};
use crate::ui::practice::{self, PlaybackView, SEEK_STEP};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::io::stdout;
use std::time::Duration;

/// Plays back a previous take through the playback controller.
///
/// # Arguments
/// * `take_index` - Optional index of the take to play (1 = most recent)
pub async fn handle_replay(take_index: Option<usize>) -> Result<(), anyhow::Error> {
    tracing::info!("=== rhythm replay ===");

    let archive = TakeArchive::new(&takes::data_dir()?)?;
    let take = archive.get(take_index.unwrap_or(1))?;

    if !take.audio_path.exists() {
        return Err(anyhow::anyhow!(
            "Audio file not found: {}",
            take.audio_path.display()
        ));
    }

    tracing::info!(
        "Replaying take {} from {}",
        take.id,
        take.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    let clip = load_take(&take.audio_path)?;

    // Display clamping uses the configured limit; defaults when unconfigured
    let max_duration = config::RhythmConfig::load()
        .map(|c| Duration::from_secs(c.audio.max_duration_secs))
        .unwrap_or(Duration::from_secs(120));

    let mut player = PlaybackController::new(&clip, max_duration)?;
    player.play();

    run_replay_ui(&mut player)?;

    tracing::info!("Replay finished for take {}", take.id);
    Ok(())
}

/// Decodes an archived WAV back into a clip.
fn load_take(path: &std::path::Path) -> Result<Clip> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open take: {e}"))?;
    let sample_rate = reader.spec().sample_rate;
    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to decode take: {e}"))?;

    Clip::from_samples(samples, sample_rate)
}

/// Minimal progress UI: gauge, position label, and seek/pause keys.
fn run_replay_ui(player: &mut PlaybackController) -> Result<()> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let result = replay_loop(&mut terminal, player);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn replay_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    player: &mut PlaybackController,
) -> Result<()> {
    loop {
        let view = PlaybackView {
            position: player.poll_position(),
            duration: player.display_duration(),
            playing: player.is_playing(),
        };
        let done = !view.playing && player.finished();

        terminal.draw(|frame| {
            let area = frame.area();
            practice::draw_playback(frame, area, view);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            let footer = Paragraph::new("space play/pause · ←/→ seek · q quit")
                .style(Style::default().fg(Color::Rgb(110, 110, 110)))
                .alignment(Alignment::Center);
            frame.render_widget(footer, footer_area);
        })?;

        if done {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        player.stop();
                        break;
                    }
                    KeyCode::Char(' ') => {
                        if player.is_playing() {
                            player.pause();
                        } else {
                            player.play();
                        }
                    }
                    KeyCode::Left | KeyCode::Right => {
                        let duration = player.display_duration().as_secs_f64();
                        let current = if duration > 0.0 {
                            player.position().as_secs_f64() / duration
                        } else {
                            0.0
                        };
                        let step = if key.code == KeyCode::Left {
                            -SEEK_STEP
                        } else {
                            SEEK_STEP
                        };
                        player.seek(current + step);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}
