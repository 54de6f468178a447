//! The practice flow: record, visualize, play back, submit.
//!
//! Drives the practice TUI over a recording session, the spectrum analyzer,
//! the playback controller, and the submission task. Supports an external
//! stop trigger via SIGUSR1.

use crate::config;
use crate::feedback::{self, PredictResponse, SubmitError};
use crate::history::HistoryManager;
use crate::session::clip::EXPORT_FILE_NAME;
use crate::session::takes::{self, TakeArchive};
use crate::session::{PlaybackController, RecordingSession, SpectrumAnalyzer};
use crate::ui::navbar::Screen;
use crate::ui::practice::{PlaybackView, PracticeView};
use crate::ui::{ErrorScreen, PracticeCommand, PracticeState, PracticeTui};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs the practice flow.
///
/// Opens on the landing surface unless `skip_intro` is set, then enters the
/// practice screen loop until the user quits.
pub async fn handle_practice(skip_intro: bool) -> Result<(), anyhow::Error> {
    tracing::info!("=== rhythm practice started ===");

    let config_data = match config::RhythmConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/rhythm/rhythm.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, reference_level={}dBFS, max_duration={}s, backend={}",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.audio.reference_level_db,
        config_data.audio.max_duration_secs,
        config_data.backend.url
    );

    let max_duration = Duration::from_secs(config_data.audio.max_duration_secs);

    let archive = match takes::data_dir().and_then(|dir| TakeArchive::new(&dir)) {
        Ok(archive) => Some(archive),
        Err(e) => {
            tracing::warn!("Take archive unavailable: {}", e);
            None
        }
    };

    let start_screen = if skip_intro {
        Screen::Practice
    } else {
        Screen::Home
    };
    let mut tui = PracticeTui::new(start_screen)
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let mut state = PracticeState::new();
    let mut analyzer = SpectrumAnalyzer::new(tui.width().unwrap_or(80));
    let mut session: Option<RecordingSession> = None;
    let mut playback: Option<PlaybackController> = None;
    let mut submit_task: Option<JoinHandle<Result<PredictResponse, SubmitError>>> = None;
    let mut submitted_script: Option<String> = None;
    let mut last_feedback: Option<PredictResponse> = None;

    // SIGUSR1 stops an active recording, for window-manager integrations
    let external_stop = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, external_stop.clone())
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let run_result: Result<(), anyhow::Error> = loop {
        // External stop trigger and the maximum-duration guard both end the
        // session the same way the user stopping it would
        let guard_tripped = session.as_ref().is_some_and(|s| s.limit_reached());
        if external_stop.swap(false, std::sync::atomic::Ordering::Relaxed) || guard_tripped {
            if let Some(active) = session.take() {
                if guard_tripped {
                    tracing::info!("Maximum recording duration reached, stopping");
                } else {
                    tracing::info!("Received SIGUSR1: stopping recording");
                }
                finalize_session(active, &mut state, archive.as_ref(), &mut analyzer, &mut tui);
                if guard_tripped {
                    tui.set_status("Maximum duration reached, take finalized.");
                }
            }
        }

        // Track terminal resizes for the analyzer
        if let Ok(width) = tui.width() {
            if width != analyzer.bins().len() {
                analyzer.resize(width);
            }
        }

        // Submission completion: clear the busy indicator and the attempt,
        // success or failure
        if submit_task.as_ref().is_some_and(|h| h.is_finished()) {
            let handle = submit_task.take().unwrap();
            let script = submitted_script.take().unwrap_or_default();
            match handle.await {
                Ok(Ok(response)) => {
                    tracing::info!("Submission succeeded");
                    record_feedback(&script, &response);
                    tui.set_status("Feedback received.");
                    last_feedback = Some(response);
                }
                Ok(Err(e)) => {
                    tracing::error!("Submission failed: {}", e);
                    tui.set_status(format!("Submission failed: {e}"));
                }
                Err(e) => {
                    tracing::error!("Submission task panicked: {}", e);
                    tui.set_status("Submission failed, see logs.");
                }
            }
            state.reset_attempt();
            playback = None;
        }

        // Input is ignored while the busy indicator owns the screen
        let command = if submit_task.is_some() {
            PracticeCommand::Continue
        } else {
            match tui.handle_input(&mut state) {
                Ok(command) => command,
                Err(e) => break Err(anyhow::anyhow!("Input handling error: {e}")),
            }
        };

        match command {
            PracticeCommand::Continue => {}
            PracticeCommand::Quit => break Ok(()),
            PracticeCommand::ToggleRecord => {
                if let Some(active) = session.take() {
                    finalize_session(active, &mut state, archive.as_ref(), &mut analyzer, &mut tui);
                } else {
                    // Recording and playback are mutually exclusive by convention
                    playback = None;
                    last_feedback = None;
                    let mut new_session = RecordingSession::new(
                        config_data.audio.sample_rate,
                        config_data.audio.device.clone(),
                        max_duration,
                    );
                    match new_session.start() {
                        Ok(()) => session = Some(new_session),
                        Err(e) => {
                            tracing::error!("Failed to start recording: {}", e);
                            tui.set_status(format!("{e}"));
                        }
                    }
                }
            }
            PracticeCommand::PlayPause => {
                if session.is_some() {
                    tui.set_status("Stop recording before playback.");
                } else if let Some(player) = playback.as_mut() {
                    if player.is_playing() {
                        player.pause();
                    } else {
                        player.play();
                    }
                } else if let Some(clip) = state.clip.as_ref() {
                    match PlaybackController::new(clip, max_duration) {
                        Ok(mut player) => {
                            player.play();
                            playback = Some(player);
                        }
                        Err(e) => {
                            tracing::error!("Playback unavailable: {}", e);
                            tui.set_status(format!("Playback unavailable: {e}"));
                        }
                    }
                } else {
                    tui.set_status("Record a take first.");
                }
            }
            PracticeCommand::SeekBy(delta) => {
                if let Some(player) = playback.as_mut() {
                    let duration = player.display_duration().as_secs_f64();
                    let current = if duration > 0.0 {
                        player.position().as_secs_f64() / duration
                    } else {
                        0.0
                    };
                    player.seek(current + delta);
                }
            }
            PracticeCommand::Export => match state.clip.as_ref() {
                Some(clip) => {
                    if let Err(e) = clip.save(Path::new(EXPORT_FILE_NAME)) {
                        tracing::error!("Export failed: {}", e);
                        tui.set_status(format!("Export failed: {e}"));
                    } else {
                        tui.set_status(format!("Saved {EXPORT_FILE_NAME}"));
                    }
                }
                None => tui.set_status("Nothing to export yet."),
            },
            PracticeCommand::Submit => {
                if session.is_some() {
                    tui.set_status("Stop recording before submitting.");
                } else if let Err(e) = state.submission_ready() {
                    // Validation failure: no network call happens
                    tui.set_status(format!("{e}"));
                } else {
                    playback = None;
                    last_feedback = None;
                    let script = state.script.value().to_string();
                    let wav = state
                        .clip
                        .as_ref()
                        .map(|clip| clip.wav_bytes().to_vec())
                        .unwrap_or_default();
                    let base_url = config_data.backend.url.clone();

                    tracing::info!(
                        "Submitting attempt: {} script chars, {} audio bytes",
                        script.len(),
                        wav.len()
                    );
                    submitted_script = Some(script.clone());
                    submit_task = Some(tokio::spawn(async move {
                        feedback::submit(&base_url, script, wav).await
                    }));
                }
            }
        }

        // Per-frame analysis while the session is live
        if let Some(active) = session.as_ref() {
            analyzer.update(
                &active.samples(),
                active.sample_rate(),
                config_data.audio.reference_level_db,
            );
        }

        let playback_view = playback.as_mut().map(|player| PlaybackView {
            position: player.poll_position(),
            duration: player.display_duration(),
            playing: player.is_playing(),
        });
        let view = PracticeView {
            recording: session.is_some(),
            elapsed: session.as_ref().map(|s| s.elapsed()).unwrap_or_default(),
            max_duration,
            bins: analyzer.bins(),
            playback: playback_view,
            submitting: submit_task.is_some(),
            feedback: last_feedback.as_ref(),
        };
        if let Err(e) = tui.render(&state, &view) {
            break Err(anyhow::anyhow!("Render failed: {e}"));
        }
    };

    // Teardown releases the capture stream, the playback stream, and any
    // in-flight submission task
    if let Some(handle) = submit_task.take() {
        handle.abort();
    }
    drop(session);
    drop(playback);

    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    tracing::info!("=== rhythm practice exited ===");
    run_result
}

/// Ends a session: finalizes the clip, archives it, and resets the analyzer.
fn finalize_session(
    session: RecordingSession,
    state: &mut PracticeState,
    archive: Option<&TakeArchive>,
    analyzer: &mut SpectrumAnalyzer,
    tui: &mut PracticeTui,
) {
    match session.finish() {
        Ok(clip) => {
            if !clip.is_empty() {
                if let Some(archive) = archive {
                    if let Err(e) = archive.save(&clip) {
                        tracing::warn!("Failed to archive take: {}", e);
                    }
                }
                tui.set_status("Take ready. ctrl+p plays it back.");
            } else {
                tui.set_status("Take finalized (no audio captured).");
            }
            state.clip = Some(clip);
        }
        Err(e) => {
            tracing::error!("Failed to finalize recording: {}", e);
            tui.set_status(format!("Failed to finalize recording: {e}"));
        }
    }
    analyzer.reset();
}

/// Stores the feedback for a successful submission in the history database.
fn record_feedback(script: &str, response: &PredictResponse) {
    let result = takes::data_dir().and_then(|dir| {
        std::fs::create_dir_all(&dir)?;
        let mut history = HistoryManager::new(&dir)?;
        history.save_feedback(script, &response.message)
    });
    if let Err(e) = result {
        tracing::warn!("Failed to save feedback to history: {}", e);
    }
}
