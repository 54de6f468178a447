//! Practice screen: script entry, live visualizer, playback, submission.
//!
//! Owns the terminal and the per-attempt UI state. The practice command loop
//! feeds it capture data and playback positions each frame and receives user
//! commands back.

use crate::session::Clip;
use crate::ui::busy::SubmitAnimation;
use crate::ui::{landing, navbar};
use crate::ui::navbar::Screen;
use crate::feedback::{self, SubmitError};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// How long a transient status message stays in the footer.
const STATUS_TTL: Duration = Duration::from_secs(4);

/// Seek step for one Ctrl+arrow press, as a fraction of the clip.
pub const SEEK_STEP: f64 = 0.05;

const BG: Color = Color::Rgb(18, 18, 18);
const FG: Color = Color::Rgb(230, 230, 230);
const DIM_FG: Color = Color::Rgb(110, 110, 110);
const ACCENT_FG: Color = Color::Rgb(170, 110, 255);
const RECORD_FG: Color = Color::Rgb(235, 70, 70);

/// User command issued from the practice screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PracticeCommand {
    /// Nothing happened (no key, or key went to the script field)
    Continue,
    /// Start or stop recording (Ctrl+R)
    ToggleRecord,
    /// Start or pause playback of the current clip (Ctrl+P)
    PlayPause,
    /// Seek playback by a signed fraction (Ctrl+Left / Ctrl+Right)
    SeekBy(f64),
    /// Export the clip as recording.wav (Ctrl+S)
    Export,
    /// Submit script and clip (Enter)
    Submit,
    /// Exit the app (Escape / Ctrl+C)
    Quit,
}

/// The in-memory attempt: the script being practiced and the recorded clip.
///
/// Both are cleared together when a submission completes, regardless of
/// outcome.
pub struct PracticeState {
    pub script: Input,
    pub clip: Option<Clip>,
}

impl PracticeState {
    pub fn new() -> Self {
        Self {
            script: Input::default(),
            clip: None,
        }
    }

    /// Checks that the attempt can be submitted.
    pub fn submission_ready(&self) -> Result<(), SubmitError> {
        feedback::validate(self.script.value(), self.clip.as_ref())
    }

    /// Clears script and clip after a submission completes.
    pub fn reset_attempt(&mut self) {
        self.script.reset();
        self.clip = None;
    }
}

impl Default for PracticeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback data for one rendered frame.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackView {
    pub position: Duration,
    pub duration: Duration,
    pub playing: bool,
}

/// Everything the practice screen needs to draw one frame.
pub struct PracticeView<'a> {
    pub recording: bool,
    pub elapsed: Duration,
    pub max_duration: Duration,
    pub bins: &'a [u64],
    pub playback: Option<PlaybackView>,
    pub submitting: bool,
    /// Feedback from the last completed submission, surfaced verbatim
    pub feedback: Option<&'a crate::feedback::PredictResponse>,
}

/// Terminal UI for the practice flow.
pub struct PracticeTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    screen: Screen,
    /// When the landing surface was (last) entered; drives its timed reveal
    home_entered: Instant,
    status: Option<(String, Instant)>,
    spinner: SubmitAnimation,
}

impl PracticeTui {
    /// Creates the TUI and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new(start_screen: Screen) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            screen: start_screen,
            home_entered: Instant::now(),
            status: None,
            spinner: SubmitAnimation::new(),
        })
    }

    /// Current terminal width, used to size the analyzer.
    pub fn width(&self) -> Result<usize> {
        Ok(self.terminal.size()?.width as usize)
    }

    /// Shows a transient status message in the footer.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    /// Processes user input and returns the resulting command.
    ///
    /// Keys that are not commands are fed into the script field (on the
    /// practice screen). The landing surface accepts Enter only once its
    /// call-to-action is visible, matching the timed reveal.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, state: &mut PracticeState) -> Result<PracticeCommand> {
        if !event::poll(Duration::from_millis(50))? {
            return Ok(PracticeCommand::Continue);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(PracticeCommand::Continue);
        };
        if key.kind != event::KeyEventKind::Press {
            return Ok(PracticeCommand::Continue);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            tracing::debug!("Ctrl+C pressed: quitting");
            return Ok(PracticeCommand::Quit);
        }

        match self.screen {
            Screen::Home => Ok(self.handle_landing_key(key.code)),
            Screen::Practice => Ok(self.handle_practice_key(key, ctrl, state)),
        }
    }

    fn handle_landing_key(&mut self, code: KeyCode) -> PracticeCommand {
        match code {
            KeyCode::Enter | KeyCode::Tab
                if landing::cta_visible(self.home_entered.elapsed()) =>
            {
                tracing::debug!("Landing call-to-action accepted");
                self.screen = Screen::Practice;
                PracticeCommand::Continue
            }
            KeyCode::Char('q') | KeyCode::Esc => PracticeCommand::Quit,
            _ => PracticeCommand::Continue,
        }
    }

    fn handle_practice_key(
        &mut self,
        key: event::KeyEvent,
        ctrl: bool,
        state: &mut PracticeState,
    ) -> PracticeCommand {
        match key.code {
            KeyCode::Esc => PracticeCommand::Quit,
            KeyCode::Tab => {
                self.screen = self.screen.toggled();
                self.home_entered = Instant::now();
                PracticeCommand::Continue
            }
            KeyCode::Enter => PracticeCommand::Submit,
            KeyCode::Char('r') if ctrl => PracticeCommand::ToggleRecord,
            KeyCode::Char('p') if ctrl => PracticeCommand::PlayPause,
            KeyCode::Char('s') if ctrl => PracticeCommand::Export,
            KeyCode::Left if ctrl => PracticeCommand::SeekBy(-SEEK_STEP),
            KeyCode::Right if ctrl => PracticeCommand::SeekBy(SEEK_STEP),
            _ => {
                state.script.handle_event(&Event::Key(key));
                PracticeCommand::Continue
            }
        }
    }

    /// Renders one frame.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, state: &PracticeState, view: &PracticeView) -> Result<()> {
        // Expire stale status messages before drawing
        if let Some((_, since)) = &self.status {
            if since.elapsed() >= STATUS_TTL {
                self.status = None;
            }
        }
        if view.submitting {
            self.spinner.update();
        }

        let screen = self.screen;
        let home_elapsed = self.home_entered.elapsed();
        let status = self.status.clone();
        let spinner = &self.spinner;

        self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(Block::default().style(Style::default().bg(BG).fg(FG)), area);

            match screen {
                Screen::Home => landing::render(frame, area, home_elapsed),
                Screen::Practice => {
                    draw_practice(frame, area, state, view, status.as_ref().map(|(m, _)| m.as_str()));
                    if view.submitting {
                        spinner.draw(frame, area);
                    }
                }
            }
        })?;

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

fn draw_practice(
    frame: &mut Frame,
    area: Rect,
    state: &PracticeState,
    view: &PracticeView,
    status: Option<&str>,
) {
    let [navbar_area, script_area, visual_area, status_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    navbar::render(frame, navbar_area, Screen::Practice);

    draw_script_box(frame, script_area, state, view);

    if view.recording {
        draw_spectrum(frame, visual_area, view.bins);
    } else if let Some(playback) = view.playback {
        draw_playback(frame, visual_area, playback);
    } else if let Some(feedback) = view.feedback {
        draw_feedback(frame, visual_area, feedback);
    } else {
        let hint = Paragraph::new("Paste your script above, then hit ctrl+r and deliver it.")
            .style(Style::default().fg(DIM_FG))
            .alignment(Alignment::Center);
        let [_, hint_area, _] = Layout::vertical([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(visual_area);
        frame.render_widget(hint, hint_area);
    }

    if let Some(message) = status {
        let status_line = Paragraph::new(message)
            .style(Style::default().fg(ACCENT_FG))
            .alignment(Alignment::Center);
        frame.render_widget(status_line, status_area);
    }

    draw_footer(frame, footer_area, view);
}

fn draw_script_box(frame: &mut Frame, area: Rect, state: &PracticeState, view: &PracticeView) {
    let inner_width = area.width.saturating_sub(2).max(1);
    let scroll = state.script.visual_scroll(inner_width as usize);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Script ")
        .border_style(Style::default().fg(DIM_FG));
    let input = Paragraph::new(state.script.value())
        .style(Style::default().fg(FG))
        .scroll((0, scroll as u16))
        .block(block);
    frame.render_widget(input, area);

    // Keep the cursor inside the field unless the busy modal owns the screen
    if !view.submitting {
        let cursor_x = state.script.visual_cursor().saturating_sub(scroll) as u16;
        frame.set_cursor_position((area.x + 1 + cursor_x.min(inner_width - 1), area.y + 1));
    }
}

/// Draws one column of blocks per frequency bin, scaled to magnitude.
fn draw_spectrum(frame: &mut Frame, area: Rect, bins: &[u64]) {
    let buf = frame.buffer_mut();
    for (x, &magnitude) in bins.iter().take(area.width as usize).enumerate() {
        let bar_height =
            ((magnitude as f32 / 100.0) * area.height as f32).round() as u16;
        let color = bar_color(magnitude);
        for dy in 0..bar_height.min(area.height) {
            let y = area.y + area.height - 1 - dy;
            buf.set_string(area.x + x as u16, y, "█", Style::default().fg(color));
        }
    }
}

/// Color ramp for one bar: deep red when quiet, brightening toward yellow.
pub fn bar_color(magnitude: u64) -> Color {
    let level = (magnitude.min(100) as f32) * 2.55;
    let red = ((level + 100.0) * 2.0).min(255.0) as u8;
    let green = (250.0 * level / 255.0) as u8;
    Color::Rgb(red, green, 50)
}

/// Draws the playback progress gauge with a position/duration label.
///
/// Shared with the replay command, which drives the same controller over an
/// archived take.
pub fn draw_playback(frame: &mut Frame, area: Rect, playback: PlaybackView) {
    let [_, gauge_area, label_area, _] = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(area);
    let [_, gauge_area, _] = Layout::horizontal([
        Constraint::Percentage(15),
        Constraint::Percentage(70),
        Constraint::Percentage(15),
    ])
    .areas(gauge_area);

    let ratio = if playback.duration.is_zero() {
        0.0
    } else {
        (playback.position.as_secs_f64() / playback.duration.as_secs_f64()).clamp(0.0, 1.0)
    };

    let gauge = Gauge::default()
        .ratio(ratio)
        .use_unicode(true)
        .gauge_style(Style::default().fg(ACCENT_FG).bg(Color::Rgb(40, 40, 40)))
        .label("");
    frame.render_widget(gauge, gauge_area);

    let state_symbol = if playback.playing { "▶" } else { "⏸" };
    let label = Paragraph::new(format!(
        "{} {} / {}",
        state_symbol,
        fmt_duration(playback.position),
        fmt_duration(playback.duration)
    ))
    .style(Style::default().fg(FG))
    .alignment(Alignment::Center);
    frame.render_widget(label, label_area);
}

/// Shows the backend's verdict on the last submitted attempt.
fn draw_feedback(frame: &mut Frame, area: Rect, feedback: &crate::feedback::PredictResponse) {
    let [_, body_area, _] = Layout::horizontal([
        Constraint::Percentage(10),
        Constraint::Percentage(80),
        Constraint::Percentage(10),
    ])
    .areas(area);

    let lines = vec![
        Line::styled("Feedback", Style::default().fg(ACCENT_FG).add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::styled(feedback.message.clone(), Style::default().fg(FG)),
        Line::raw(""),
        Line::styled(format!("“{}”", feedback.script), Style::default().fg(DIM_FG)),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });
    frame.render_widget(body, body_area);
}

fn draw_footer(frame: &mut Frame, area: Rect, view: &PracticeView) {
    let mut spans: Vec<Span> = Vec::new();

    if view.recording {
        spans.push(Span::styled("● ", Style::default().fg(RECORD_FG)));
        spans.push(Span::raw(format!(
            "{} / {}",
            fmt_duration(view.elapsed),
            fmt_duration(view.max_duration)
        )));
        spans.push(Span::styled(
            "   ctrl+r stop · tab home · esc quit",
            Style::default().fg(DIM_FG),
        ));
    } else if view.playback.is_some() {
        spans.push(Span::styled(
            "ctrl+r re-record · ctrl+p play/pause · ctrl+←→ seek · ctrl+s save · ↵ submit",
            Style::default().fg(DIM_FG),
        ));
    } else {
        spans.push(Span::styled(
            "ctrl+r record · ↵ submit · tab home · esc quit",
            Style::default().fg(DIM_FG),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(footer, area);
}

/// Formats a duration as m:ss.
pub fn fmt_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_attempt_clears_script_and_clip() {
        let mut state = PracticeState::new();
        state.script = Input::new("Friends, Romans, countrymen".to_string());
        state.clip = Some(Clip::from_samples(vec![0i16; 160], 16000).unwrap());

        state.reset_attempt();

        assert_eq!(state.script.value(), "");
        assert!(state.clip.is_none());
    }

    #[test]
    fn test_submission_ready_requires_script_and_clip() {
        let mut state = PracticeState::new();
        assert!(state.submission_ready().is_err());

        state.script = Input::new("Friends, Romans, countrymen".to_string());
        assert!(state.submission_ready().is_err());

        state.clip = Some(Clip::from_samples(vec![0i16; 160], 16000).unwrap());
        assert!(state.submission_ready().is_ok());
    }

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(fmt_duration(Duration::from_secs(65)), "1:05");
        assert_eq!(fmt_duration(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn test_bar_color_ramp() {
        // Quiet bars sit at dimmed red, louder bars saturate red and add green
        let quiet = bar_color(0);
        let loud = bar_color(100);
        assert_eq!(quiet, Color::Rgb(200, 0, 50));
        assert_eq!(loud, Color::Rgb(255, 250, 50));
    }
}
