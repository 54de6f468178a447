//! Busy indicator shown while a submission is in flight.
//!
//! A centered modal with a spinner and a short message; rendered every frame
//! and advanced on a fixed tick while the request task runs.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::time::{Duration, Instant};

const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const TICK: Duration = Duration::from_millis(120);

const MODAL_FG: Color = Color::Rgb(255, 255, 255);
const MODAL_BG: Color = Color::Rgb(30, 30, 30);

/// Spinner state for the submission overlay.
pub struct SubmitAnimation {
    frame_idx: usize,
    last_tick: Instant,
}

impl SubmitAnimation {
    pub fn new() -> Self {
        Self {
            frame_idx: 0,
            last_tick: Instant::now(),
        }
    }

    /// Advances the spinner if a tick has elapsed.
    pub fn update(&mut self) {
        if self.last_tick.elapsed() >= TICK {
            self.frame_idx = (self.frame_idx + 1) % SPINNER_FRAMES.len();
            self.last_tick = Instant::now();
        }
    }

    /// Draws the busy modal centered in `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let message = format!(
            " {}  Analyzing your delivery… ",
            SPINNER_FRAMES[self.frame_idx]
        );

        let modal_width = (message.len() as u16).saturating_add(2).min(area.width);
        let modal_height = 3;
        let modal_area = Rect {
            x: area.x + (area.width.saturating_sub(modal_width)) / 2,
            y: area.y + (area.height.saturating_sub(modal_height)) / 2,
            width: modal_width,
            height: modal_height.min(area.height),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(MODAL_BG).fg(MODAL_FG));
        frame.render_widget(&block, modal_area);

        let inner = block.inner(modal_area);
        let text = Paragraph::new(message)
            .style(Style::default().bg(MODAL_BG).fg(MODAL_FG))
            .alignment(Alignment::Center);
        frame.render_widget(text, inner);
    }
}

impl Default for SubmitAnimation {
    fn default() -> Self {
        Self::new()
    }
}
