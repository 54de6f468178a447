//! Landing surface.
//!
//! Timed reveal of the product title and cycling marketing taglines, followed
//! by the call-to-action. Pure presentation driven by the time elapsed since
//! the screen was entered.

use ratatui::{prelude::*, widgets::Paragraph};
use std::time::Duration;

/// Rotating marketing taglines.
pub const TAGLINES: [&str; 6] = [
    "Revolutionalize the world",
    "Make each move with confidence",
    "Reach the hearts of people",
    "Boost your confidence",
    "Train your inner speaker",
    "Master Vocal projection",
];

/// Taglines become visible this long after entering the screen.
const TEXT_REVEAL: Duration = Duration::from_millis(3000);
/// The call-to-action appears shortly after the taglines.
const CTA_REVEAL: Duration = Duration::from_millis(3500);
/// Taglines rotate at this interval.
const CYCLE_INTERVAL: Duration = Duration::from_millis(3000);

const TITLE_FG: Color = Color::Rgb(255, 255, 255);
const ACCENT_FG: Color = Color::Rgb(170, 110, 255);
const CTA_FG: Color = Color::Rgb(185, 207, 212);

/// Returns which tagline to show for the given elapsed time.
pub fn tagline_index(elapsed: Duration) -> usize {
    (elapsed.as_millis() / CYCLE_INTERVAL.as_millis()) as usize % TAGLINES.len()
}

/// Returns true once the tagline text has been revealed.
pub fn text_visible(elapsed: Duration) -> bool {
    elapsed >= TEXT_REVEAL
}

/// Returns true once the call-to-action is shown (and Enter is accepted).
pub fn cta_visible(elapsed: Duration) -> bool {
    elapsed >= CTA_REVEAL
}

/// Styles a tagline with its first word accented.
pub fn styled_tagline(tagline: &str) -> Line<'_> {
    match tagline.split_once(' ') {
        Some((first, rest)) => Line::from(vec![
            Span::styled(first, Style::default().fg(ACCENT_FG).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(rest, Style::default().fg(TITLE_FG)),
        ]),
        None => Line::styled(tagline, Style::default().fg(TITLE_FG)),
    }
}

/// Renders the landing surface for the given elapsed time.
pub fn render(frame: &mut Frame, area: Rect, elapsed: Duration) {
    let [_, title_area, tagline_area, _, cta_area, _] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let title = Paragraph::new("R H Y T H M")
        .style(Style::default().fg(TITLE_FG).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, title_area);

    if text_visible(elapsed) {
        let tagline = styled_tagline(TAGLINES[tagline_index(elapsed)]);
        let paragraph = Paragraph::new(tagline).alignment(Alignment::Center);
        frame.render_widget(paragraph, tagline_area);
    }

    if cta_visible(elapsed) {
        let cta = Paragraph::new("press Enter to get started · q to quit")
            .style(Style::default().fg(CTA_FG))
            .alignment(Alignment::Center);
        frame.render_widget(cta, cta_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_order() {
        let early = Duration::from_millis(1000);
        assert!(!text_visible(early));
        assert!(!cta_visible(early));

        let after_text = Duration::from_millis(3200);
        assert!(text_visible(after_text));
        assert!(!cta_visible(after_text));

        let after_cta = Duration::from_millis(3600);
        assert!(text_visible(after_cta));
        assert!(cta_visible(after_cta));
    }

    #[test]
    fn test_tagline_cycles_every_three_seconds() {
        assert_eq!(tagline_index(Duration::from_millis(0)), 0);
        assert_eq!(tagline_index(Duration::from_millis(2999)), 0);
        assert_eq!(tagline_index(Duration::from_millis(3000)), 1);
        // Wraps around after the last tagline
        assert_eq!(
            tagline_index(Duration::from_millis(3000 * TAGLINES.len() as u64)),
            0
        );
    }

    #[test]
    fn test_styled_tagline_accents_first_word() {
        let line = styled_tagline("Train your inner speaker");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[0].content, "Train");
        assert_eq!(line.spans[2].content, "your inner speaker");
    }
}
