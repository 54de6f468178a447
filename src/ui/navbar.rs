//! Navigation bar.
//!
//! Two entries, Home and Try, rendered as a tab line. Stateless; the active
//! screen is passed in by the caller.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Tabs},
};

/// The screens the navigation bar can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Landing surface
    Home,
    /// Practice screen
    Practice,
}

impl Screen {
    /// Index of the screen in the tab line.
    fn tab_index(self) -> usize {
        match self {
            Screen::Home => 0,
            Screen::Practice => 1,
        }
    }

    /// The other screen, for Tab-key switching.
    pub fn toggled(self) -> Self {
        match self {
            Screen::Home => Screen::Practice,
            Screen::Practice => Screen::Home,
        }
    }
}

/// Renders the navigation bar into the given area.
pub fn render(frame: &mut Frame, area: Rect, active: Screen) {
    let tabs = Tabs::new(vec!["Home", "Try"])
        .select(active.tab_index())
        .style(Style::default().fg(Color::Rgb(120, 120, 120)))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(255, 255, 255))
                .add_modifier(Modifier::BOLD),
        )
        .divider("·")
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggled_flips_between_screens() {
        assert_eq!(Screen::Home.toggled(), Screen::Practice);
        assert_eq!(Screen::Practice.toggled(), Screen::Home);
    }
}
