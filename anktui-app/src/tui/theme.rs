use anktui_core::Rating;
use ratatui::style::Stylize;
use ratatui::style::{Color, Style};

/// Styles for one colour scheme. `mono` sticks to bold/reversed for terminals without colour.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub title: Style,
    pub hint: Style,
    pub selected: Style,
    pub footer: Style,
    pub error: Style,
    pub ratings: [Style; 4],
}

impl Theme {
    pub fn by_name(name: &str) -> Self {
        match name {
            "mono" => Self::mono(),
            _ => Self::default_colors(),
        }
    }

    fn default_colors() -> Self {
        Self {
            title: Style::default().fg(Color::Cyan).bold(),
            hint: Style::default().fg(Color::DarkGray),
            selected: Style::default().fg(Color::Yellow).bold(),
            footer: Style::default().fg(Color::Gray),
            error: Style::default().fg(Color::Red).bold(),
            ratings: [
                Style::default().fg(Color::Red),
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Blue),
            ],
        }
    }

    fn mono() -> Self {
        Self {
            title: Style::default().bold(),
            hint: Style::default().dim(),
            selected: Style::default().reversed(),
            footer: Style::default(),
            error: Style::default().bold().underlined(),
            ratings: [Style::default(); 4],
        }
    }

    pub fn rating(&self, r: Rating) -> Style {
        self.ratings[r.key() as usize - 1]
    }
}
