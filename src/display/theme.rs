//! Colors and text styles - ANSI colors for terminal compatibility

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    /// Django Girls orange (xterm 214)
    pub const ORANGE: Color = Color::Indexed(214);
    pub const BLUE: Color = Color::Blue;
    pub const CYAN: Color = Color::Cyan;
    pub const GREEN: Color = Color::Green;
    pub const YELLOW: Color = Color::Yellow;
    pub const DARK_GRAY: Color = Color::DarkGray;

    pub fn text() -> Style {
        Style::default()
    }

    pub fn heading() -> Style {
        Style::default()
            .fg(Self::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn strong() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn emphasis() -> Style {
        Style::default().add_modifier(Modifier::ITALIC)
    }

    pub fn inline_code() -> Style {
        Style::default().fg(Self::YELLOW)
    }

    pub fn code_block() -> Style {
        Style::default().fg(Self::GREEN)
    }

    pub fn link() -> Style {
        Style::default()
            .fg(Self::BLUE)
            .add_modifier(Modifier::UNDERLINED)
    }

    pub fn rule() -> Style {
        Style::default().fg(Self::DARK_GRAY)
    }

    pub fn banner() -> Style {
        Style::default().fg(Self::ORANGE)
    }
}
