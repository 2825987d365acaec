//! Startup banner

use super::theme::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const LOGO: [&str; 6] = [
    "██████╗      ██╗ █████╗ ███╗   ██╗ ██████╗  ██████╗      ██████╗ ██╗██████╗ ██╗     ███████╗",
    "██╔══██╗     ██║██╔══██╗████╗  ██║██╔════╝ ██╔═══██╗    ██╔════╝ ██║██╔══██╗██║     ██╔════╝",
    "██║  ██║     ██║███████║██╔██╗ ██║██║  ███╗██║   ██║    ██║  ███╗██║██████╔╝██║     ███████╗",
    "██║  ██║██   ██║██╔══██║██║╚██╗██║██║   ██║██║   ██║    ██║   ██║██║██╔══██╗██║     ╚════██║",
    "██████╔╝╚█████╔╝██║  ██║██║ ╚████║╚██████╔╝╚██████╔╝    ╚██████╔╝██║██║  ██║███████╗███████║",
    "╚═════╝  ╚════╝ ╚═╝  ╚═╝╚═╝  ╚═══╝ ╚═════╝  ╚═════╝      ╚═════╝ ╚═╝╚═╝  ╚═╝╚══════╝╚══════╝",
];

const WELCOME: [&str; 4] = [
    "Welcome to Django Girls Offline!",
    "",
    "Start your web development journey with Django!",
    "Type 'hello' to get started with your Django Girls Assistant.",
];

const FRAME_INNER: usize = 65;

/// Banner lines for a terminal `width` columns wide.
///
/// The block-letter logo only appears when it fits.
pub fn banner_lines(width: u16) -> Vec<Line<'static>> {
    let orange = Theme::banner();
    let mut lines = vec![Line::default()];

    if LOGO[0].width() <= width as usize {
        lines.extend(LOGO.iter().map(|row| Line::styled(*row, orange)));
    } else {
        lines.push(Line::styled("DJANGO GIRLS", orange.patch(Theme::strong())));
    }
    lines.push(Line::default());

    let inner = FRAME_INNER.min((width as usize).saturating_sub(2)).max(1);
    lines.push(Line::styled(format!("┌{}┐", "─".repeat(inner)), orange));
    for (i, text) in WELCOME.iter().enumerate() {
        let style = if i == 0 { Theme::strong() } else { Style::default() };
        for chunk in fit(text, inner.saturating_sub(1)) {
            let pad = inner.saturating_sub(chunk.width() + 1);
            lines.push(Line::from(vec![
                Span::styled("│", orange),
                Span::styled(format!(" {chunk}"), style),
                Span::raw(" ".repeat(pad)),
                Span::styled("│", orange),
            ]));
        }
    }
    lines.push(Line::styled(format!("└{}┘", "─".repeat(inner)), orange));
    lines.push(Line::default());
    lines
}

fn fit(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    super::markdown::wrap_lines(vec![Line::from(text.to_string())], width)
        .into_iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|s| s.content.as_ref())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}
