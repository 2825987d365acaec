//! Bordered, titled panels rendered into a buffer and flushed to a writer

use super::layout::{PanelLayout, TitleStyle};
use super::markdown;
use super::theme::Theme;
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as CtColor, Print, ResetColor, SetAttribute, SetForegroundColor,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Who a panel speaks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    Assistant,
    System,
}

impl BlockRole {
    pub fn title(&self, style: TitleStyle) -> &'static str {
        match (self, style) {
            (BlockRole::Assistant, TitleStyle::Glyph) => "🤖",
            (BlockRole::Assistant, TitleStyle::Short) => "🤖 AI",
            (BlockRole::Assistant, TitleStyle::Full) => "🤖 Assistant",
            (BlockRole::System, TitleStyle::Glyph) => "ℹ️",
            (BlockRole::System, TitleStyle::Short) => "ℹ️ Sys",
            (BlockRole::System, TitleStyle::Full) => "ℹ️ System",
        }
    }

    pub fn border_color(&self) -> Color {
        match self {
            BlockRole::Assistant => Theme::ORANGE,
            BlockRole::System => Theme::BLUE,
        }
    }
}

/// Lay out `text` as a panel for a terminal `terminal_width` columns wide
pub fn render_panel(role: BlockRole, text: &str, terminal_width: u16) -> Buffer {
    let layout = PanelLayout::for_width(terminal_width);
    let title = role.title(layout.title);

    let lines = markdown::render(text);
    let content_width = lines
        .iter()
        .map(|l| l.width())
        .chain(std::iter::once(title.width() + 2))
        .max()
        .unwrap_or(0)
        .min(u16::MAX as usize) as u16;

    let width = layout.panel_width(terminal_width, content_width);
    let inner_width = width.saturating_sub(layout.chrome_width()) as usize;
    let wrapped = markdown::wrap_lines(lines, inner_width);

    let chrome_height = 2 + 2 * layout.padding_v;
    let height = (wrapped.len().max(1)).min((u16::MAX - chrome_height) as usize) as u16 + chrome_height;

    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(role.border_color()))
        .title(title)
        .padding(layout.padding());
    Paragraph::new(wrapped).block(block).render(area, &mut buffer);
    buffer
}

/// Visible rows of a buffer, cells hidden behind wide characters skipped
pub fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut row = String::new();
            let mut skip = 0usize;
            for x in area.left()..area.right() {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                if let Some(cell) = buffer.cell((x, y)) {
                    row.push_str(cell.symbol());
                    skip = cell.symbol().width().saturating_sub(1);
                }
            }
            row.trim_end().to_string()
        })
        .collect()
}

/// Write a buffer to a terminal, with colors when `styled`
pub fn write_buffer<W: Write>(out: &mut W, buffer: &Buffer, styled: bool) -> io::Result<()> {
    if !styled {
        for line in buffer_lines(buffer) {
            writeln!(out, "{line}")?;
        }
        return Ok(());
    }

    let area = buffer.area;
    for y in area.top()..area.bottom() {
        let mut skip = 0usize;
        let mut current: Option<(Color, Modifier)> = None;
        for x in area.left()..area.right() {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            let Some(cell) = buffer.cell((x, y)) else {
                continue;
            };
            let style = (cell.fg, cell.modifier);
            if current != Some(style) {
                queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
                if cell.fg != Color::Reset {
                    queue!(out, SetForegroundColor(to_crossterm(cell.fg)))?;
                }
                for attribute in attributes(cell.modifier) {
                    queue!(out, SetAttribute(attribute))?;
                }
                current = Some(style);
            }
            queue!(out, Print(cell.symbol()))?;
            skip = cell.symbol().width().saturating_sub(1);
        }
        queue!(out, SetAttribute(Attribute::Reset), ResetColor, Print("\r\n"))?;
    }
    out.flush()
}

fn attributes(modifier: Modifier) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    if modifier.contains(Modifier::BOLD) {
        attributes.push(Attribute::Bold);
    }
    if modifier.contains(Modifier::DIM) {
        attributes.push(Attribute::Dim);
    }
    if modifier.contains(Modifier::ITALIC) {
        attributes.push(Attribute::Italic);
    }
    if modifier.contains(Modifier::UNDERLINED) {
        attributes.push(Attribute::Underlined);
    }
    attributes
}

fn to_crossterm(color: Color) -> CtColor {
    match color {
        Color::Reset => CtColor::Reset,
        Color::Black => CtColor::Black,
        Color::Red => CtColor::DarkRed,
        Color::Green => CtColor::DarkGreen,
        Color::Yellow => CtColor::DarkYellow,
        Color::Blue => CtColor::DarkBlue,
        Color::Magenta => CtColor::DarkMagenta,
        Color::Cyan => CtColor::DarkCyan,
        Color::Gray => CtColor::Grey,
        Color::DarkGray => CtColor::DarkGrey,
        Color::LightRed => CtColor::Red,
        Color::LightGreen => CtColor::Green,
        Color::LightYellow => CtColor::Yellow,
        Color::LightBlue => CtColor::Blue,
        Color::LightMagenta => CtColor::Magenta,
        Color::LightCyan => CtColor::Cyan,
        Color::White => CtColor::White,
        Color::Indexed(i) => CtColor::AnsiValue(i),
        Color::Rgb(r, g, b) => CtColor::Rgb { r, g, b },
    }
}
