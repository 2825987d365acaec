//! Adaptive display
//!
//! Renders role-tagged panels sized for the terminal's width at the moment
//! of each call and reads line input.

mod banner;
mod layout;
mod markdown;
mod panel;
mod theme;

pub use banner::banner_lines;
pub use layout::{PanelLayout, Tier, TitleStyle, WidthPolicy, FALLBACK_WIDTH};
pub use panel::{buffer_lines, render_panel, write_buffer, BlockRole};

use crate::Result;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget};
use std::future::Future;
use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::debug;

/// Outcome of asking for one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// A line with its terminator removed
    Line(String),
    /// End of input or interrupt
    Closed,
}

/// Which prompt to show before reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Shrinks with the terminal width
    Adaptive,
    Fixed(&'static str),
}

/// Line-oriented conversation surface
pub trait Console {
    fn read_line(&mut self, prompt: Prompt) -> impl Future<Output = Result<InputLine>> + Send;

    /// Show a bordered block for `role`
    fn render(&mut self, role: BlockRole, text: &str) -> Result<()>;

    /// Print a plain line
    fn notice(&mut self, text: &str) -> Result<()>;

    /// Print text without a line break and flush
    fn write_fragment(&mut self, text: &str) -> Result<()>;
}

/// Console over any async line reader and blocking writer
pub struct TerminalConsole<R, W> {
    reader: R,
    writer: W,
    styled: bool,
    fixed_width: Option<u16>,
}

impl TerminalConsole<BufReader<Stdin>, std::io::Stdout> {
    /// Console on the process's stdin and stdout, colored when stdout is a tty
    pub fn stdio() -> Self {
        let stdout = std::io::stdout();
        let styled = stdout.is_terminal();
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: stdout,
            styled,
            fixed_width: None,
        }
    }
}

impl<R, W> TerminalConsole<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    /// Unstyled console with a measured width
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            styled: false,
            fixed_width: None,
        }
    }

    /// Pretend the terminal is always `width` columns wide
    pub fn with_width(mut self, width: u16) -> Self {
        self.fixed_width = Some(width);
        self
    }

    pub fn with_styling(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Current terminal width, measured on every call
    pub fn width(&self) -> u16 {
        if let Some(width) = self.fixed_width {
            return width;
        }
        match crossterm::terminal::size() {
            Ok((width, _)) if width > 0 => width,
            _ => FALLBACK_WIDTH,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    pub fn print_banner(&mut self) -> Result<()> {
        let lines = banner_lines(self.width());
        self.write_lines(lines)
    }

    fn write_lines(&mut self, lines: Vec<Line<'static>>) -> Result<()> {
        let width = lines.iter().map(|l| l.width()).max().unwrap_or(0).max(1);
        let area = Rect::new(0, 0, width.min(u16::MAX as usize) as u16, lines.len() as u16);
        let mut buffer = Buffer::empty(area);
        Paragraph::new(lines).render(area, &mut buffer);
        write_buffer(&mut self.writer, &buffer, self.styled)?;
        Ok(())
    }
}

impl<R, W> Console for TerminalConsole<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn read_line(&mut self, prompt: Prompt) -> Result<InputLine> {
        let prompt = match prompt {
            Prompt::Adaptive => Tier::for_width(self.width()).prompt(),
            Prompt::Fixed(text) => text,
        };
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;

        let mut line = String::new();
        let read = tokio::select! {
            read = self.reader.read_line(&mut line) => Some(read),
            _ = tokio::signal::ctrl_c() => None,
        };

        match read {
            None => {
                debug!("Interrupted at prompt");
                writeln!(self.writer)?;
                Ok(InputLine::Closed)
            }
            Some(Ok(0)) => {
                writeln!(self.writer)?;
                Ok(InputLine::Closed)
            }
            Some(Ok(_)) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
                Ok(InputLine::Line(trimmed))
            }
            Some(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(InputLine::Closed),
            Some(Err(e)) => Err(e.into()),
        }
    }

    fn render(&mut self, role: BlockRole, text: &str) -> Result<()> {
        let buffer = render_panel(role, text, self.width());
        write_buffer(&mut self.writer, &buffer, self.styled)?;
        Ok(())
    }

    fn notice(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{text}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_fragment(&mut self, text: &str) -> Result<()> {
        write!(self.writer, "{text}")?;
        self.writer.flush()?;
        Ok(())
    }
}
