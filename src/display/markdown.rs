//! Markdown to styled terminal lines

use super::theme::Theme;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Render markdown into unwrapped lines
pub fn render(markdown: &str) -> Vec<Line<'static>> {
    let mut renderer = MarkdownRenderer::new();
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    for event in parser {
        renderer.handle(event);
    }
    renderer.finish()
}

struct MarkdownRenderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// `Some(n)` for ordered lists, holding the next item number
    lists: Vec<Option<u64>>,
    pending_prefix: Option<String>,
    in_code_block: bool,
    needs_gap: bool,
}

impl MarkdownRenderer {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![Theme::text()],
            lists: Vec::new(),
            pending_prefix: None,
            in_code_block: false,
            needs_gap: false,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    self.push_code(&text);
                } else {
                    self.push(&text, self.style());
                }
            }
            Event::Code(text) => self.push(&text, Theme::inline_code()),
            Event::Html(html) | Event::InlineHtml(html) => self.push(&html, self.style()),
            // Authored line structure is kept; wrapping happens later
            Event::SoftBreak | Event::HardBreak => self.break_line(),
            Event::Rule => {
                self.open_block();
                self.push("────────", Theme::rule());
                self.close_block();
            }
            Event::TaskListMarker(done) => {
                self.push(if done { "[x] " } else { "[ ] " }, self.style());
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open_block(),
            Tag::Heading { .. } => {
                self.open_block();
                self.styles.push(Theme::heading());
            }
            Tag::CodeBlock(kind) => {
                self.open_block();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.push(&lang, Theme::rule());
                        self.break_line();
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.open_block();
                } else {
                    self.finish_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.finish_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.pending_prefix = Some(format!("{}{}", "  ".repeat(depth), marker));
            }
            Tag::Emphasis => self.styles.push(self.style().patch(Theme::emphasis())),
            Tag::Strong => self.styles.push(self.style().patch(Theme::strong())),
            Tag::Link { .. } => self.styles.push(self.style().patch(Theme::link())),
            Tag::BlockQuote(_) => self.open_block(),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.close_block(),
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.close_block();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.close_block();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.close_block();
                }
            }
            TagEnd::Item => self.finish_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Link => {
                if self.styles.len() > 1 {
                    self.styles.pop();
                }
            }
            TagEnd::BlockQuote(_) => self.close_block(),
            _ => {}
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    /// Blank line between top-level blocks
    fn open_block(&mut self) {
        if self.lists.is_empty() && self.needs_gap && !self.lines.is_empty() {
            self.finish_line();
            self.lines.push(Line::default());
        }
        self.needs_gap = false;
    }

    fn close_block(&mut self) {
        self.finish_line();
        if self.lists.is_empty() {
            self.needs_gap = true;
        }
    }

    fn push(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        if let Some(prefix) = self.pending_prefix.take() {
            self.current.push(Span::raw(prefix));
        }
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn push_code(&mut self, text: &str) {
        let body = text.strip_suffix('\n').unwrap_or(text);
        for (i, segment) in body.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            self.push(segment, Theme::code_block());
        }
        if text.ends_with('\n') {
            self.break_line();
        }
    }

    /// End the current line, keeping it even when empty
    fn break_line(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
    }

    /// End the current line only if it has content
    fn finish_line(&mut self) {
        if !self.current.is_empty() {
            self.break_line();
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.finish_line();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Word-wrap styled lines to `max_width` display columns.
///
/// Words wider than the line are split by character.
pub fn wrap_lines(lines: Vec<Line<'static>>, max_width: usize) -> Vec<Line<'static>> {
    let max_width = max_width.max(1);
    let mut wrapped = Vec::new();

    for line in lines {
        if line.width() <= max_width {
            wrapped.push(line);
            continue;
        }

        let mut current: Vec<Span<'static>> = Vec::new();
        let mut current_width = 0;

        for span in line.spans {
            let style = span.style;
            for piece in span.content.split_inclusive(' ') {
                let visible = piece.trim_end_matches(' ').width();
                if current_width > 0 && current_width + visible > max_width {
                    wrapped.push(Line::from(std::mem::take(&mut current)));
                    current_width = 0;
                    // a wrapped line never starts with the separating space
                    if piece.trim().is_empty() {
                        continue;
                    }
                }

                let remaining = max_width.saturating_sub(current_width);
                if piece.width() <= remaining {
                    current_width += piece.width();
                    current.push(Span::styled(piece.to_string(), style));
                    continue;
                }
                if visible <= remaining && visible > 0 {
                    current_width += visible;
                    current.push(Span::styled(piece.trim_end_matches(' ').to_string(), style));
                    continue;
                }

                // Split an over-long word by character width
                let mut chunk = String::new();
                for c in piece.chars() {
                    let w = c.width().unwrap_or(0);
                    if current_width + w > max_width && current_width > 0 {
                        if !chunk.is_empty() {
                            current.push(Span::styled(std::mem::take(&mut chunk), style));
                        }
                        wrapped.push(Line::from(std::mem::take(&mut current)));
                        current_width = 0;
                    }
                    chunk.push(c);
                    current_width += w;
                }
                if !chunk.is_empty() {
                    current.push(Span::styled(chunk, style));
                }
            }
        }

        if !current.is_empty() {
            wrapped.push(Line::from(current));
        }
    }

    wrapped
}
