//! Width tiers
//!
//! Every render measures the terminal again and picks a tier; nothing here
//! is cached.

use ratatui::widgets::Padding;

/// Width assumed when the terminal cannot be measured
pub const FALLBACK_WIDTH: u16 = 80;

const MIN_FIXED_WIDTH: u16 = 40;
const WIDE_PANEL_WIDTH: u16 = 90;

/// Terminal width bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// up to 30 columns
    Minimal,
    /// 31 to 50
    Narrow,
    /// 51 to 60
    Compact,
    /// 61 to 80
    Medium,
    /// 81 to 100
    Wide,
    /// above 100
    ExtraWide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStyle {
    Glyph,
    Short,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthPolicy {
    /// Use the whole terminal width
    Full,
    /// Shrink to the content, never wider than the terminal
    FitContent,
    Fixed(u16),
}

/// Layout decisions for one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub title: TitleStyle,
    pub padding_v: u16,
    pub padding_h: u16,
    pub width: WidthPolicy,
}

impl Tier {
    pub fn for_width(width: u16) -> Self {
        match width {
            0..=30 => Tier::Minimal,
            31..=50 => Tier::Narrow,
            51..=60 => Tier::Compact,
            61..=80 => Tier::Medium,
            81..=100 => Tier::Wide,
            _ => Tier::ExtraWide,
        }
    }

    pub fn layout(&self, width: u16) -> PanelLayout {
        let ninety_percent = ((width as u32 * 9) / 10) as u16;
        let (title, padding_v, padding_h, policy) = match self {
            Tier::Minimal => (TitleStyle::Glyph, 0, 0, WidthPolicy::Full),
            Tier::Narrow => (TitleStyle::Glyph, 0, 1, WidthPolicy::Full),
            Tier::Compact => (TitleStyle::Short, 0, 1, WidthPolicy::FitContent),
            Tier::Medium => (
                TitleStyle::Short,
                0,
                1,
                WidthPolicy::Fixed(ninety_percent.max(MIN_FIXED_WIDTH)),
            ),
            Tier::Wide => (
                TitleStyle::Full,
                1,
                2,
                WidthPolicy::Fixed(ninety_percent.max(MIN_FIXED_WIDTH)),
            ),
            Tier::ExtraWide => (TitleStyle::Full, 1, 2, WidthPolicy::Fixed(WIDE_PANEL_WIDTH)),
        };
        PanelLayout {
            title,
            padding_v,
            padding_h,
            width: policy,
        }
    }

    /// Input prompt for this tier
    pub fn prompt(&self) -> &'static str {
        match self {
            Tier::Minimal => "> ",
            Tier::Narrow => "You> ",
            _ => "You: ",
        }
    }
}

impl PanelLayout {
    pub fn for_width(width: u16) -> Self {
        Tier::for_width(width).layout(width)
    }

    pub fn padding(&self) -> Padding {
        Padding::new(self.padding_h, self.padding_h, self.padding_v, self.padding_v)
    }

    /// Columns taken by borders and horizontal padding
    pub fn chrome_width(&self) -> u16 {
        2 + 2 * self.padding_h
    }

    /// Outer panel width for content whose widest line is `content_width`
    pub fn panel_width(&self, terminal_width: u16, content_width: u16) -> u16 {
        let width = match self.width {
            WidthPolicy::Full => terminal_width,
            WidthPolicy::FitContent => content_width
                .saturating_add(self.chrome_width())
                .min(terminal_width),
            WidthPolicy::Fixed(width) => width.min(terminal_width),
        };
        // room for at least one column of text
        width.max(self.chrome_width() + 1)
    }
}
