//! Segments: runs of text that share a display style

use bitflags::bitflags;

/// Terminal color as selected by an SGR sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    /// Palette index; 0-7 standard, 8-15 bright, 16-255 extended
    Indexed(u8),
    Rgb(u8, u8, u8),
}

bitflags! {
    /// Text attributes toggled by SGR codes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const REVERSE = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
    }
}

/// Display style of a segment.
///
/// The pipeline never interprets a style beyond comparing it for equality;
/// rendering layers map it onto whatever their terminal backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub modifiers: Modifiers,
}

impl Style {
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    pub fn add(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn remove(mut self, modifiers: Modifiers) -> Self {
        self.modifiers -= modifiers;
        self
    }
}

/// A run of text with one style and an optional lane hint.
///
/// Segments are treated as immutable values; decoding splits them into new
/// segments instead of editing them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: Style,
    /// Column of the graph lane this segment was cut from, set on gutter runes
    pub lane: Option<usize>,
}

impl Segment {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            lane: None,
        }
    }

    /// Unstyled segment
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::default())
    }

    pub fn with_lane(mut self, lane: usize) -> Self {
        self.lane = Some(lane);
        self
    }

    /// Number of runes (chars) in the segment text
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Split after `runes` chars, keeping style and lane on both halves.
    /// Returns `None` for the tail when the split point is past the end.
    pub fn split_at_rune(self, runes: usize) -> (Segment, Option<Segment>) {
        match self.text.char_indices().nth(runes) {
            Some((offset, _)) => {
                let tail = Segment {
                    text: self.text[offset..].to_string(),
                    style: self.style,
                    lane: self.lane,
                };
                let head = Segment {
                    text: self.text[..offset].to_string(),
                    style: self.style,
                    lane: self.lane,
                };
                (head, Some(tail))
            }
            None => (self, None),
        }
    }
}
