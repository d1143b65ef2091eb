//! ANSI escape decoding into styled segments
//!
//! Only SGR (Select Graphic Rendition) sequences affect the output; every
//! other escape sequence is consumed and dropped. The decoder is fed text in
//! arbitrary pieces and keeps escape state across calls, so it can sit
//! directly behind a pipe reader.

use super::segment::{Color, Modifiers, Segment, Style};

/// Escape sequences longer than this are abandoned as garbage
const MAX_ESCAPE_LEN: usize = 64;

/// Incremental SGR decoder.
///
/// A segment is closed when text with a different style follows it, and right
/// after every line break. Text of one style is never split just because the
/// input arrived in several pieces.
#[derive(Debug, Clone, Default)]
pub struct SgrDecoder {
    /// Style selected by the escape sequences seen so far
    style: Style,
    /// Text waiting to be emitted, all in `pending_style`
    pending: String,
    pending_style: Style,
    escape: String,
    in_escape: bool,
}

impl SgrDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `input`, appending every segment it completes to `out`
    pub fn feed(&mut self, input: &str, out: &mut impl Extend<Segment>) {
        for ch in input.chars() {
            if self.in_escape {
                self.escape.push(ch);
                if self.escape_complete() {
                    self.apply_escape();
                    self.escape.clear();
                    self.in_escape = false;
                } else if self.escape.len() > MAX_ESCAPE_LEN {
                    self.escape.clear();
                    self.in_escape = false;
                }
                continue;
            }

            if ch == '\x1b' {
                self.in_escape = true;
                self.escape.clear();
                self.escape.push(ch);
                continue;
            }

            if self.pending.is_empty() {
                self.pending_style = self.style;
            } else if self.pending_style != self.style {
                self.flush(out);
                self.pending_style = self.style;
            }

            self.pending.push(ch);
            if ch == '\n' {
                self.flush(out);
            }
        }
    }

    /// Emit whatever text is still pending. Called once the input is exhausted.
    pub fn finish(&mut self, out: &mut impl Extend<Segment>) {
        self.flush(out);
        self.escape.clear();
        self.in_escape = false;
    }

    fn flush(&mut self, out: &mut impl Extend<Segment>) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        out.extend(std::iter::once(Segment::new(text, self.pending_style)));
    }

    fn escape_complete(&self) -> bool {
        let mut chars = self.escape.chars().skip(1);
        match chars.next() {
            None => false,
            // CSI: parameters then a final byte in 0x40..=0x7e
            Some('[') => self.escape.len() > 2 && self.escape.ends_with(|c: char| ('@'..='~').contains(&c)),
            // OSC: terminated by BEL or ST
            Some(']') => self.escape.ends_with('\x07') || self.escape.ends_with("\x1b\\"),
            Some(_) => true,
        }
    }

    fn apply_escape(&mut self) {
        if let Some(params) = self
            .escape
            .strip_prefix("\x1b[")
            .and_then(|rest| rest.strip_suffix('m'))
        {
            self.style = apply_sgr(self.style, params);
        }
    }
}

/// Apply the parameters of one SGR sequence to `style`
///
/// An empty parameter counts as 0. Parameters that are not plain numbers
/// (such as colon sub-parameters) are skipped.
pub fn apply_sgr(mut style: Style, params: &str) -> Style {
    if params.is_empty() {
        return Style::default();
    }

    let codes: Vec<Option<u16>> = params
        .split(';')
        .map(|p| if p.is_empty() { Some(0) } else { p.parse().ok() })
        .collect();

    let mut i = 0;
    while i < codes.len() {
        let Some(code) = codes[i] else {
            i += 1;
            continue;
        };
        match code {
            0 => style = Style::default(),
            1 => style = style.add(Modifiers::BOLD),
            2 => style = style.add(Modifiers::DIM),
            3 => style = style.add(Modifiers::ITALIC),
            4 => style = style.add(Modifiers::UNDERLINE),
            5 => style = style.add(Modifiers::BLINK),
            7 => style = style.add(Modifiers::REVERSE),
            9 => style = style.add(Modifiers::STRIKETHROUGH),
            22 => style = style.remove(Modifiers::BOLD | Modifiers::DIM),
            23 => style = style.remove(Modifiers::ITALIC),
            24 => style = style.remove(Modifiers::UNDERLINE),
            25 => style = style.remove(Modifiers::BLINK),
            27 => style = style.remove(Modifiers::REVERSE),
            29 => style = style.remove(Modifiers::STRIKETHROUGH),
            30..=37 => style = style.fg(Color::Indexed(base_color(code, 30))),
            39 => style = style.fg(Color::Default),
            40..=47 => style = style.bg(Color::Indexed(base_color(code, 40))),
            49 => style = style.bg(Color::Default),
            90..=97 => style = style.fg(Color::Indexed(base_color(code, 90) + 8)),
            100..=107 => style = style.bg(Color::Indexed(base_color(code, 100) + 8)),
            38 | 48 => {
                let (color, consumed) = extended_color(&codes[i + 1..]);
                if let Some(color) = color {
                    style = if code == 38 {
                        style.fg(color)
                    } else {
                        style.bg(color)
                    };
                }
                i += consumed;
            }
            _ => {}
        }
        i += 1;
    }

    style
}

/// Palette index of a 16-color code within the range starting at `base`
fn base_color(code: u16, base: u16) -> u8 {
    u8::try_from(code - base).unwrap_or_default()
}

fn channel(value: u16) -> Option<u8> {
    u8::try_from(value).ok()
}

/// Parse the tail of a 38/48 sequence: `5;n` or `2;r;g;b`.
/// Returns the color and how many parameters it consumed. Values outside
/// 0..=255 consume their parameters but select no color.
fn extended_color(rest: &[Option<u16>]) -> (Option<Color>, usize) {
    match rest {
        [Some(5), Some(n), ..] => (channel(*n).map(Color::Indexed), 2),
        [Some(2), Some(r), Some(g), Some(b), ..] => {
            let color = match (channel(*r), channel(*g), channel(*b)) {
                (Some(r), Some(g), Some(b)) => Some(Color::Rgb(r, g, b)),
                _ => None,
            };
            (color, 4)
        }
        [Some(5)] | [Some(2), ..] => (None, rest.len()),
        _ => (None, 0),
    }
}
