//! Decoding of single log lines: identity markers and gutter chopping

use crate::screen::segment::{Segment, Style};
use bitflags::bitflags;

/// Delimiter embedded by the log template around the identity payload.
///
/// A revision line carries `<text><MARKER><change id><MARKER><commit id><MARKER><divergent>`
/// inside a single unstyled segment.
pub const MARKER: &str = "__gl\u{2063}mk__";

/// Text the log executable prints in place of hidden revisions
pub const ELIDED_TEXT: &str = "(elided revisions)";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RowLineFlags: u8 {
        /// First line of a commit row
        const REVISION = 1 << 0;
        /// Line the cursor highlight may cover
        const HIGHLIGHTABLE = 1 << 1;
        /// Synthetic "elided revisions" placeholder
        const ELIDED = 1 << 2;
    }
}

/// Graph-drawing prefix of a line, one rune per segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphGutter {
    pub segments: Vec<Segment>,
}

impl GraphGutter {
    pub fn width(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphRowLine {
    pub segments: Vec<Segment>,
    pub gutter: GraphGutter,
    pub flags: RowLineFlags,
}

/// Identity decoded from a revision line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInfo {
    /// Index of the segment that carried the payload
    pub index: usize,
    /// Runes before that segment, i.e. the graph prefix width
    pub indent: usize,
    pub change_id: String,
    pub commit_id: String,
    pub is_divergent: bool,
}

impl GraphRowLine {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            gutter: GraphGutter::default(),
            flags: RowLineFlags::empty(),
        }
    }

    /// Content text, gutter excluded
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.segments.iter().any(|s| s.text.contains(needle))
    }

    /// True when nothing but graph glyphs and whitespace is left after the gutter
    pub fn is_gutter_only(&self) -> bool {
        self.segments.iter().all(Segment::is_blank)
    }

    /// Find and strip the identity marker payload.
    ///
    /// Returns `None` when no segment carries the marker or when the payload
    /// does not split into exactly four fields. On success the carrying
    /// segment is reduced to the text that preceded the first marker.
    pub fn decode_marker(&mut self) -> Option<MarkerInfo> {
        let index = self
            .segments
            .iter()
            .position(|s| s.text.contains(MARKER))?;

        let parts: Vec<&str> = self.segments[index].text.split(MARKER).collect();
        let [before, change_id, commit_id, divergent] = parts[..] else {
            return None;
        };

        let is_divergent = divergent.trim().parse::<bool>().unwrap_or(false);
        let mut change_id = change_id.to_string();
        let commit_id = commit_id.to_string();
        let before = before.to_string();

        self.segments[index].text = before;

        if is_divergent {
            change_id = divergent_change_id(&self.segments[index + 1..]);
        }

        let indent = self.segments[..index].iter().map(Segment::width).sum();

        Some(MarkerInfo {
            index,
            indent,
            change_id,
            commit_id,
            is_divergent,
        })
    }

    /// Move the first `indent` runes into the gutter.
    ///
    /// Segments fully inside the prefix move to the gutter; a segment that
    /// straddles the boundary is split and its tail becomes the first content
    /// segment. A line shorter than `indent` is padded with spaces so the
    /// gutter is always exactly `indent` runes wide. Gutter runes keep their
    /// original style and carry their column as the lane hint.
    pub fn chop(&mut self, indent: usize) {
        let mut gutter = Vec::new();
        let mut content = Vec::new();
        let mut remaining = indent;

        for segment in std::mem::take(&mut self.segments) {
            if segment.text.is_empty() {
                continue;
            }
            if remaining == 0 {
                content.push(segment);
                continue;
            }

            let width = segment.width();
            if width <= remaining {
                remaining -= width;
                gutter.push(segment);
            } else {
                let (head, tail) = segment.split_at_rune(remaining);
                remaining = 0;
                gutter.push(head);
                content.extend(tail);
            }
        }

        if remaining > 0 {
            let padding = " ".repeat(remaining);
            match gutter.last_mut() {
                Some(last) => last.text.push_str(&padding),
                None => gutter.push(Segment::new(padding, Style::default())),
            }
        }

        self.segments = content;
        self.gutter = GraphGutter {
            segments: explode_runes(gutter),
        };
    }
}

/// Rebuild a divergent change id from the segments that follow the payload.
///
/// The executable renders divergent ids over several styled segments, ending
/// in either a `/n` offset or a `??` suffix. The terminating segment is not
/// part of the id.
fn divergent_change_id(segments: &[Segment]) -> String {
    let mut change_id = String::new();
    for segment in segments {
        let text = segment.text.trim();
        if text.is_empty() || text.starts_with('/') || text.ends_with("??") {
            break;
        }
        change_id.push_str(text);
    }
    change_id
}

fn explode_runes(segments: Vec<Segment>) -> Vec<Segment> {
    let mut runes = Vec::new();
    for segment in segments {
        for ch in segment.text.chars() {
            let lane = runes.len();
            runes.push(Segment::new(ch.to_string(), segment.style).with_lane(lane));
        }
    }
    runes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::segment::Color;

    fn payload(before: &str, change: &str, commit: &str, divergent: &str) -> String {
        format!("{before}{MARKER}{change}{MARKER}{commit}{MARKER}{divergent}")
    }

    fn line(texts: &[&str]) -> GraphRowLine {
        GraphRowLine::new(texts.iter().map(|t| Segment::plain(*t)).collect())
    }

    #[test]
    fn test_decode_marker() {
        let p = payload("", "qpvuntsm", "230dd059", "false");
        let mut l = line(&["@", "  ", p.as_str(), "qpvuntsm test@example.com"]);
        let info = l.decode_marker().unwrap();
        assert_eq!(info.index, 2);
        assert_eq!(info.indent, 3);
        assert_eq!(info.change_id, "qpvuntsm");
        assert_eq!(info.commit_id, "230dd059");
        assert!(!info.is_divergent);
        assert_eq!(l.segments[2].text, "");
    }

    #[test]
    fn test_decode_keeps_text_before_marker() {
        let p = payload("> ", "a", "1", "false");
        let mut l = line(&["○ ", p.as_str(), "rest"]);
        l.decode_marker().unwrap();
        assert_eq!(l.segments[1].text, "> ");
    }

    #[test]
    fn test_line_without_marker() {
        let mut l = line(&["│ ", "description"]);
        assert!(l.decode_marker().is_none());
    }

    #[test]
    fn test_wrong_field_count_is_not_a_boundary() {
        let three = format!("x{MARKER}a{MARKER}1");
        let five = format!("{}{MARKER}extra", payload("", "a", "1", "true"));
        for text in [three, five] {
            let mut l = line(&["○ ", text.as_str(), "rest"]);
            assert!(l.decode_marker().is_none());
            assert_eq!(l.segments[1].text, text);
        }
    }

    #[test]
    fn test_unparsable_divergent_flag_is_false() {
        let p = payload("", "a", "1", "maybe");
        let mut l = line(&[p.as_str(), "rest"]);
        assert!(!l.decode_marker().unwrap().is_divergent);
    }

    #[test]
    fn test_divergent_change_id_stops_at_slash() {
        let p = payload("", "ignored", "1", "true");
        let mut l = line(&["◆ ", p.as_str(), "xyz", " ab", "c ", "/2", " more"]);
        let info = l.decode_marker().unwrap();
        assert!(info.is_divergent);
        assert_eq!(info.change_id, "xyzabc");
    }

    #[test]
    fn test_divergent_change_id_stops_at_question_marks() {
        let p = payload("", "ignored", "1", "true");
        let mut l = line(&[p.as_str(), "qpv", "untsm??", "tail"]);
        assert_eq!(l.decode_marker().unwrap().change_id, "qpv");

        let mut l = line(&[p.as_str(), "??", "tail"]);
        assert_eq!(l.decode_marker().unwrap().change_id, "");
    }

    #[test]
    fn test_divergent_change_id_stops_at_blank_segment() {
        let p = payload("", "ignored", "1", "true");
        let mut l = line(&[p.as_str(), "abc", "   ", "def"]);
        assert_eq!(l.decode_marker().unwrap().change_id, "abc");
    }

    #[test]
    fn test_chop_splits_straddling_segment() {
        let green = Style::default().fg(Color::Indexed(2));
        let mut l = GraphRowLine::new(vec![
            Segment::new("│ ", green),
            Segment::plain("○ text"),
        ]);
        l.chop(4);
        assert_eq!(l.gutter.text(), "│ ○ ");
        assert_eq!(l.gutter.segments.len(), 4);
        assert_eq!(l.gutter.segments[0].style, green);
        assert_eq!(l.gutter.segments[3].lane, Some(3));
        assert_eq!(l.text(), "text");
    }

    #[test]
    fn test_chop_drops_fully_consumed_segments() {
        let mut l = line(&["│", " ", "desc"]);
        l.chop(2);
        assert_eq!(l.gutter.text(), "│ ");
        assert_eq!(l.segments.len(), 1);
        assert_eq!(l.text(), "desc");
    }

    #[test]
    fn test_chop_pads_short_line() {
        let mut l = line(&["│"]);
        l.chop(4);
        assert_eq!(l.gutter.width(), 4);
        assert_eq!(l.gutter.text(), "│   ");
        assert!(l.segments.is_empty());
    }

    #[test]
    fn test_chop_empty_line() {
        let mut l = GraphRowLine::new(Vec::new());
        l.chop(3);
        assert_eq!(l.gutter.text(), "   ");
        assert!(l.segments.is_empty());
        assert!(l.is_gutter_only());
    }

    #[test]
    fn test_chop_zero_indent() {
        let mut l = line(&["abc"]);
        l.chop(0);
        assert_eq!(l.gutter.width(), 0);
        assert_eq!(l.text(), "abc");
    }
}
