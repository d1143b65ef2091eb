//! Line assembly: regroup a segment stream into lines

use super::reader::SegmentReader;
use super::segment::Segment;
use std::collections::VecDeque;
use tokio::io::AsyncRead;

/// Splits segments on line breaks while keeping each fragment's style.
///
/// Lines come out in input order without their terminating break. A blank
/// line yields an empty segment list.
#[derive(Debug, Default)]
pub struct LineAssembler {
    current: Vec<Segment>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one segment, appending every line it completes to `lines`
    pub fn push(&mut self, segment: Segment, lines: &mut impl Extend<Vec<Segment>>) {
        let Segment { text, style, lane } = segment;
        let mut rest = text.as_str();

        while let Some(pos) = rest.find('\n') {
            let piece = rest[..pos].strip_suffix('\r').unwrap_or(&rest[..pos]);
            if !piece.is_empty() {
                self.current.push(Segment {
                    text: piece.to_string(),
                    style,
                    lane,
                });
            }
            lines.extend(std::iter::once(std::mem::take(&mut self.current)));
            rest = &rest[pos + 1..];
        }

        if !rest.is_empty() {
            self.current.push(Segment {
                text: rest.to_string(),
                style,
                lane,
            });
        }
    }

    /// Line still being built when the input ends, if it has any text
    pub fn finish(&mut self) -> Option<Vec<Segment>> {
        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }
}

/// Split a finite segment sequence into lines
pub fn split_lines(segments: impl IntoIterator<Item = Segment>) -> Vec<Vec<Segment>> {
    let mut assembler = LineAssembler::new();
    let mut lines = Vec::new();
    for segment in segments {
        assembler.push(segment, &mut lines);
    }
    lines.extend(assembler.finish());
    lines
}

/// Lazily reads lines of segments from a raw byte source
pub struct LineReader<R> {
    segments: SegmentReader<R>,
    assembler: LineAssembler,
    lines: VecDeque<Vec<Segment>>,
    done: bool,
}

impl<R> LineReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            segments: SegmentReader::new(reader),
            assembler: LineAssembler::new(),
            lines: VecDeque::new(),
            done: false,
        }
    }

    /// Next complete line, or `None` when the source is exhausted
    pub async fn next_line(&mut self) -> std::io::Result<Option<Vec<Segment>>> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Ok(Some(line));
            }
            if self.done {
                return Ok(None);
            }

            match self.segments.next_segment().await? {
                Some(segment) => self.assembler.push(segment, &mut self.lines),
                None => {
                    self.done = true;
                    self.lines.extend(self.assembler.finish());
                }
            }
        }
    }
}
