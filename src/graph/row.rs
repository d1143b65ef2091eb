//! Commit rows and the assembler that builds them from decoded lines

use super::row_line::{GraphGutter, GraphRowLine, RowLineFlags, ELIDED_TEXT};
use crate::screen::segment::Segment;
use serde::Serialize;
use std::collections::HashSet;
use tracing::trace;

/// Identity of the revision a row displays
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Commit {
    pub change_id: String,
    pub commit_id: String,
    pub is_divergent: bool,
}

/// One revision of the log: its revision line plus every continuation line
/// up to the next revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Position of this row in the decoded output
    pub index: usize,
    pub commit: Commit,
    pub lines: Vec<GraphRowLine>,
    /// Index of the row sealed just before this one. Only used to continue
    /// graph lanes across the row boundary; see [`Rows::previous`].
    pub previous: Option<usize>,
    /// Width of the graph gutter, in runes
    pub indent: usize,
    pub is_affected: bool,
}

impl Row {
    fn new(index: usize, commit: Commit, indent: usize, previous: Option<usize>) -> Self {
        Self {
            index,
            commit,
            lines: Vec::new(),
            previous,
            indent,
            is_affected: false,
        }
    }

    /// Append a line, chopping its gutter to this row's indent and deriving
    /// its flags. Only the first line of a row may carry `REVISION`.
    pub fn add_line(&mut self, mut line: GraphRowLine) {
        line.chop(self.indent);

        if self.lines.is_empty() {
            line.flags = RowLineFlags::REVISION | RowLineFlags::HIGHLIGHTABLE;
        } else if line.contains(ELIDED_TEXT) {
            line.flags = RowLineFlags::ELIDED;
        } else if !line.is_gutter_only() {
            line.flags = RowLineFlags::HIGHLIGHTABLE;
        } else {
            line.flags = RowLineFlags::empty();
        }

        self.lines.push(line);
    }

    pub fn revision_line(&self) -> Option<&GraphRowLine> {
        self.lines.first()
    }

    /// Gutter of the last line, which the next row continues from
    pub fn gutter_continuation(&self) -> Option<&GraphGutter> {
        self.lines.last().map(|line| &line.gutter)
    }

    pub fn is_elided(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.flags.contains(RowLineFlags::ELIDED))
    }
}

/// Groups decoded lines into rows.
///
/// Rows are sealed into a pending list when the next revision line arrives
/// or when [`RowAssembler::finish`] is called; the owner drains that list.
#[derive(Debug, Default)]
pub struct RowAssembler {
    current: Option<Row>,
    pending: Vec<Row>,
    next_index: usize,
}

impl RowAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one assembled line
    pub fn push_line(&mut self, segments: Vec<Segment>) {
        let mut line = GraphRowLine::new(segments);

        match line.decode_marker() {
            // a payload with nothing after it is noise, not a revision
            Some(marker) if marker.index + 1 < line.segments.len() => {
                let previous = self.seal();
                let commit = Commit {
                    change_id: marker.change_id,
                    commit_id: marker.commit_id,
                    is_divergent: marker.is_divergent,
                };
                let mut row = Row::new(self.next_index, commit, marker.indent, previous);
                self.next_index += 1;
                row.add_line(line);
                self.current = Some(row);
            }
            _ => match self.current.as_mut() {
                Some(row) => row.add_line(line),
                None => trace!("Dropping log line before the first revision"),
            },
        }
    }

    /// Seal the open row, if any. Returns the index of the sealed row.
    fn seal(&mut self) -> Option<usize> {
        let row = self.current.take()?;
        let index = row.index;
        self.pending.push(row);
        Some(index)
    }

    /// Seal the final row once the input is exhausted
    pub fn finish(&mut self) {
        self.seal();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn take_pending(&mut self) -> Vec<Row> {
        std::mem::take(&mut self.pending)
    }
}

/// Append-only arena of delivered rows.
///
/// Rows reference their predecessor by index, so a consumer that keeps every
/// batch in a `Rows` can always resolve `previous` without shared ownership.
#[derive(Debug, Clone, Default)]
pub struct Rows {
    rows: Vec<Row>,
}

impl Rows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.extend(rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn previous(&self, row: &Row) -> Option<&Row> {
        row.previous.and_then(|index| self.rows.get(index))
    }

    pub fn position_of(&self, change_id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.commit.change_id == change_id)
    }

    /// Flag rows whose change or commit id is in `ids`; all others are cleared
    pub fn mark_affected(&mut self, ids: &HashSet<String>) {
        for row in &mut self.rows {
            row.is_affected =
                ids.contains(&row.commit.change_id) || ids.contains(&row.commit.commit_id);
        }
    }

    pub fn into_vec(self) -> Vec<Row> {
        self.rows
    }
}

impl From<Vec<Row>> for Rows {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
