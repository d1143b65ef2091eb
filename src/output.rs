//! Rendering of decoded rows for the command line

use crate::graph::{Row, RowLineFlags};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// How rows are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Gutter and content text of every line, without styling
    #[default]
    PlainText,
    /// `change_id commit_id` per row
    Ids,
    /// One JSON object per row
    JsonLines,
}

#[derive(Debug, Serialize)]
struct LineView {
    gutter: String,
    content: String,
    flags: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct RowView<'a> {
    index: usize,
    change_id: &'a str,
    commit_id: &'a str,
    is_divergent: bool,
    previous: Option<usize>,
    lines: Vec<LineView>,
}

fn flag_names(flags: RowLineFlags) -> Vec<&'static str> {
    flags
        .iter_names()
        .map(|(name, _)| match name {
            "REVISION" => "revision",
            "HIGHLIGHTABLE" => "highlightable",
            "ELIDED" => "elided",
            _ => "unknown",
        })
        .collect()
}

impl<'a> From<&'a Row> for RowView<'a> {
    fn from(row: &'a Row) -> Self {
        Self {
            index: row.index,
            change_id: &row.commit.change_id,
            commit_id: &row.commit.commit_id,
            is_divergent: row.commit.is_divergent,
            previous: row.previous,
            lines: row
                .lines
                .iter()
                .map(|line| LineView {
                    gutter: line.gutter.text(),
                    content: line.text(),
                    flags: flag_names(line.flags),
                })
                .collect(),
        }
    }
}

pub fn write_row(out: &mut impl Write, row: &Row, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::PlainText => {
            for line in &row.lines {
                writeln!(out, "{}{}", line.gutter.text(), line.text())?;
            }
        }
        OutputFormat::Ids => {
            let suffix = if row.commit.is_divergent {
                " (divergent)"
            } else {
                ""
            };
            writeln!(
                out,
                "{} {}{}",
                row.commit.change_id, row.commit.commit_id, suffix
            )?;
        }
        OutputFormat::JsonLines => {
            let json = serde_json::to_string(&RowView::from(row))
                .with_context(|| format!("Failed to serialize row {}", row.index))?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

pub fn write_rows<'a>(
    out: &mut impl Write,
    rows: impl IntoIterator<Item = &'a Row>,
    format: OutputFormat,
) -> Result<()> {
    for row in rows {
        write_row(out, row, format)?;
    }
    Ok(())
}
