//! Log graph decoding
//!
//! Turns assembled lines of styled segments into commit [`Row`]s. Revision
//! lines are recognized by an identity payload the log template embeds
//! between [`MARKER`]s; every other line continues the currently open row.
//! Rows are produced by a background worker and pulled in batches through
//! [`RowStreamer`].

pub mod parser;
pub mod row;
pub mod row_line;
pub mod streamer;

pub use parser::{parse_all, parse_all_blocking, parse_bytes};
pub use row::{Commit, Row, RowAssembler, Rows};
pub use row_line::{GraphGutter, GraphRowLine, MarkerInfo, RowLineFlags, MARKER};
pub use streamer::{ControlMsg, RowBatch, RowStreamer};
