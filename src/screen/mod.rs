//! Styled text model for rendered log output
//!
//! The log executable writes ANSI-colored text. This module turns the raw
//! bytes into [`Segment`]s (text plus style) and regroups them into lines
//! that the graph decoder can inspect one at a time.

pub mod ansi;
pub mod lines;
pub mod reader;
pub mod segment;

pub use ansi::SgrDecoder;
pub use lines::{split_lines, LineAssembler, LineReader};
pub use reader::SegmentReader;
pub use segment::{Color, Modifiers, Segment, Style};
