//! # graphlog
//!
//! Streams the colorized graph output of `jj log` into commit rows that a
//! terminal UI can scroll through without materializing the whole history.
//!
//! ## Usage
//!
//! ```bash
//! graphlog [-r REVSET] [-T TEMPLATE] [-R REPO] [--batch-size N] [--stdin] [--ids | --json]
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging setup, application configuration and fatal error handling
//! - `config` - User and repository configuration files
//! - `screen` - Styled segments, ANSI decoding and line assembly
//! - `graph` - Row-line decoding, row assembly and the batch streamer
//! - `subprocess` - Process spawning and the streaming log adapter
//! - `output` - Plain, id and JSON rendering of rows
pub mod app;
pub mod config;
pub mod graph;
pub mod output;
pub mod screen;
pub mod subprocess;
