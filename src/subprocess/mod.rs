//! Process management for the log executable
//!
//! `runner` starts processes, `stderr` keeps their diagnostic stream
//! drained, and `log_stream` ties a running `log` process to the row
//! decoder in [`crate::graph`].

pub mod error;
pub mod log_command;
pub mod log_stream;
pub mod runner;
pub mod stderr;

pub use error::{ProcessError, StreamWarning};
pub use log_command::{default_template, LogCommand, DEFAULT_EXECUTABLE};
pub use log_stream::{LogStream, Started};
pub use runner::{spawn_piped, ProcessCommand};
pub use stderr::StderrBuffer;

/// Start streaming `revset` rendered with `template` through `jj log`
pub async fn start_streaming(
    revset: Option<String>,
    template: String,
    batch_size: usize,
) -> Result<Started, ProcessError> {
    LogStream::start(&LogCommand::new(revset, template), batch_size).await
}
