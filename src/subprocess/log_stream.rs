//! Streaming adapter around a running `log` process
//!
//! Startup drains stderr in the background, then peeks one byte of stdout to
//! tell "slow to start" apart from "produced nothing": the peek only returns
//! once the process has written something or closed its output. A process
//! that closes stdout without writing is a failure, reported with whatever
//! it wrote to stderr.

use super::error::{ProcessError, StreamWarning};
use super::log_command::LogCommand;
use super::runner::{spawn_piped, take_stream, ProcessCommand};
use super::stderr::{spawn_drain, StderrBuffer};
use crate::graph::{RowBatch, RowStreamer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A started stream plus any diagnostics printed before the first output
pub struct Started {
    pub stream: LogStream,
    pub warning: Option<StreamWarning>,
}

/// Live handle over a `log` process and its row decoder.
///
/// Call [`LogStream::close`] when done, even after the final batch: it gives
/// the decoder its last control message, kills the process if it is still
/// running and waits for its pipes to be released.
pub struct LogStream {
    command: String,
    rows: RowStreamer,
    child: Option<Child>,
    stderr: StderrBuffer,
    drain: Option<JoinHandle<()>>,
    closed: bool,
}

impl LogStream {
    /// Run `log` as described by `log` and start decoding its output
    pub async fn start(log: &LogCommand, batch_size: usize) -> Result<Started, ProcessError> {
        Self::spawn(log.to_process_command(), batch_size).await
    }

    /// Run an arbitrary command whose stdout is log graph output
    pub async fn spawn(command: ProcessCommand, batch_size: usize) -> Result<Started, ProcessError> {
        let command_line = command.display();
        let mut child = spawn_piped(&command)?;

        let stdout = take_stream(child.stdout.take(), "stdout")?;
        let stderr_pipe = take_stream(child.stderr.take(), "stderr")?;

        let stderr = StderrBuffer::new();
        let drain = spawn_drain(stderr_pipe, stderr.clone());

        let mut stdout = BufReader::new(stdout);
        let peek = match stdout.fill_buf().await {
            Ok(buf) if !buf.is_empty() => Ok(()),
            Ok(_) => Err(None),
            Err(e) => Err(Some(e)),
        };

        if let Err(peek_error) = peek {
            drop(stdout);
            let exit_code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    debug!("Failed to wait for '{}': {}", command_line, e);
                    None
                }
            };
            if let Err(e) = drain.await {
                debug!("stderr drain task failed: {}", e);
            }

            let text = stderr.text();
            debug!(
                "'{}' produced no output (exit code {:?}, {} bytes of stderr)",
                command_line,
                exit_code,
                text.len()
            );

            return Err(if !text.is_empty() {
                ProcessError::CommandFailed {
                    command: command_line,
                    exit_code,
                    stderr: text,
                }
            } else {
                match peek_error {
                    Some(source) => ProcessError::Io {
                        command: command_line,
                        source,
                    },
                    None => ProcessError::NoOutput { command: command_line },
                }
            });
        }

        let warning = Some(stderr.text())
            .filter(|text| !text.is_empty())
            .map(StreamWarning);
        if let Some(warning) = &warning {
            warn!("'{}' reported: {}", command_line, warning);
        }

        let rows = RowStreamer::spawn(stdout, batch_size);
        debug!("Streaming rows from '{}' in batches of {}", command_line, batch_size);

        Ok(Started {
            stream: LogStream {
                command: command_line,
                rows,
                child: Some(child),
                stderr,
                drain: Some(drain),
                closed: false,
            },
            warning,
        })
    }

    /// Next batch of rows; empty with `has_more == false` once exhausted or closed
    pub async fn request_more(&mut self) -> RowBatch {
        if self.closed {
            return RowBatch::default();
        }
        self.rows.request_more().await
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Stop decoding, kill the process and wait for everything to be
    /// released. Failures while tearing down are logged, never returned.
    /// Later calls do nothing.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.rows.send_close().await;

        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!("'{}' already exited: {}", self.command, e);
            }
            match child.wait().await {
                Ok(status) => debug!("'{}' finished with {}", self.command, status),
                Err(e) => debug!("Failed to wait for '{}': {}", self.command, e),
            }
        }

        if let Some(drain) = self.drain.take() {
            if let Err(e) = drain.await {
                debug!("stderr drain task failed: {}", e);
            }
        }
        if !self.stderr.is_empty() {
            debug!("'{}' stderr: {}", self.command, self.stderr.text());
        }

        self.rows.join().await;
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
        if let Some(drain) = self.drain.take() {
            drain.abort();
        }
    }
}
