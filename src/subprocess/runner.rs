use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use super::error::ProcessError;

/// Description of a process to start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<PathBuf>,
}

impl ProcessCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    /// Program and arguments joined for logs and error messages
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

fn log_command_start(command: &ProcessCommand) {
    tracing::debug!("Executing subprocess: {}", command.display());

    if !command.env.is_empty() {
        tracing::trace!("Extra environment variables: {:?}", command.env);
    }
    if let Some(ref dir) = command.working_dir {
        tracing::trace!("Working directory: {:?}", dir);
    }
}

fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(&command.program);
    cmd.args(&command.args);

    for (key, value) in &command.env {
        cmd.env(key, value);
    }

    if let Some(dir) = &command.working_dir {
        cmd.current_dir(dir);
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
    if error.kind() == std::io::ErrorKind::NotFound {
        tracing::error!(
            "Command '{}' not found. PATH: {}",
            command.program,
            std::env::var("PATH").unwrap_or_default()
        );
        ProcessError::CommandNotFound(command.program.clone())
    } else {
        tracing::error!(
            "Failed to spawn '{}': {:?} (kind: {:?})",
            command.program,
            error,
            error.kind()
        );
        ProcessError::SpawnFailed {
            command: command.display(),
            source: error,
        }
    }
}

/// Start `command` with piped stdout and stderr.
///
/// The child is killed if its handle is dropped before it exits.
pub fn spawn_piped(command: &ProcessCommand) -> Result<tokio::process::Child, ProcessError> {
    log_command_start(command);
    configure_command(command)
        .spawn()
        .map_err(|e| map_spawn_error(e, command))
}

/// Take an output pipe from a child, converting `None` to an error
pub fn take_stream<T>(stream: Option<T>, stream_name: &str) -> Result<T, ProcessError> {
    stream.ok_or_else(|| ProcessError::InternalError {
        message: format!("Failed to capture {}", stream_name),
    })
}
