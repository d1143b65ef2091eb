use thiserror::Error;

/// Failures starting or reading the log process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process produced no output and reported why on stderr
    #[error("{stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("'{command}' exited without producing any output")]
    NoOutput { command: String },

    #[error("IO error while running '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Diagnostic text the process wrote alongside valid output.
///
/// Returned next to a live stream; it should be shown to the user but must
/// not stop the stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StreamWarning(pub String);
