//! Construction of the `log` invocation that feeds the row decoder

use super::runner::ProcessCommand;
use crate::graph::MARKER;
use std::path::PathBuf;

pub const DEFAULT_EXECUTABLE: &str = "jj";

/// Template that prefixes every revision with the identity payload and then
/// renders the executable's own one-line log format.
///
/// The ids go through `stringify` so they are printed without color: the
/// whole payload must arrive as a single styled segment to be decoded.
pub fn default_template() -> String {
    format!(
        r#"concat("{m}", stringify(change_id.shortest(8)), "{m}", stringify(commit_id.shortest(8)), "{m}", if(divergent, "true", "false"), builtin_log_oneline)"#,
        m = MARKER
    )
}

/// A `log` request: which revisions, rendered how, from which repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCommand {
    pub executable: String,
    pub repository: Option<PathBuf>,
    /// Passed through verbatim; `None` lets the executable pick its default
    pub revset: Option<String>,
    pub template: String,
    pub extra_args: Vec<String>,
}

impl Default for LogCommand {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            repository: None,
            revset: None,
            template: default_template(),
            extra_args: Vec::new(),
        }
    }
}

impl LogCommand {
    pub fn new(revset: Option<String>, template: String) -> Self {
        Self {
            revset,
            template,
            ..Self::default()
        }
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_repository(mut self, repository: Option<PathBuf>) -> Self {
        self.repository = repository;
        self
    }

    pub fn to_process_command(&self) -> ProcessCommand {
        let mut command = ProcessCommand::new(&self.executable).args([
            "log",
            "--color",
            "always",
            "--quiet",
            "--no-pager",
        ]);

        if let Some(repository) = &self.repository {
            command = command
                .arg("-R")
                .arg(repository.to_string_lossy().into_owned());
        }
        if let Some(revset) = &self.revset {
            command = command.arg("-r").arg(revset.as_str());
        }

        command
            .arg("-T")
            .arg(self.template.as_str())
            .args(self.extra_args.iter().cloned())
    }
}
