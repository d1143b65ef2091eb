use crate::subprocess::{default_template, LogCommand, DEFAULT_EXECUTABLE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;

pub use loader::{load, ConfigLoader};

pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Effective settings after merging config files and environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub executable: String,
    pub revset: Option<String>,
    pub template: Option<String>,
    pub batch_size: usize,
    pub repository: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// One config file; every key is optional and only overrides what it sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub executable: Option<String>,
    pub revset: Option<String>,
    pub template: Option<String>,
    pub batch_size: Option<usize>,
    pub repository: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            revset: None,
            template: None,
            batch_size: DEFAULT_BATCH_SIZE,
            repository: None,
            log_level: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, file: ConfigFile) {
        if let Some(executable) = file.executable {
            self.executable = executable;
        }
        if let Some(revset) = file.revset {
            self.revset = Some(revset);
        }
        if let Some(template) = file.template {
            self.template = Some(template);
        }
        if let Some(batch_size) = file.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(repository) = file.repository {
            self.repository = Some(repository);
        }
        if let Some(log_level) = file.log_level {
            self.log_level = Some(log_level);
        }
    }

    pub fn merge_env_vars(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply `GRAPHLOG_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(executable) = lookup("GRAPHLOG_EXECUTABLE") {
            self.executable = executable;
        }

        if let Some(revset) = lookup("GRAPHLOG_REVSET") {
            self.revset = Some(revset);
        }

        if let Some(batch_size) = lookup("GRAPHLOG_BATCH_SIZE") {
            match batch_size.parse::<usize>() {
                Ok(value) => self.batch_size = value,
                Err(e) => tracing::warn!(
                    "Ignoring GRAPHLOG_BATCH_SIZE={:?}: {}",
                    batch_size,
                    e
                ),
            }
        }

        if let Some(log_level) = lookup("GRAPHLOG_LOG_LEVEL") {
            self.log_level = Some(log_level);
        }
    }

    /// Template to render with, falling back to the built-in marker template
    pub fn template(&self) -> String {
        self.template.clone().unwrap_or_else(default_template)
    }

    pub fn log_command(&self) -> LogCommand {
        LogCommand::new(self.revset.clone(), self.template())
            .with_executable(&self.executable)
            .with_repository(self.repository.clone())
    }
}
