//! Application configuration
//!
//! Settings that only matter to the running binary, as opposed to
//! [`crate::config::Config`] which describes what to stream.

/// Application configuration structure
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Filter from config files or the environment, used when not verbose
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            log_level: None,
        }
    }

    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        self.log_level = level;
        self
    }

    /// Get the log filter based on verbosity
    ///
    /// The binary writes its real output to stdout, so the quiet default only
    /// lets warnings through to stderr.
    pub fn log_level(&self) -> String {
        match self.verbose {
            0 => self.log_level.clone().unwrap_or_else(|| "warn".to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
