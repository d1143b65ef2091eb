//! Application module
//!
//! Process-level concerns of the `graphlog` binary: verbosity handling,
//! logging setup and reporting of fatal errors.

pub mod config;
pub mod error_handling;
pub mod logging;

pub use config::AppConfig;
pub use error_handling::{exit_code, handle_fatal_error};
pub use logging::init_logging;
