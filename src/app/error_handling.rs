//! Error handling utilities

use crate::subprocess::ProcessError;
use tracing::error;

/// Exit status for a fatal error: 2 when the executable could not be found,
/// 1 otherwise
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ProcessError>() {
        Some(ProcessError::CommandNotFound(_)) => 2,
        _ => 1,
    }
}

/// Report a fatal error on stderr and exit
///
/// `verbose >= 1` also prints the error chain.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code(&error))
}
