//! Shared logging setup for the jobquality binary and host services.
//!
//! The engine itself only emits `tracing` events; installing a subscriber is
//! the host's decision.

use crate::Result;

/// Maps CLI verbosity flags to a tracing level.
///
/// 0 = INFO, 1 = DEBUG, 2+ = TRACE; `quiet` forces ERROR.
pub fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Initializes structured logging based on verbosity level.
///
/// Logs are written to stderr so that summary JSON on stdout stays clean.
///
/// # Example
/// ```rust,no_run
/// use jobquality_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::JobQualityError::configuration(format!(
                "Failed to initialize logging: {}",
                e
            ))
        })?;

    Ok(())
}
