//! Structured logging using **tracing**.
//!
//! Events are emitted from rayon workers as well as the main thread, so the
//! JSON subscriber records the thread id alongside level and target. All log
//! output goes to stderr; stdout is reserved for the report.

use tracing::{error, warn};

/// Initializes the global tracing subscriber.
///
/// Call once at startup. Filtering follows `RUST_LOG`
/// (e.g. `RUST_LOG=deadfile_core=debug`); without it only warnings and
/// errors are shown.
pub fn init_structured_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // try_init: a second call (tests, embedding) must not panic
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_and_log_helpers() {
        init_structured_logging();
        init_structured_logging();

        log_warn("alias config unusable");
        log_error("worker failed");
    }
}
