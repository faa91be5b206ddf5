//! Logging set-up.
//!
//! The TUI owns the terminal, so records never go to stdout: everything is
//! written as JSON to a daily-rolling file under the data directory. Code
//! across the crate logs through the `log` macros, which are bridged into
//! `tracing` here.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// File name prefix of the rolling log.
pub const LOG_FILE_PREFIX: &str = "invoicer.log";

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initialize logging for TUI mode.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application so buffered records are flushed on shutdown.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    let log_dir = ensure_log_dir(log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter());

    // try_init: a second call (tests, embedding) must not panic
    if let Err(e) = tracing_subscriber::registry().with(file_layer).try_init() {
        eprintln!("Logging already initialized: {e}");
    }

    // Already installed when tracing-subscriber's `tracing-log` feature is on.
    if tracing_log::LogTracer::init().is_err() {
        log::debug!("log -> tracing bridge already installed");
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Create the log directory, falling back to `./logs` when it can't be made.
fn ensure_log_dir(log_dir: &Path) -> PathBuf {
    if log_dir.exists() {
        return log_dir.to_path_buf();
    }
    match fs::create_dir_all(log_dir) {
        Ok(()) => log_dir.to_path_buf(),
        Err(e) => {
            eprintln!("Failed to create logs directory {}: {e}", log_dir.display());
            PathBuf::from("logs")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_log_dir_creates_missing() {
        let dir = std::env::temp_dir().join(format!("invoicer-logs-{}", uuid::Uuid::new_v4()));
        assert!(!dir.exists());
        let resolved = ensure_log_dir(&dir);
        assert_eq!(resolved, dir);
        assert!(dir.is_dir());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_ensure_log_dir_existing() {
        let dir = std::env::temp_dir();
        assert_eq!(ensure_log_dir(&dir), dir);
    }
}
