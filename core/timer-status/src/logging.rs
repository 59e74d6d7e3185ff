//! Logging setup for the status process.
//!
//! stdout carries the status line, so logs go to a daily-rolling file under
//! `~/.session-timer.d/logs/`. Falls back to stderr when that directory can't be
//! created.

use std::env;
use std::path::PathBuf;

use fs_err as fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "SESSION_TIMER_DEBUG_LOG";
const LOG_DIR: &str = ".session-timer.d/logs";
const LOG_FILE_PREFIX: &str = "session-timer.log";

/// Installs the global subscriber. Keep the guard alive until exit so buffered
/// lines are flushed.
pub fn init() -> Option<WorkerGuard> {
    let filter = env_filter();

    let Some(dir) = log_dir() else {
        init_stderr(filter);
        return None;
    };

    if let Err(err) = fs::create_dir_all(&dir) {
        init_stderr(filter);
        tracing::warn!(error = %err, "Failed to create log directory; logging to stderr");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Some(guard)
}

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn init_stderr(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_DIR))
}
