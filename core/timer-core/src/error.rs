//! Error types for timer-core operations.
//!
//! None of these ever reach the status item. The coordinator logs them and keeps
//! the last good presentation; only the host binary's startup path looks at them.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// State File Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a state file's bytes did not produce a [`SessionState`](crate::SessionState).
///
/// Both variants mean "no update": the producer may be mid-write, or the file may
/// not be ready yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Not decodable as JSON (empty, truncated, not UTF-8, not JSON at all).
    #[error("state file is not valid JSON: {0}")]
    Malformed(String),

    /// Valid JSON that does not satisfy the session state invariant.
    #[error("state file has an invalid shape: {0}")]
    InvalidShape(&'static str),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Internal Error
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can occur in timer-core operations.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // State File Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    // ─────────────────────────────────────────────────────────────────────
    // Observer Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to watch {path}: {source}")]
    ObserverInstall {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Cannot watch {0}: path has no parent directory or file name")]
    UnwatchablePath(PathBuf),
}

/// Convenience type alias for Results using TimerError.
pub type Result<T> = std::result::Result<T, TimerError>;

impl TimerError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TimerError::Io {
            context: context.into(),
            source,
        }
    }
}
