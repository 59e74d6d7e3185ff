//! Configuration loading and state file path resolution.
//!
//! The only setting is where the state file lives. It comes from
//! `~/.session-timer.toml`, can be overridden per process with
//! `SESSION_TIMER_FILE`, and falls back to `~/.session-timer`:
//!
//! ```toml
//! state_file = "~/work/.session-timer"
//! ```
//!
//! Nothing here checks that the state file exists. A missing file just means
//! nothing gets published until it appears.

use std::env;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::Deserialize;

use crate::error::{Result, TimerError};

pub const DEFAULT_STATE_FILE_NAME: &str = ".session-timer";
pub const CONFIG_FILE_NAME: &str = ".session-timer.toml";

/// Overrides the configured state file path.
pub const STATE_FILE_ENV: &str = "SESSION_TIMER_FILE";
/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SESSION_TIMER_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimerConfig {
    #[serde(default)]
    pub state_file: Option<String>,
}

impl TimerConfig {
    /// Applies `SESSION_TIMER_FILE` on top of the file setting.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var(STATE_FILE_ENV) {
            if !value.trim().is_empty() {
                self.state_file = Some(value);
            }
        }
        self
    }

    /// Resolves the watch target against the current user's home directory.
    pub fn watch_target(&self) -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(TimerError::HomeDirNotFound)?;
        Ok(resolve_state_path(self.state_file.as_deref(), &home))
    }
}

/// Returns the path to the config file (`SESSION_TIMER_CONFIG` or `~/.session-timer.toml`).
pub fn config_path() -> Result<PathBuf> {
    if let Ok(value) = env::var(CONFIG_PATH_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    let home = dirs::home_dir().ok_or(TimerError::HomeDirNotFound)?;
    Ok(home.join(CONFIG_FILE_NAME))
}

/// Loads the config file, returning defaults if it doesn't exist.
pub fn load_config(path: &Path) -> Result<TimerConfig> {
    if !path.exists() {
        return Ok(TimerConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|err| TimerError::io("Failed to read config file", err))?;
    toml::from_str::<TimerConfig>(&content).map_err(|err| TimerError::ConfigMalformed {
        path: path.to_path_buf(),
        details: err.to_string(),
    })
}

/// Turns the configured setting into an absolute state file path.
///
/// Blank or unset → `{home}/.session-timer`; `~` and `~/…` expand to `home`;
/// relative paths are taken relative to `home`.
pub fn resolve_state_path(setting: Option<&str>, home: &Path) -> PathBuf {
    let setting = match setting.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return home.join(DEFAULT_STATE_FILE_NAME),
    };

    if setting == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = setting.strip_prefix("~/") {
        return home.join(rest);
    }

    let path = Path::new(setting);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}
