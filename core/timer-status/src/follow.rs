//! Live configuration reload.
//!
//! Watches the config file's directory and, whenever the config file changes,
//! re-resolves the state file path. The coordinator is only retargeted when the
//! resolved path actually differs. Deleting the config file reverts to the
//! default path.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use timer_core::{
    load_config, resolve_state_path, CoordinatorHandle, DirWatcher, Removal, TimerConfig,
};
use tracing::{debug, info, warn};

pub struct ConfigFollower {
    watcher: DirWatcher,
    thread: JoinHandle<()>,
}

impl ConfigFollower {
    /// Starts following `config_path`. Returns `None` if the directory can't be
    /// observed; the current target then stays in effect for the process lifetime.
    pub fn start(
        config_path: PathBuf,
        home: PathBuf,
        current_target: PathBuf,
        coordinator: CoordinatorHandle,
    ) -> Option<Self> {
        let (tx, rx) = mpsc::channel();
        let watcher = match DirWatcher::install_with(&config_path, Removal::Report, move || {
            let _ = tx.send(());
        }) {
            Ok(watcher) => watcher,
            Err(err) => {
                warn!(error = %err, "Config changes will not be applied live");
                return None;
            }
        };

        let thread = thread::spawn(move || {
            let mut current = current_target;
            // Ends when the watcher (and with it the sender) is dropped.
            while rx.recv().is_ok() {
                while rx.try_recv().is_ok() {}
                if let Some(next) = reload_target(&config_path, &home, &current) {
                    info!(path = %next.display(), "Config changed; retargeting");
                    coordinator.set_target(next.clone());
                    current = next;
                }
            }
        });

        Some(Self {
            watcher,
            thread,
        })
    }

    pub fn stop(self) {
        drop(self.watcher);
        let _ = self.thread.join();
    }
}

/// Returns the new target if reloading the config moves it away from `current`.
/// A malformed config keeps the current target; a missing one means defaults.
fn reload_target(config_path: &Path, home: &Path, current: &Path) -> Option<PathBuf> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "Ignoring config change");
            return None;
        }
    };
    resolve_change(config, home, current)
}

fn resolve_change(config: TimerConfig, home: &Path, current: &Path) -> Option<PathBuf> {
    let config = config.with_env_overrides();
    let target = resolve_state_path(config.state_file.as_deref(), home);
    if target == current {
        debug!("Config changed but state file path did not");
        return None;
    }
    Some(target)
}
