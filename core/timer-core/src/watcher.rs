//! Directory-level change notification for a single file.
//!
//! Producers often publish by writing a temp file and renaming it over the
//! target, and a file-level watch loses track of the inode on rename. We watch
//! the parent directory (NonRecursive) instead and filter events down to the
//! target's file name so sibling files never trigger a refresh.
//!
//! Removal of the file is ignored by default: a state file that disappears
//! leaves the last presentation in place. Config following opts in with
//! [`Removal::Report`] so deleting the config falls back to defaults.
//!
//! Dropping a [`DirWatcher`] stops the underlying observer.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{Result, TimerError};

/// Whether removing the watched file counts as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Ignore,
    Report,
}

pub struct DirWatcher {
    dir: PathBuf,
    _watcher: RecommendedWatcher,
}

impl DirWatcher {
    /// Starts observing the parent directory of `target`, calling `on_change`
    /// (on the observer's own thread) for every relevant event.
    pub fn install<F>(target: &Path, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        Self::install_with(target, Removal::Ignore, on_change)
    }

    /// Like [`DirWatcher::install`], with an explicit policy for removals.
    pub fn install_with<F>(target: &Path, removal: Removal, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let (dir, file_name) = split_target(target)?;

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if matches_event(&event, &file_name, removal) {
                    on_change();
                }
            }
        })
        .map_err(|source| TimerError::ObserverInstall {
            path: dir.clone(),
            source,
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| TimerError::ObserverInstall {
                path: dir.clone(),
                source,
            })?;

        Ok(Self {
            dir,
            _watcher: watcher,
        })
    }

    /// The directory being observed.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn split_target(target: &Path) -> Result<(PathBuf, OsString)> {
    let file_name = target
        .file_name()
        .ok_or_else(|| TimerError::UnwatchablePath(target.to_path_buf()))?;
    let dir = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .ok_or_else(|| TimerError::UnwatchablePath(target.to_path_buf()))?;
    Ok((dir.to_path_buf(), file_name.to_os_string()))
}

/// Create, modify, and rename events whose path ends in `file_name`.
///
/// Renames surface as `Modify(Name(_))` in notify, so the modify arm covers them.
pub fn is_relevant(event: &Event, file_name: &OsStr) -> bool {
    matches_event(event, file_name, Removal::Ignore)
}

fn matches_event(event: &Event, file_name: &OsStr, removal: Removal) -> bool {
    let kind_matches = match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => true,
        EventKind::Remove(_) => removal == Removal::Report,
        _ => false,
    };
    if !kind_matches {
        return false;
    }
    event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name))
}
