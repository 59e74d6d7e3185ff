//! Integration tests driving the coordinator against real files.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use timer_core::{
    Coordinator, CoordinatorOptions, CoordinatorStatus, DirWatcher, DisplayTier, FileSource,
    Presentation, StatusPresenter, WatchMode,
};

#[derive(Clone, Default)]
struct Recorder {
    published: Arc<Mutex<Vec<Presentation>>>,
}

impl Recorder {
    fn published(&self) -> Vec<Presentation> {
        self.published.lock().expect("published lock").clone()
    }

    fn last(&self) -> Option<Presentation> {
        self.published().last().cloned()
    }
}

impl StatusPresenter for Recorder {
    fn publish(&mut self, presentation: &Presentation) {
        self.published
            .lock()
            .expect("published lock")
            .push(presentation.clone());
    }
}

fn start(target: &Path, recorder: &Recorder, options: CoordinatorOptions) -> Coordinator {
    Coordinator::start_with(
        target.to_path_buf(),
        Box::new(recorder.clone()),
        Arc::new(FileSource),
        options,
    )
    .expect("start coordinator")
}

fn watching() -> CoordinatorOptions {
    CoordinatorOptions {
        poll_interval: Duration::from_secs(3600),
        watch_filesystem: true,
    }
}

fn polling(interval: Duration) -> CoordinatorOptions {
    CoordinatorOptions {
        poll_interval: interval,
        watch_filesystem: false,
    }
}

fn write_state(path: &Path, contents: &str) {
    fs_err::write(path, contents).expect("write state file");
}

/// Publishes the way most producers do: temp file, then rename over the target.
fn replace_state(path: &Path, contents: &str) {
    let tmp = path.with_extension("tmp");
    fs_err::write(&tmp, contents).expect("write temp state file");
    fs_err::rename(&tmp, path).expect("rename state file");
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

fn wait_idle(coordinator: &Coordinator) -> CoordinatorStatus {
    let mut last = None;
    let idle = wait_until(|| {
        last = coordinator.status();
        last.as_ref().map_or(false, |status| !status.refresh_in_flight)
    });
    assert!(idle, "coordinator never went idle");
    last.expect("status")
}

/// Some sandboxes have no inotify; observer-driven tests bail out there.
fn observer_available(dir: &Path) -> bool {
    DirWatcher::install(&dir.join("observer-check"), || {}).is_ok()
}

#[test]
fn test_activation_publishes_existing_state() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let target = temp_dir.path().join(".session-timer");
    write_state(&target, r#"{"minutes_left": 95.7, "preserve": false}"#);

    let recorder = Recorder::default();
    let _coordinator = start(&target, &recorder, polling(Duration::from_secs(3600)));

    assert!(wait_until(|| recorder.published().len() == 1));
    let presentation = recorder.last().expect("presentation");
    assert_eq!(presentation.tier, DisplayTier::Normal);
    assert_eq!(presentation.text, "1h35m");
}

#[test]
fn test_missing_file_publishes_nothing() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let target = temp_dir.path().join(".session-timer");

    let recorder = Recorder::default();
    let coordinator = start(&target, &recorder, polling(Duration::from_secs(3600)));

    let status = wait_idle(&coordinator);
    assert_eq!(status.refreshes_started, 1);
    assert_eq!(status.publishes, 0);
    assert!(recorder.published().is_empty());
}

#[test]
fn test_poll_timer_picks_up_new_file() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let target = temp_dir.path().join(".session-timer");

    let recorder = Recorder::default();
    let coordinator = start(&target, &recorder, polling(Duration::from_millis(50)));
    assert_eq!(
        coordinator.status().expect("status").mode,
        WatchMode::PollingOnly
    );

    write_state(&target, r#"{"minutes_left": 10, "preserve": false}"#);
    assert!(wait_until(|| recorder.published().len() == 1));

    let presentation = recorder.last().expect("presentation");
    assert_eq!(presentation.tier, DisplayTier::Urgent);
    assert_eq!(presentation.text, "0h10m");
}

#[test]
fn test_observer_picks_up_writes_and_renames() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    if !observer_available(temp_dir.path()) {
        return;
    }
    let target = temp_dir.path().join(".session-timer");

    let recorder = Recorder::default();
    let coordinator = start(&target, &recorder, watching());
    assert_eq!(wait_idle(&coordinator).mode, WatchMode::Watching);

    write_state(&target, r#"{"minutes_left": 45, "preserve": false}"#);
    assert!(wait_until(|| recorder.published().len() == 1));
    assert_eq!(
        recorder.last().map(|p| p.tier),
        Some(DisplayTier::Warning)
    );

    replace_state(&target, r#"{"preserve": true}"#);
    assert!(wait_until(|| recorder.published().len() == 2));
    assert_eq!(
        recorder.last().map(|p| p.tier),
        Some(DisplayTier::Infinite)
    );
}

#[test]
fn test_sibling_files_do_not_trigger_refresh() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    if !observer_available(temp_dir.path()) {
        return;
    }
    let target = temp_dir.path().join(".session-timer");
    write_state(&target, r#"{"minutes_left": 80, "preserve": false}"#);

    let recorder = Recorder::default();
    let coordinator = start(&target, &recorder, watching());
    assert!(wait_until(|| recorder.published().len() == 1));
    let before = wait_idle(&coordinator).refreshes_started;

    write_state(&temp_dir.path().join("notes.txt"), "unrelated");
    write_state(&temp_dir.path().join(".session-timer.bak"), "{}");
    thread::sleep(Duration::from_millis(300));

    assert_eq!(wait_idle(&coordinator).refreshes_started, before);
}

#[test]
fn test_malformed_write_keeps_presentation() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let target = temp_dir.path().join(".session-timer");
    write_state(&target, r#"{"minutes_left": 35, "preserve": false}"#);

    let recorder = Recorder::default();
    let coordinator = start(&target, &recorder, polling(Duration::from_secs(3600)));
    assert!(wait_until(|| recorder.published().len() == 1));

    write_state(&target, r#"{"minutes_le"#);
    coordinator.request_refresh();
    wait_idle(&coordinator);

    write_state(&target, r#"{"minutes_left": 5}"#);
    coordinator.request_refresh();
    let status = wait_idle(&coordinator);

    assert_eq!(status.publishes, 1);
    assert_eq!(recorder.published().len(), 1);
    assert_eq!(recorder.last().map(|p| p.text), Some("0h35m".to_string()));
}

#[test]
fn test_retarget_refreshes_new_path_and_ignores_old() {
    let old_dir = tempfile::tempdir().expect("old dir");
    let new_dir = tempfile::tempdir().expect("new dir");
    let old_target = old_dir.path().join(".session-timer");
    let new_target = new_dir.path().join(".session-timer");
    write_state(&old_target, r#"{"minutes_left": 10, "preserve": false}"#);
    write_state(&new_target, r#"{"preserve": true}"#);

    let recorder = Recorder::default();
    let coordinator = start(&old_target, &recorder, watching());
    assert!(wait_until(|| recorder.published().len() == 1));
    assert_eq!(recorder.last().map(|p| p.tier), Some(DisplayTier::Urgent));

    coordinator.set_target(new_target.clone());
    assert!(wait_until(|| recorder.published().len() == 2));
    assert_eq!(
        recorder.last().map(|p| p.tier),
        Some(DisplayTier::Infinite)
    );

    // Changes at the old path must not reach the status item any more.
    write_state(&old_target, r#"{"minutes_left": 95, "preserve": false}"#);
    thread::sleep(Duration::from_millis(300));
    coordinator.request_refresh();
    let status = wait_idle(&coordinator);

    assert_eq!(status.target, new_target);
    assert_eq!(recorder.published().len(), 2);
    assert_eq!(
        recorder.last().map(|p| p.tier),
        Some(DisplayTier::Infinite)
    );
}

#[test]
fn test_missing_directory_degrades_to_polling() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let state_dir: PathBuf = temp_dir.path().join("not-yet");
    let target = state_dir.join(".session-timer");

    let recorder = Recorder::default();
    let coordinator = start(
        &target,
        &recorder,
        CoordinatorOptions {
            poll_interval: Duration::from_millis(50),
            watch_filesystem: true,
        },
    );
    assert_eq!(
        coordinator.status().expect("status").mode,
        WatchMode::PollingOnly
    );

    fs_err::create_dir_all(&state_dir).expect("create state dir");
    write_state(&target, r#"{"minutes_left": 61, "preserve": false}"#);
    assert!(wait_until(|| recorder.published().len() == 1));
    assert_eq!(recorder.last().map(|p| p.text), Some("1h01m".to_string()));

    if observer_available(temp_dir.path()) {
        assert!(wait_until(|| coordinator
            .status()
            .map_or(false, |status| status.mode == WatchMode::Watching)));
    }
}
