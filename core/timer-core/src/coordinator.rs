//! Change coordination for the state file.
//!
//! # Architecture: Single-Owner Actor
//!
//! Two sources race to tell us the file changed: a directory observer and a
//! fixed 60s poll. Neither touches presentation state directly. Everything
//! funnels into one coordinator thread over an mpsc channel:
//!
//! ```text
//! DirWatcher callback ─┐
//! poll deadline ───────┤
//! reader thread ───────┼──► coordinator thread ──► RefreshScheduler ──► StatusPresenter
//! CoordinatorHandle ───┘         (owns target, observer, presenter)
//! ```
//!
//! The coordinator thread never blocks on the file. Each read runs on a
//! short-lived reader thread and reports back with `ReadDone`; the
//! [`RefreshScheduler`] decides whether that result still counts and whether a
//! trailing read is owed.
//!
//! # Failure Policy
//!
//! Unreadable file, malformed JSON, invalid shape, or no observer: log at debug
//! or warn and keep the last presentation. The status item never shows an error.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Result, TimerError};
use crate::parser;
use crate::presenter::StatusPresenter;
use crate::scheduler::{Completion, RefreshScheduler, RefreshTicket};
use crate::source::{FileSource, StateSource};
use crate::tier;
use crate::types::Presentation;
use crate::watcher::DirWatcher;

/// Fallback poll interval. The observer handles most updates; this catches
/// missed events and platforms where the observer is unavailable.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

const STATUS_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub poll_interval: Duration,
    /// When false, never install a filesystem observer (polling only).
    pub watch_filesystem: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            watch_filesystem: true,
        }
    }
}

/// How changes to the current target are being detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Between targets, or shut down.
    Uninitialized,
    Watching,
    /// Observer install failed; the poll timer is the only trigger.
    PollingOnly,
}

/// Diagnostic snapshot of the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorStatus {
    pub target: PathBuf,
    pub mode: WatchMode,
    pub refresh_in_flight: bool,
    /// A trigger arrived during the in-flight read; one trailing read follows.
    pub refresh_pending: bool,
    pub refreshes_started: u64,
    pub stale_reads_discarded: u64,
    pub publishes: u64,
    pub last_published: Option<Presentation>,
    pub last_published_at: Option<DateTime<Utc>>,
}

enum Message {
    FsChanged {
        epoch: u64,
    },
    RefreshRequested,
    ReadDone {
        ticket: RefreshTicket,
        result: io::Result<Vec<u8>>,
    },
    SetTarget(PathBuf),
    Status(Sender<CoordinatorStatus>),
    Shutdown,
}

/// Cloneable sender side of a running coordinator.
///
/// All methods are fire-and-forget; after shutdown they quietly do nothing.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: Sender<Message>,
}

impl CoordinatorHandle {
    /// Replaces the watch target. The old observer is dropped, the new path is
    /// refreshed immediately, and reads still running against the old path are
    /// discarded when they finish.
    pub fn set_target(&self, target: PathBuf) {
        let _ = self.tx.send(Message::SetTarget(target));
    }

    /// Asks for a refresh as if a trigger had fired.
    pub fn request_refresh(&self) {
        let _ = self.tx.send(Message::RefreshRequested);
    }

    /// Returns a snapshot, or `None` if the coordinator is gone or unresponsive.
    pub fn status(&self) -> Option<CoordinatorStatus> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx.send(Message::Status(reply_tx)).ok()?;
        reply_rx.recv_timeout(STATUS_REPLY_TIMEOUT).ok()
    }
}

/// Owns the coordinator thread. Dropping it shuts the coordinator down.
pub struct Coordinator {
    handle: CoordinatorHandle,
    thread: Option<JoinHandle<()>>,
}

impl Coordinator {
    /// Starts coordinating `target` with the default file source and options.
    pub fn start(target: PathBuf, presenter: Box<dyn StatusPresenter>) -> Result<Self> {
        Self::start_with(
            target,
            presenter,
            Arc::new(FileSource),
            CoordinatorOptions::default(),
        )
    }

    pub fn start_with(
        target: PathBuf,
        presenter: Box<dyn StatusPresenter>,
        source: Arc<dyn StateSource>,
        options: CoordinatorOptions,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let actor_tx = tx.clone();

        let thread = thread::Builder::new()
            .name("session-timer-coordinator".to_string())
            .spawn(move || Actor::new(target, presenter, source, options, actor_tx).run(rx))
            .map_err(|err| TimerError::io("Failed to spawn coordinator thread", err))?;

        Ok(Self {
            handle: CoordinatorHandle { tx },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub fn set_target(&self, target: PathBuf) {
        self.handle.set_target(target);
    }

    pub fn request_refresh(&self) {
        self.handle.request_refresh();
    }

    pub fn status(&self) -> Option<CoordinatorStatus> {
        self.handle.status()
    }

    /// Stops the poll timer, closes the observer, and releases the presenter.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.handle.tx.send(Message::Shutdown);
            if thread.join().is_err() {
                warn!("Coordinator thread panicked before shutdown");
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Actor {
    target: PathBuf,
    mode: WatchMode,
    watcher: Option<DirWatcher>,
    scheduler: RefreshScheduler,
    presenter: Option<Box<dyn StatusPresenter>>,
    source: Arc<dyn StateSource>,
    options: CoordinatorOptions,
    tx: Sender<Message>,
    next_tick: Instant,
    refreshes_started: u64,
    stale_reads_discarded: u64,
    publishes: u64,
    last_published: Option<Presentation>,
    last_published_at: Option<DateTime<Utc>>,
}

impl Actor {
    fn new(
        target: PathBuf,
        presenter: Box<dyn StatusPresenter>,
        source: Arc<dyn StateSource>,
        options: CoordinatorOptions,
        tx: Sender<Message>,
    ) -> Self {
        let next_tick = Instant::now() + options.poll_interval;
        Self {
            target,
            mode: WatchMode::Uninitialized,
            watcher: None,
            scheduler: RefreshScheduler::new(),
            presenter: Some(presenter),
            source,
            options,
            tx,
            next_tick,
            refreshes_started: 0,
            stale_reads_discarded: 0,
            publishes: 0,
            last_published: None,
            last_published_at: None,
        }
    }

    fn run(mut self, rx: Receiver<Message>) {
        info!(path = %self.target.display(), "Session timer coordinator started");
        // Observer first: a write landing during the activation read must
        // still produce a trailing refresh.
        self.install_observer(false);
        self.trigger("activation");

        loop {
            let wait = self.next_tick.saturating_duration_since(Instant::now());
            match rx.recv_timeout(wait) {
                Ok(Message::Shutdown) => break,
                Ok(message) => self.handle(message),
                Err(RecvTimeoutError::Timeout) => self.on_tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.teardown();
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::FsChanged { epoch } => {
                if self.scheduler.is_current(epoch) {
                    self.trigger("filesystem");
                } else {
                    debug!(epoch, "Ignoring event from superseded observer");
                }
            }
            Message::RefreshRequested => self.trigger("request"),
            Message::ReadDone { ticket, result } => self.finish(ticket, result),
            Message::SetTarget(target) => self.retarget(target),
            Message::Status(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Message::Shutdown => {}
        }
    }

    fn on_tick(&mut self) {
        self.next_tick = Instant::now() + self.options.poll_interval;
        if self.mode == WatchMode::PollingOnly && self.options.watch_filesystem {
            // The directory may exist by now.
            self.install_observer(true);
        }
        self.trigger("timer");
    }

    fn trigger(&mut self, reason: &'static str) {
        match self.scheduler.request() {
            Some(ticket) => self.spawn_read(ticket),
            None => debug!(reason, "Refresh in flight; marked pending"),
        }
    }

    fn spawn_read(&mut self, ticket: RefreshTicket) {
        self.refreshes_started += 1;

        let path = self.target.clone();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("session-timer-read".to_string())
            .spawn(move || {
                let result = source.read(&path);
                let _ = tx.send(Message::ReadDone { ticket, result });
            });

        if let Err(err) = spawned {
            warn!(error = %err, "Failed to spawn reader thread; reading inline");
            let result = self.source.read(&self.target);
            self.finish(ticket, result);
        }
    }

    fn finish(&mut self, ticket: RefreshTicket, result: io::Result<Vec<u8>>) {
        match self.scheduler.complete(ticket) {
            Completion::Stale => {
                self.stale_reads_discarded += 1;
                debug!(epoch = ticket.epoch, "Discarding read from superseded target");
            }
            Completion::Current { next } => {
                self.apply(result);
                if let Some(next) = next {
                    self.spawn_read(next);
                }
            }
        }
    }

    fn apply(&mut self, result: io::Result<Vec<u8>>) {
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                debug!(
                    error = %err,
                    path = %self.target.display(),
                    "State file unreadable; keeping last presentation"
                );
                return;
            }
        };

        let state = match parser::parse(&raw) {
            Ok(state) => state,
            Err(err) => {
                debug!(error = %err, "State file not ready; keeping last presentation");
                return;
            }
        };

        let presentation = tier::classify(&state);
        if self.last_published.as_ref() == Some(&presentation) {
            return;
        }

        if let Some(presenter) = self.presenter.as_mut() {
            presenter.publish(&presentation);
        }
        debug!(
            tier = presentation.tier.as_str(),
            text = %presentation.text,
            "Published session timer"
        );
        self.publishes += 1;
        self.last_published_at = Some(Utc::now());
        self.last_published = Some(presentation);
    }

    fn retarget(&mut self, target: PathBuf) {
        if target == self.target {
            self.trigger("retarget");
            return;
        }

        info!(
            from = %self.target.display(),
            to = %target.display(),
            "Watch target changed"
        );

        // Old observer goes first so its events can't interleave with the new one's.
        self.watcher = None;
        self.mode = WatchMode::Uninitialized;
        self.target = target;

        // New epoch before the observer, so its events are stamped current.
        let ticket = self.scheduler.retarget();
        self.install_observer(false);
        self.spawn_read(ticket);
    }

    fn install_observer(&mut self, quiet: bool) {
        if !self.options.watch_filesystem {
            self.mode = WatchMode::PollingOnly;
            return;
        }

        let epoch = self.scheduler.epoch();
        let tx = self.tx.clone();
        let installed = DirWatcher::install(&self.target, move || {
            let _ = tx.send(Message::FsChanged { epoch });
        });

        match installed {
            Ok(watcher) => {
                debug!(dir = %watcher.dir().display(), "Observing state file directory");
                self.watcher = Some(watcher);
                self.mode = WatchMode::Watching;
            }
            Err(err) => {
                if quiet {
                    debug!(error = %err, "Filesystem observer still unavailable");
                } else {
                    warn!(error = %err, "Filesystem observer unavailable; polling only");
                }
                self.mode = WatchMode::PollingOnly;
            }
        }
    }

    fn teardown(&mut self) {
        self.watcher = None;
        self.mode = WatchMode::Uninitialized;
        if let Some(mut presenter) = self.presenter.take() {
            presenter.release();
        }
        info!("Session timer coordinator stopped");
    }

    fn snapshot(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            target: self.target.clone(),
            mode: self.mode,
            refresh_in_flight: self.scheduler.in_flight(),
            refresh_pending: self.scheduler.pending(),
            refreshes_started: self.refreshes_started,
            stale_reads_discarded: self.stale_reads_discarded,
            publishes: self.publishes,
            last_published: self.last_published.clone(),
            last_published_at: self.last_published_at,
        }
    }
}
