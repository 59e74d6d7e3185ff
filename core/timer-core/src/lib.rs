//! # timer-core
//!
//! State-synchronization engine for the session timer status item.
//!
//! An external producer writes a small JSON file with the minutes left in a
//! session (or a flag saying the session is preserved). This crate watches that
//! file, validates what it reads, buckets it into a [`DisplayTier`], and hands a
//! [`Presentation`] to whatever [`StatusPresenter`] the host provides.
//!
//! ## Design Principles
//!
//! - **Passive reader**: never writes the state file, never locks it.
//! - **Fail silent**: unreadable or half-written files keep the last good
//!   presentation. Nothing is published until a read succeeds.
//! - **One owner**: the [`Coordinator`] thread owns the target, the observer,
//!   and the presenter. Everything else sends it messages.
//! - **No async runtime**: plain threads and `std::sync::mpsc`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use timer_core::{Coordinator, TimerConfig};
//!
//! let target = TimerConfig::default().with_env_overrides().watch_target()?;
//! let mut coordinator = Coordinator::start(target, Box::new(my_presenter))?;
//! // ...
//! coordinator.shutdown();
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod parser;
pub mod presenter;
pub mod scheduler;
pub mod source;
pub mod tier;
pub mod types;
pub mod watcher;

pub use config::{config_path, load_config, resolve_state_path, TimerConfig};
pub use coordinator::{
    Coordinator, CoordinatorHandle, CoordinatorOptions, CoordinatorStatus, WatchMode,
    POLL_INTERVAL,
};
pub use error::{ParseError, Result, TimerError};
pub use parser::{parse, read_state};
pub use presenter::{StatusPresenter, STATUS_ICON, STATUS_ITEM_NAME};
pub use source::{FileSource, StateSource};
pub use tier::{classify, format_minutes};
pub use types::{DisplayTier, Presentation, SessionState};
pub use watcher::{DirWatcher, Removal};
