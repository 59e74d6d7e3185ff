//! session-timer: host process for the session timer status item.
//!
//! Resolves the state file path from `~/.session-timer.toml`, runs the
//! coordinator with a terminal presenter, and applies config edits live.
//!
//! ## Subcommands
//!
//! - `watch` (default): keep the status line current until stdin closes
//! - `check`: read the state file once and print what would be shown

mod check;
mod follow;
mod logging;
mod terminal;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use timer_core::{config_path, load_config, Coordinator, TimerConfig};
use tracing::{error, info, warn};

use crate::follow::ConfigFollower;
use crate::terminal::TerminalPresenter;

#[derive(Parser)]
#[command(name = "session-timer")]
#[command(about = "Session countdown status line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the state file and print a status line on every change
    Watch,

    /// Read the state file once and print its classification
    Check,
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let config_path = match config_path() {
        Ok(path) => Some(path),
        Err(err) => {
            warn!(error = %err, "Failed to resolve config path; using defaults");
            None
        }
    };
    let config = config_path
        .as_deref()
        .map(|path| {
            load_config(path).unwrap_or_else(|err| {
                warn!(error = %err, "Failed to load config; using defaults");
                TimerConfig::default()
            })
        })
        .unwrap_or_default()
        .with_env_overrides();

    let target = match config.watch_target() {
        Ok(target) => target,
        Err(err) => {
            error!(error = %err, "Failed to resolve state file path");
            eprintln!("session-timer: {}", err);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => watch(target, config_path),
        Commands::Check => {
            if let Err(err) = check::run(&target) {
                println!("Nothing to show: {}", err);
                std::process::exit(1);
            }
        }
    }
}

fn watch(target: PathBuf, config_path: Option<PathBuf>) {
    let presenter = Box::new(TerminalPresenter::stdout());
    let mut coordinator = match Coordinator::start(target.clone(), presenter) {
        Ok(coordinator) => coordinator,
        Err(err) => {
            error!(error = %err, "Failed to start coordinator");
            std::process::exit(1);
        }
    };

    let follower = config_path
        .zip(dirs::home_dir())
        .and_then(|(path, home)| ConfigFollower::start(path, home, target, coordinator.handle()));

    // The host owns our lifetime: closing stdin means shut down.
    if let Err(err) = io::copy(&mut io::stdin().lock(), &mut io::sink()) {
        warn!(error = %err, "stdin closed with error");
    }

    info!("stdin closed; shutting down");
    if let Some(follower) = follower {
        follower.stop();
    }
    coordinator.shutdown();
}
