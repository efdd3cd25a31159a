//! Error types for the tomato library.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or writing the JSON stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The platform reports no per-user config directory.
    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures surfaced by the session orchestrator.
#[derive(Error, Debug)]
pub enum SessionError {
    /// `start` was requested while a phase is paused. The paused phase is
    /// left untouched; the user has to resume or cancel it first.
    #[error("tomato is paused, please /resume or /cancel to start a new one")]
    TimerBusyPaused,

    /// The timer advanced but the change could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}
