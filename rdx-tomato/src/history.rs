//! The append-only log of finished phases, persisted as `stats.json`.

use crate::common::duration_nanos;
use crate::error::StoreError;
use crate::phase::Phase;
use crate::storage;
use chrono::{DateTime, Local, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// File name of the session history inside the app directory.
pub const HISTORY_FILE_NAME: &str = "stats.json";

/// One completed, skipped or cancelled-partial phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    /// Full length for completed phases, elapsed time for cancelled ones.
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub phase: Phase,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct History {
    #[serde(default)]
    sessions: Vec<SessionRecord>,
}

/// Owns `stats.json` and the records loaded from it.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    history: History,
}

impl HistoryStore {
    /// Loads `stats.json` from `dir`. A missing file is an empty history.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        storage::ensure_dir(dir)?;
        let path = dir.join(HISTORY_FILE_NAME);
        let history: History = match storage::read_if_exists(&path)? {
            Some(text) => serde_json::from_str(&text).map_err(storage::json_error(&path))?,
            None => History::default(),
        };
        debug!(
            "Loaded {} session records from {}",
            history.sessions.len(),
            path.display()
        );
        Ok(Self { path, history })
    }

    /// Appends a record and writes the whole history back to disk.
    ///
    /// The record stays in memory even if the write fails.
    pub fn add(&mut self, record: SessionRecord) -> Result<(), StoreError> {
        self.history.sessions.push(record);
        self.save()
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.history.sessions
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of work records ever logged.
    pub fn total_completed(&self) -> usize {
        self.work_records().count()
    }

    /// Number of work records that started after local midnight today.
    pub fn today_completed(&self) -> usize {
        self.completed_since(local_midnight(Local::now()))
    }

    pub fn completed_since(&self, since: DateTime<Local>) -> usize {
        self.work_records().filter(|s| s.start_time > since).count()
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.history.sessions.clear();
        self.save()
    }

    fn work_records(&self) -> impl Iterator<Item = &SessionRecord> {
        self.history.sessions.iter().filter(|s| s.phase == Phase::Work)
    }

    fn save(&self) -> Result<(), StoreError> {
        storage::write_json(&self.path, &self.history)
    }
}

/// Midnight at the start of `now`'s local calendar day.
fn local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(Local)
        .earliest()
        // midnight skipped by a DST jump
        .unwrap_or_else(|| Local.from_utc_datetime(&midnight))
}
