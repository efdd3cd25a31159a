//! Default phase durations and their JSON-backed store.
//!
//! The store is a write-through cache of `config.json`:
//!
//! ```json
//! {
//!   "work_duration": 1500000000000,
//!   "break_duration": 300000000000
//! }
//! ```
//!
//! Durations are integer nanoseconds. A missing file is created from the
//! defaults handed to [`ConfigStore::open`]; keys missing from an existing
//! file fall back to those same defaults.

use crate::common::duration_nanos;
use crate::error::StoreError;
use crate::storage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// File name of the timer configuration inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// The default lengths of a work phase and a break phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(with = "duration_nanos")]
    pub work_duration: Duration,
    #[serde(with = "duration_nanos")]
    pub break_duration: Duration,
}

impl TimerConfig {
    /// 25 minutes of work, 5 minutes of break.
    pub const DEFAULT: Self = Self {
        work_duration: Duration::from_secs(25 * 60),
        break_duration: Duration::from_secs(5 * 60),
    };
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Owns `config.json` and the configuration loaded from it.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: TimerConfig,
}

impl ConfigStore {
    /// Loads `config.json` from `dir`, creating the directory and writing
    /// `defaults` if the file does not exist.
    pub fn open(dir: &Path, defaults: TimerConfig) -> Result<Self, StoreError> {
        storage::ensure_dir(dir)?;
        let path = dir.join(CONFIG_FILE_NAME);

        match storage::read_if_exists(&path)? {
            Some(text) => {
                let config = merge_over(defaults, &text).map_err(storage::json_error(&path))?;
                debug!("Loaded timer config from {}", path.display());
                Ok(Self { path, config })
            }
            None => {
                let store = Self {
                    path,
                    config: defaults,
                };
                store.save()?;
                info!("Wrote default timer config to {}", store.path.display());
                Ok(store)
            }
        }
    }

    pub fn get(&self) -> TimerConfig {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_work_duration(&mut self, duration: Duration) -> Result<(), StoreError> {
        self.config.work_duration = duration;
        self.save()
    }

    pub fn set_break_duration(&mut self, duration: Duration) -> Result<(), StoreError> {
        self.config.break_duration = duration;
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        storage::write_json(&self.path, &self.config)
    }
}

/// Overlays the keys present in `text` onto `defaults`.
fn merge_over(defaults: TimerConfig, text: &str) -> Result<TimerConfig, serde_json::Error> {
    let stored: Value = serde_json::from_str(text)?;
    let mut merged = serde_json::to_value(defaults)?;
    match (&mut merged, stored) {
        (Value::Object(base), Value::Object(overrides)) => base.extend(overrides),
        (_, Value::Null) => {}
        (_, other) => return serde_json::from_value(other),
    }
    serde_json::from_value(merged)
}
