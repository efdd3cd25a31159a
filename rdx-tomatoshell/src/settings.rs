//! Shell settings, layered from an optional `shell.toml` and `TOMATO_*`
//! environment variables.

use anyhow::Result;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use tomato::storage;

/// File name of the optional settings file inside the app directory.
pub const SETTINGS_FILE_NAME: &str = "shell.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ShellSettings {
    /// An `EnvFilter` directive such as `warn` or `tomato=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Overrides where `config.json` and `stats.json` are kept.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Skips the startup banner.
    #[serde(default)]
    pub quiet: bool,

    /// Prints a line whenever a phase finishes on its own.
    #[serde(default = "default_true")]
    pub notify: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

impl ShellSettings {
    /// Loads settings from `<app dir>/shell.toml` (if present) and the environment.
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();
        if let Ok(dir) = storage::app_dir() {
            builder = builder.add_source(File::from(dir.join(SETTINGS_FILE_NAME)).required(false));
        }
        Self::from_builder(builder.add_source(Environment::with_prefix("TOMATO").try_parsing(true)))
    }

    fn from_builder(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// The directory holding the timer's JSON stores.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(storage::app_dir()?),
        }
    }
}
