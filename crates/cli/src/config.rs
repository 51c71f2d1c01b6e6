//! Configuration file and flag merging
//!
//! Settings come from three places, highest priority first:
//! 1. Command-line flags
//! 2. A TOML file (`--config <FILE>`, or `<config dir>/rotate/config.toml`)
//! 3. Built-in defaults
//!
//! ```toml
//! schedule = "1d:7,1w:4,1m:12,1y:4"
//! format = "%Y-%m-%d"
//! verbose = false
//! ```

use anyhow::{Context, Result};
use rotate_core::{RotateOptions, Schedule, SnapshotFormat, DEFAULT_FORMAT, DEFAULT_SCHEDULE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of a configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub schedule: Option<String>,
    pub format: Option<String>,
    pub verbose: Option<bool>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct FlagConfig {
    pub schedule: Option<String>,
    pub format: Option<String>,
    pub verbose: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: RotateOptions,
    pub verbose: bool,
}

/// Default config file location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rotate").join("config.toml"))
}

/// Load the explicit config file, or the default one if it exists
pub fn load(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return read(path);
    }

    match config_file_path() {
        Some(path) if path.is_file() => read(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn read(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Merge flags over file values over defaults, then validate
pub fn resolve(flags: FlagConfig, file: FileConfig) -> Result<Settings> {
    let schedule_spec = flags
        .schedule
        .or(file.schedule)
        .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string());
    let pattern = flags
        .format
        .or(file.format)
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

    let schedule = Schedule::parse(&schedule_spec).context("Could not parse schedule")?;
    let format = SnapshotFormat::new(pattern).context("Could not use date format")?;

    Ok(Settings {
        options: RotateOptions { schedule, format },
        verbose: flags.verbose || file.verbose.unwrap_or(false),
    })
}
