//! Snapshot directory naming
//!
//! Snapshot names are timestamps rendered with a strftime pattern. The same
//! pattern parses names back, and its resolution bounds how precisely "now"
//! is compared against existing snapshots: with `%Y-%m-%d`, every run on the
//! same day sees the same instant (midnight).

use crate::error::{Result, RotateError};
use chrono::format::{parse, Item, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write;

/// Pattern used when none is configured (e.g. `2024-01-31`)
pub const DEFAULT_FORMAT: &str = "%Y-%m-%d";

/// A validated date pattern for naming and reading snapshot directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFormat {
    pattern: String,
}

impl SnapshotFormat {
    /// Validate a strftime pattern
    ///
    /// The pattern must render a non-empty, single-component directory name
    /// and must be able to parse its own output.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let invalid = |reason: &str| RotateError::InvalidDateFormat {
            pattern: pattern.clone(),
            reason: reason.to_string(),
        };

        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unrecognized format specifier"));
        }

        let format = Self {
            pattern: pattern.clone(),
        };

        let sample = NaiveDate::from_ymd_opt(2006, 1, 2)
            .and_then(|d| d.and_hms_opt(15, 4, 5))
            .ok_or_else(|| invalid("cannot build sample date"))?;
        let name = format
            .format(&sample)
            .map_err(|_| invalid("pattern cannot be rendered for a local date"))?;

        if name.is_empty() {
            return Err(invalid("pattern renders an empty name"));
        }
        if name.contains(std::path::is_separator) || name == "." || name == ".." {
            return Err(invalid("pattern must render a single directory name"));
        }
        if format.parse(&name).is_none() {
            return Err(invalid("rendered names cannot be parsed back"));
        }

        Ok(format)
    }

    /// The strftime pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render a snapshot directory name
    pub fn format(&self, time: &NaiveDateTime) -> Result<String> {
        let mut name = String::new();
        write!(name, "{}", time.format(&self.pattern)).map_err(|_| {
            RotateError::InvalidDateFormat {
                pattern: self.pattern.clone(),
                reason: "pattern cannot be rendered for a local date".to_string(),
            }
        })?;
        Ok(name)
    }

    /// Parse a snapshot directory name
    ///
    /// Fields the pattern does not carry default to the start of the period:
    /// a missing day is the 1st, a missing time is midnight.
    pub fn parse(&self, name: &str) -> Option<NaiveDateTime> {
        let mut parsed = Parsed::new();
        parse(&mut parsed, name, StrftimeItems::new(&self.pattern)).ok()?;

        let date = match parsed.to_naive_date() {
            Ok(date) => date,
            Err(_) => {
                // Setting a field the name already carried fails unless the
                // values agree, which leaves the parsed value in place
                parsed.set_month(1).ok();
                parsed.set_day(1).ok();
                parsed.to_naive_date().ok()?
            }
        };

        let time = match parsed.to_naive_time() {
            Ok(time) => time,
            Err(_) => {
                // An hour without minutes still resolves; no hour at all is midnight
                parsed.set_minute(0).ok();
                parsed.to_naive_time().unwrap_or(NaiveTime::MIN)
            }
        };

        Some(date.and_time(time))
    }

    /// Reduce `time` to the pattern's resolution
    pub fn truncate(&self, time: &NaiveDateTime) -> Result<NaiveDateTime> {
        let name = self.format(time)?;
        self.parse(&name).ok_or_else(|| RotateError::InvalidDateFormat {
            pattern: self.pattern.clone(),
            reason: format!("rendered name {name:?} cannot be parsed back"),
        })
    }
}

impl Default for SnapshotFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_FORMAT.to_string(),
        }
    }
}
