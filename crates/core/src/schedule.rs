//! Rotation schedule parsing
//!
//! A schedule is a comma-separated list of `<interval><unit>:<retention>`
//! tokens, e.g. `1d:7,1w:4,1m:12,1y:4`. Each token becomes one bucket.

use crate::error::{Result, RotateError};
use std::fmt;
use std::str::FromStr;

/// Schedule used when none is configured
pub const DEFAULT_SCHEDULE: &str = "1d:7,1w:4,1m:12,1y:4";

const DAYS_PER_WEEK: u16 = 7;

/// Calendar interval between snapshots of one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequency {
    /// Token text as written in the schedule; names the bucket directory
    pub label: String,
    pub years: u16,
    pub months: u16,
    pub days: u16,
}

/// One bucket: how often to snapshot and how many snapshots to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationRule {
    pub frequency: Frequency,
    /// Maximum snapshots kept in the bucket (0 = unlimited)
    pub retention: u16,
}

/// Ordered list of rotation rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    rules: Vec<RotationRule>,
}

impl Schedule {
    /// Parse a schedule specification
    pub fn parse(spec: &str) -> Result<Self> {
        let rules = spec
            .split(',')
            .map(parse_rule)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Rules in schedule order
    pub fn rules(&self) -> &[RotationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RotationRule {
    fn new(label: &str, years: u16, months: u16, days: u16, retention: u16) -> Self {
        Self {
            frequency: Frequency {
                label: label.to_string(),
                years,
                months,
                days,
            },
            retention,
        }
    }
}

/// The rules of [`DEFAULT_SCHEDULE`]
impl Default for Schedule {
    fn default() -> Self {
        Self {
            rules: vec![
                RotationRule::new("1d", 0, 0, 1, 7),
                RotationRule::new("1w", 0, 0, DAYS_PER_WEEK, 4),
                RotationRule::new("1m", 0, 1, 0, 12),
                RotationRule::new("1y", 1, 0, 0, 4),
            ],
        }
    }
}

impl FromStr for Schedule {
    type Err = RotateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", rule.frequency.label, rule.retention)?;
        }
        Ok(())
    }
}

fn parse_rule(token: &str) -> Result<RotationRule> {
    let parts: Vec<&str> = token.split(':').collect();
    let [freq, retention] = parts.as_slice() else {
        return Err(RotateError::MalformedToken {
            token: token.to_string(),
        });
    };

    let frequency = parse_frequency(freq)?;

    let retention = retention
        .parse::<u16>()
        .map_err(|_| RotateError::InvalidRetention {
            token: token.to_string(),
        })?;

    Ok(RotationRule {
        frequency,
        retention,
    })
}

fn parse_frequency(text: &str) -> Result<Frequency> {
    let invalid = || RotateError::InvalidFrequency {
        token: text.to_string(),
    };

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = text.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let interval: u16 = digits.parse().map_err(|_| invalid())?;

    let mut frequency = Frequency {
        label: text.to_string(),
        years: 0,
        months: 0,
        days: 0,
    };

    match unit {
        "d" => frequency.days = interval,
        "w" => {
            frequency.days = interval.checked_mul(DAYS_PER_WEEK).ok_or_else(invalid)?;
        }
        "m" => frequency.months = interval,
        "y" => frequency.years = interval,
        _ => return Err(invalid()),
    }

    Ok(frequency)
}
