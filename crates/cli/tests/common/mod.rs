//! Common utilities for integration tests

pub mod cli;

// Re-export commonly used items
pub use fixtures::{date_days_ago, date_months_ago, date_years_ago, Workspace};
