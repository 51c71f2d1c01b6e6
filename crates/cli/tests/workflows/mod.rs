//! Workflow integration tests

pub mod arguments;
