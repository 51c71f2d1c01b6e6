//! Flag handling, precondition errors, and exit codes

use crate::common::Workspace;
use crate::rotate;
use anyhow::Result;

#[test]
fn test_version_flag() -> Result<()> {
    let ws = Workspace::new();

    let result = rotate!(ws.path(), "--version").assert_success()?;

    assert_eq!(result.stdout, format!("{}\n", env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn test_help_exits_zero() -> Result<()> {
    let ws = Workspace::new();

    let result = rotate!(ws.path(), "--help").assert_success()?;

    assert!(result.contains_stdout("--schedule"));
    Ok(())
}

#[test]
fn test_no_args_defaults_to_same_path() -> Result<()> {
    let ws = Workspace::new();

    let result = rotate!(ws.path()).assert_failure()?;

    assert!(result.contains_stderr("cannot be the same as the source path"));
    assert!(result.contains_stderr("Usage:"));
    Ok(())
}

#[test]
fn test_nonexistent_source() -> Result<()> {
    let ws = Workspace::new();

    let result = rotate!(ws.path(), "foo").assert_failure()?;

    assert!(result.contains_stderr("does not exist"));
    Ok(())
}

#[test]
fn test_nonexistent_target() -> Result<()> {
    let ws = Workspace::new();
    ws.mkdir("foo");

    let result = rotate!(ws.path(), "foo", "bar").assert_failure()?;

    assert!(result.contains_stderr("Target path"));
    assert!(result.contains_stderr("does not exist"));
    Ok(())
}

#[test]
fn test_target_must_be_directory() -> Result<()> {
    let ws = Workspace::new();
    ws.mkdir("foo");
    ws.create_files(".", &["bar"]);

    let result = rotate!(ws.path(), "foo", "bar").assert_failure()?;

    assert!(result.contains_stderr("must be a directory"));
    Ok(())
}

#[test]
fn test_same_source_and_target_after_normalizing() -> Result<()> {
    let ws = Workspace::new();
    ws.mkdir("foo");

    let result = rotate!(ws.path(), "foo", "./foo/../foo").assert_failure()?;

    assert!(result.contains_stderr("cannot be the same as the source path"));
    Ok(())
}

#[test]
fn test_target_inside_source_is_rejected() -> Result<()> {
    let ws = Workspace::new();
    ws.create_files("foo", &["fileA"]);
    ws.mkdir("foo/backups");

    let result = rotate!(ws.path(), "foo", "foo/backups").assert_failure()?;

    assert!(result.contains_stderr("cannot be inside the source path"));
    assert!(ws.tree("foo/backups").is_empty());
    Ok(())
}

#[test]
fn test_invalid_schedule_values() -> Result<()> {
    let ws = Workspace::new();
    ws.mkdir("foo");
    ws.mkdir("bar");

    let examples = [
        ("zd:7", "Frequency must be an integer followed by 'd', 'w', 'm', or 'y'"),
        ("1z:7", "Frequency must be an integer followed by 'd', 'w', 'm', or 'y'"),
        ("1d:z", "Number of rotations to retain must be specified as an integer"),
        ("1d:7;2w;4", "Number of rotations to retain must be specified as an integer"),
        ("1d", "Colon delimiter not found"),
    ];

    for (schedule, expected) in examples {
        let flag = format!("--schedule={}", schedule);
        let result = rotate!(ws.path(), flag.as_str(), "foo", "bar").assert_failure()?;

        assert!(result.contains_stderr("Could not parse schedule"), "{schedule}");
        assert!(result.contains_stderr(expected), "{schedule}: {}", result.stderr);
    }

    // Parse errors abort before any bucket is created
    assert!(ws.tree("bar").is_empty());
    Ok(())
}

#[test]
fn test_invalid_date_format() -> Result<()> {
    let ws = Workspace::new();
    ws.mkdir("foo");
    ws.mkdir("bar");

    let result = rotate!(ws.path(), "--format=%Y/%m/%d", "foo", "bar").assert_failure()?;

    assert!(result.contains_stderr("Invalid date format"));
    Ok(())
}

#[test]
fn test_unknown_flag_exits_one() -> Result<()> {
    let ws = Workspace::new();

    let result = rotate!(ws.path(), "--bogus").assert_failure()?;

    assert!(result.contains_stderr("--bogus"));
    Ok(())
}

#[test]
fn test_missing_config_file() -> Result<()> {
    let ws = Workspace::new();
    ws.mkdir("foo");
    ws.mkdir("bar");

    let result = rotate!(ws.path(), "--config", "absent.toml", "foo", "bar").assert_failure()?;

    assert!(result.contains_stderr("Failed to read config file"));
    Ok(())
}
