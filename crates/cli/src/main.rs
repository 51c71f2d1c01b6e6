//! Rotate CLI - rotate command

use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use rotate_core::{RotationEvent, RotationReport, Rotator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

mod config;
mod util;

/// Rotate - dated snapshots of a file or directory with per-bucket retention
#[derive(Parser)]
#[command(name = "rotate")]
#[command(author, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// File or directory to snapshot (default: the executable's directory)
    source: Option<PathBuf>,

    /// Directory holding the rotation buckets (default: the executable's directory)
    target: Option<PathBuf>,

    /// Rotation schedule and retention, e.g. 1d:7,1w:4,1m:12,1y:4
    #[arg(long, value_name = "SPEC")]
    schedule: Option<String>,

    /// strftime pattern used to name snapshot directories (default: %Y-%m-%d)
    #[arg(long, value_name = "PATTERN")]
    format: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print copy and delete actions
    #[arg(long)]
    verbose: bool,

    /// Print version
    #[arg(long)]
    version: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help goes to stdout with success, real parse errors fail
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let level = std::env::var("ROTATE_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let file_config = config::load(cli.config.as_deref())?;
    let settings = config::resolve(
        config::FlagConfig {
            schedule: cli.schedule,
            format: cli.format,
            verbose: cli.verbose,
        },
        file_config,
    )?;

    let source = resolve_path(cli.source.as_deref())?;
    let target = resolve_path(cli.target.as_deref())?;

    let rotator = Rotator::new(settings.options);
    let verbose = settings.verbose;
    // Printed as they happen so a failing bucket still shows earlier actions
    let report = rotator.run_with(&source, &target, |event| {
        if verbose {
            print_event(event);
        }
    })?;

    if verbose {
        print_summary(&report);
    }

    Ok(())
}

fn resolve_path(arg: Option<&Path>) -> Result<PathBuf> {
    match arg {
        Some(path) => util::absolute(path),
        None => util::executable_dir(),
    }
}

fn print_event(event: &RotationEvent) {
    match event {
        RotationEvent::Copying { from, to } => println!("Copying from {:?} to {:?}", from, to),
        RotationEvent::Deleting { path } => println!("Deleting directory: {}", path.display()),
        RotationEvent::DeleteFailed { path, error } => println!(
            "{} {}: {}",
            "Failed to delete".yellow(),
            path.display(),
            error
        ),
    }
}

fn print_summary(report: &RotationReport) {
    println!(
        "{} {} created, {} deleted",
        "✓".green(),
        report.snapshots_created(),
        report.snapshots_deleted()
    );
}
