//! Tracing subscriber setup.
//!
//! The library crates only emit events; this is the one place a subscriber
//! is installed. `-v` flags raise the level for all three stencil crates,
//! `--quiet` lowers it to errors, and `RUST_LOG` replaces the whole filter.

use std::io::IsTerminal as _;
use std::path::Path;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::GlobalArgs;

const CRATES: [&str; 3] = ["stencil_cli", "stencil_core", "stencil_adapters"];

/// Install the global subscriber: stderr always, plus `--log-file` when
/// given. Call once, before anything logs.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| crate_filter(level_for(args)));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    let file_layer = args
        .log_file
        .as_deref()
        .map(open_log_file)
        .transpose()?
        .map(|appender| fmt::layer().with_ansi(false).with_writer(appender));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

fn level_for(args: &GlobalArgs) -> LevelFilter {
    match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    }
}

fn crate_filter(level: LevelFilter) -> EnvFilter {
    let directives: Vec<String> = CRATES.iter().map(|name| format!("{name}={level}")).collect();
    EnvFilter::new(directives.join(","))
}

/// Appender for `path`, never rotated. A bare file name lands in the
/// current directory.
fn open_log_file(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?
        .to_string_lossy()
        .into_owned();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}
