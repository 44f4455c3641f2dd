//! # Stencil CLI
//!
//! Renders template trees into a target directory.
//!
//! `main` parses arguments, installs logging, loads configuration and hands
//! off to one handler in [`commands`]. Every failure comes back as a
//! [`CliError`], printed once to stderr and turned into the exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! |  0   | Success (rejected entries are reported, not fatal) |
//! |  1   | Internal / filesystem error                        |
//! |  2   | User / input error, undefined template variable    |
//! |  4   | Configuration error, existing target root          |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument, warn};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod prompt;

fn main() -> ExitCode {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version arrive here too and must exit 0.
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 2 } else { 0 });
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("Failed to initialise logging: {e:#}");
        return ExitCode::from(1);
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    let verbose = cli.global.verbose > 0;
    let result = load_config(&cli).and_then(|config| {
        let output = OutputManager::new(&cli.global, &config);
        run(cli, config, output)
    });

    match result {
        Ok(()) => {
            info!("Stencil completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose),
    }
}

/// Layered configuration, or defaults for commands that must work even
/// when the file is broken.
fn load_config(cli: &Cli) -> CliResult<AppConfig> {
    match AppConfig::load(cli.global.config.as_ref()) {
        Ok(config) => Ok(config),
        Err(e) if !cli.command.needs_config() => {
            warn!("Ignoring unreadable configuration: {e:#}");
            Ok(AppConfig::default())
        }
        Err(e) => Err(CliError::ConfigError {
            message: format!("{e:#}"),
            source: None,
        }),
    }
}

#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Render(cmd) => commands::render::execute(cmd, cli.global, config, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global, config, output),
    }
}

fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();
    eprint!("{}", err.render(verbose, std::io::stderr().is_terminal()));
    ExitCode::from(err.exit_code())
}
