//! Output management and formatting.
//!
//! Action events and the run summary go to stdout. Errors, logs and
//! prompts use stderr.

use std::io::{self, IsTerminal, Write};

use console::Term;
use owo_colors::{OwoColorize, Style};
use stencil_adapters::TracingReporter;
use stencil_core::{
    application::ports::Reporter,
    domain::{ActionEvent, ReconciliationOutcome, ScaffoldSummary, Severity},
};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // The flag is taken as given. The configured format (default
        // `human`) falls back to plain text when stdout is not a terminal.
        let resolved_format = match args.output_format {
            OutputFormat::Auto => match OutputFormat::from_config(&config.output.format) {
                OutputFormat::Auto | OutputFormat::Human if !io::stdout().is_terminal() => {
                    OutputFormat::Plain
                }
                OutputFormat::Auto => OutputFormat::Human,
                configured => configured,
            },
            explicit => explicit,
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color || config.output.no_color,
            term: Term::stdout(),
        }
    }

    /// Plain line; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        self.emit(|| msg.to_owned())
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.marked('\u{2713}', msg, Style::new().green()) // ✓
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.marked('\u{26a0}', msg, Style::new().yellow()) // ⚠
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.marked('\u{2139}', msg, Style::new().blue()) // ℹ
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        self.emit(|| self.paint(text, Style::new().cyan().bold()))
    }

    fn marked(&self, mark: char, msg: &str, style: Style) -> io::Result<()> {
        self.emit(|| {
            format!(
                "{} {}",
                self.paint(&mark.to_string(), style.bold()),
                self.paint(msg, style)
            )
        })
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.plain() {
            text.to_owned()
        } else {
            text.style(style).to_string()
        }
    }

    fn emit(&self, line: impl FnOnce() -> String) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(&line())
    }

    /// Final line of a render run. In JSON mode this is a `summary` object.
    pub fn summary(&self, summary: &ScaffoldSummary) -> io::Result<()> {
        if self.resolved_format == OutputFormat::Json {
            let line = serde_json::json!({ "summary": summary });
            return self.term.write_line(&line.to_string());
        }

        let counts = format!(
            "{} created, {} updated, {} skipped, {} rejected",
            summary.created, summary.updated, summary.skipped, summary.rejected
        );
        if summary.rejected > 0 {
            self.warning(&format!("Finished with conflicts: {counts}"))
        } else if summary.is_unchanged() {
            self.info(&format!("Already up to date: {counts}"))
        } else {
            self.success(&format!("Done: {counts}"))
        }
    }

    /// Reporter that prints action events the way this manager prints.
    pub fn reporter(&self) -> ConsoleReporter {
        ConsoleReporter {
            format: self.resolved_format,
            quiet: self.quiet,
            no_color: self.plain(),
            log: TracingReporter::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }

    fn plain(&self) -> bool {
        self.no_color || self.resolved_format != OutputFormat::Human
    }
}

// ── Event stream ──────────────────────────────────────────────────────────────

/// Prints one line per action event on stdout and forwards the event to
/// `tracing`.
///
/// In quiet mode only rejected entries are printed.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    format: OutputFormat,
    quiet: bool,
    no_color: bool,
    log: TracingReporter,
}

impl ConsoleReporter {
    fn line(&self, event: &ActionEvent) -> Option<String> {
        if self.quiet && event.severity() == Severity::Info {
            return None;
        }

        if self.format == OutputFormat::Json {
            let mut value = serde_json::to_value(event).ok()?;
            if let Some(fields) = value.as_object_mut() {
                fields.insert("message".into(), event.message().into());
            }
            return Some(value.to_string());
        }

        if self.no_color {
            return Some(event.to_string());
        }

        let tag = format!("{:>19}", event.action().as_str());
        let tag = match event.outcome() {
            ReconciliationOutcome::Created => tag.green().bold().to_string(),
            ReconciliationOutcome::Updated => tag.yellow().bold().to_string(),
            ReconciliationOutcome::Skipped(_) => tag.blue().to_string(),
            ReconciliationOutcome::Rejected => tag.red().bold().to_string(),
        };
        Some(format!("{} : {}", tag, event.target().display()))
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: &ActionEvent) {
        self.log.report(event);

        if let Some(line) = self.line(event) {
            // A closed stdout must not abort the run halfway.
            let _ = writeln!(io::stdout().lock(), "{line}");
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
