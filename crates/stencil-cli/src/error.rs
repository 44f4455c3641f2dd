//! CLI errors: what went wrong, what to try next, and which exit code
//! the process ends with.

use std::error::Error;

use owo_colors::{OwoColorize, Style};
use thiserror::Error;

use stencil_core::error::StencilError;

pub use stencil_core::error::ErrorCategory as CoreCategory;

pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file is unreadable, invalid or could not be written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `stencil-core` or an adapter.
    #[error("Rendering failed: {0}")]
    Core(#[from] StencilError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Next steps shown under the message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Print the file location with 'stencil config path'".into(),
                "Use 'stencil config init --force' to reset to defaults".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { source, .. } => vec![format!(
                "The operating system reported: {source}. Check the path and its permissions"
            )],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Io | CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Message for stderr: the error, its causes when `verbose`, then
    /// suggestions. `color` adds ANSI styling.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: Style| {
            if color {
                text.style(style).to_string()
            } else {
                text.to_owned()
            }
        };

        let mut out = format!(
            "\n{} {}\n",
            paint("\u{2717} Error:", Style::new().red().bold()), // ✗
            paint(&self.to_string(), Style::new().red()),
        );

        if verbose {
            for cause in self.causes() {
                out.push_str(&format!(
                    "  caused by: {}\n",
                    paint(&cause.to_string(), Style::new().dimmed())
                ));
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str(&format!("\n{}\n", paint("Suggestions:", Style::new().yellow().bold())));
            for suggestion in &suggestions {
                out.push_str(&format!("  - {suggestion}\n"));
            }
        }

        if !verbose {
            out.push_str(&format!(
                "\n{}\n",
                paint("Run again with -v for details.", Style::new().dimmed())
            ));
        }

        out
    }

    fn causes(&self) -> impl Iterator<Item = &(dyn Error + 'static)> {
        std::iter::successors(self.source(), |err| (*err).source())
    }

    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!(exit_code = 2, "{self}"),
            ErrorCategory::Configuration => tracing::error!(exit_code = 4, "{self}"),
            ErrorCategory::Internal => tracing::error!(exit_code = 1, "{self}"),
        }

        for cause in self.causes() {
            tracing::debug!("Caused by: {}", cause);
        }
    }
}

/// Coarse classes that decide the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad arguments, or templates that reference undefined variables.
    UserError,
    /// The run was refused before anything changed.
    Configuration,
    /// Filesystem, terminal or other system failures.
    Internal,
}
