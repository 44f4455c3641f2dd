//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stencil_core::domain::{ExistingPolicy, parse_variable};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Render template trees into place, safely and repeatably",
    long_about = "Stencil renders one or more template directory trees into a \
                  target directory. Re-running it only touches what changed, \
                  and existing entries are skipped, confirmed or overwritten \
                  according to the chosen policy.",
    after_help = "EXAMPLES:\n\
        \x20 stencil render templates/app --target +name+ -D name=widget\n\
        \x20 stencil render base overlay --target out --existing overwrite --overwrite-root\n\
        \x20 stencil completions bash > /usr/share/bash-completion/completions/stencil",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render template trees into a target directory.
    #[command(
        visible_alias = "r",
        about = "Render template trees into a target directory",
        after_help = "EXAMPLES:\n\
            \x20 stencil render templates/app --target out -D name=widget\n\
            \x20 stencil render base extra --target out --existing skip --overwrite-root\n\
            \x20 stencil render static --target site --all-templates"
    )]
    Render(RenderArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stencil completions bash > ~/.local/share/bash-completion/completions/stencil\n\
            \x20 stencil completions zsh  > ~/.zfunc/_stencil\n\
            \x20 stencil completions fish > ~/.config/fish/completions/stencil.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Stencil configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stencil config show\n\
            \x20 stencil config path\n\
            \x20 stencil config init --force"
    )]
    Config(ConfigCommands),
}

impl Commands {
    /// Whether a broken configuration file should stop this command.
    /// Commands that locate or rewrite the file run with defaults instead.
    pub fn needs_config(&self) -> bool {
        !matches!(
            self,
            Self::Completions(_) | Self::Config(ConfigCommands::Path | ConfigCommands::Init { .. })
        )
    }
}

// ── render ────────────────────────────────────────────────────────────────────

/// Arguments for `stencil render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template roots, applied in order; later roots overlay earlier ones.
    #[arg(
        value_name = "SOURCE",
        required = true,
        num_args = 1..,
        help = "Template directories to render"
    )]
    pub sources: Vec<PathBuf>,

    /// Target root. May itself contain `+name+` tokens.
    #[arg(
        short = 't',
        long = "target",
        value_name = "DIR",
        help = "Directory to render into"
    )]
    pub target: PathBuf,

    /// Template variables.
    #[arg(
        short = 'D',
        long = "define",
        value_name = "NAME=VALUE",
        value_parser = parse_define,
        help = "Define a template variable (repeatable)"
    )]
    pub defines: Vec<(String, String)>,

    /// What to do with existing entries that differ from their source.
    #[arg(
        short = 'e',
        long = "existing",
        value_name = "POLICY",
        value_enum,
        help = "Policy for differing existing entries [default: from config, else prompt]"
    )]
    pub existing: Option<ExistingArg>,

    /// Allow rendering into a target root that already exists.
    #[arg(long = "overwrite-root", help = "Render into an existing target root")]
    pub overwrite_root: bool,

    /// Suffix marking template files; stripped from output names.
    #[arg(
        long = "suffix",
        value_name = "SUFFIX",
        conflicts_with = "all_templates",
        help = "Template file suffix [default: from config, else .jinja]"
    )]
    pub suffix: Option<String>,

    /// Treat every file as a template.
    #[arg(long = "all-templates", help = "Render every file as a template")]
    pub all_templates: bool,

    /// Glob of file names to leave out.
    #[arg(
        long = "ignore-file",
        value_name = "GLOB",
        help = "Ignore files matching GLOB (repeatable)"
    )]
    pub ignore_files: Vec<String>,

    /// Glob of directory names to leave out.
    #[arg(
        long = "ignore-dir",
        value_name = "GLOB",
        help = "Ignore directories matching GLOB (repeatable)"
    )]
    pub ignore_dirs: Vec<String>,

    /// Drop the configured ignore patterns, keeping only the flags above.
    #[arg(long = "no-default-ignores", help = "Do not apply configured ignore patterns")]
    pub no_default_ignores: bool,
}

/// CLI spelling of [`ExistingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExistingArg {
    /// Leave differing entries alone.
    Skip,
    /// Ask before changing each differing entry.
    Prompt,
    /// Bring every differing entry in line with its source.
    Overwrite,
}

impl From<ExistingArg> for ExistingPolicy {
    fn from(arg: ExistingArg) -> Self {
        match arg {
            ExistingArg::Skip => Self::Skip,
            ExistingArg::Prompt => Self::Prompt,
            ExistingArg::Overwrite => Self::Overwrite,
        }
    }
}

fn parse_define(definition: &str) -> Result<(String, String), String> {
    parse_variable(definition).map_err(|e| e.to_string())
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stencil completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stencil config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML.
    Show,
    /// Print the path of the default configuration file.
    Path,
    /// Write a configuration file with the built-in defaults.
    Init {
        /// Replace an existing file.
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}
