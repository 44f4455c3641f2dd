//! Application layer errors.
//!
//! These errors represent failures while carrying out a run. Job and naming
//! errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while rendering a structure.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The target root exists and the job does not allow reusing it.
    #[error("The target root directory {path} already exists")]
    TargetRootExists { path: PathBuf },

    /// The target root exists but is not a directory.
    #[error("The target root {path} exists and is not a directory")]
    TargetRootNotDirectory { path: PathBuf },

    /// A configured source root is missing or not a directory.
    #[error("Source root {path} is not a directory")]
    SourceRootNotDirectory { path: PathBuf },

    /// A template referenced a variable that was not supplied.
    #[error("Undefined variable in template {path}: {reason}")]
    UndefinedTemplateVariable {
        path: PathBuf,
        name: Option<String>,
        reason: String,
    },

    /// The template engine rejected the template.
    #[error("Template {path} could not be rendered: {reason}")]
    TemplateSyntax { path: PathBuf, reason: String },

    /// A template file is not valid UTF-8.
    #[error("Template {path} is not valid UTF-8")]
    TemplateEncoding { path: PathBuf },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// Reading an answer from the user failed.
    #[error("Prompt failed: {reason}")]
    Prompt { reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TargetRootExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Pass --overwrite-root to render into it".into(),
                "Or choose a different target".into(),
            ],
            Self::TargetRootNotDirectory { path } => vec![
                format!("Move or remove {}", path.display()),
                "Or choose a different target".into(),
            ],
            Self::SourceRootNotDirectory { path } => vec![
                format!("Check that {} exists and is a directory", path.display()),
            ],
            Self::UndefinedTemplateVariable { name, .. } => match name {
                Some(name) => vec![format!("Define the variable: -D {}=<value>", name)],
                None => vec!["Define every variable the template references".into()],
            },
            Self::TemplateSyntax { .. } => vec![
                "Templates use {{{ var }}} for variables and {{% ... %}} for blocks".into(),
            ],
            Self::TemplateEncoding { .. } => vec![
                "Rename the file so it does not carry the template suffix".into(),
                "Or use --suffix so only text files are rendered".into(),
            ],
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Entries written before the failure remain on disk".into(),
            ],
            Self::Prompt { .. } => vec![
                "Run with --existing skip or --existing overwrite when stdin is not interactive"
                    .into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TargetRootExists { .. }
            | Self::TargetRootNotDirectory { .. }
            | Self::SourceRootNotDirectory { .. } => ErrorCategory::Configuration,
            Self::UndefinedTemplateVariable { .. }
            | Self::TemplateSyntax { .. }
            | Self::TemplateEncoding { .. } => ErrorCategory::Validation,
            Self::Filesystem { .. } | Self::Prompt { .. } => ErrorCategory::Io,
        }
    }
}
