// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

use crate::error::ErrorCategory;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (events and errors travel together in reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Template Errors
    // ========================================================================
    #[error("'{name}' variable in filename {path} was not found in the supplied variables")]
    UndefinedFilenameVariable { name: String, path: String },

    // ========================================================================
    // Job Construction Errors
    // ========================================================================
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("At least one source root is required")]
    MissingSourceRoot,

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Invalid existing-entry policy '{0}' (expected skip, prompt or overwrite)")]
    InvalidPolicy(String),

    #[error("Invalid variable definition '{0}' (expected name=value)")]
    InvalidVariable(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UndefinedFilenameVariable { name, .. } => vec![
                format!("Define the variable: -D {}=<value>", name),
                "Or rename the template entry so it no longer references it".into(),
            ],
            Self::InvalidPattern { pattern, .. } => vec![
                format!("Check the glob syntax of '{}'", pattern),
                "Patterns match single entry names, e.g. '*.pyc' or '__pycache__'".into(),
            ],
            Self::MissingSourceRoot => vec!["Pass at least one template directory".into()],
            Self::InvalidPolicy(_) => vec!["Use one of: skip, prompt, overwrite".into()],
            Self::InvalidVariable(_) => vec!["Variables are written as name=value".into()],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UndefinedFilenameVariable { .. }
            | Self::InvalidPattern { .. }
            | Self::InvalidPolicy(_)
            | Self::InvalidVariable(_) => ErrorCategory::Validation,
            Self::MissingSourceRoot | Self::MissingRequiredField { .. } => {
                ErrorCategory::Configuration
            }
        }
    }
}
