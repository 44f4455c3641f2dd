//! Unified error handling for Stencil Core.
//!
//! [`StencilError`] is what every fallible public operation returns. It wraps
//! the per-layer errors and exposes their suggestions and category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Stencil Core operations.
///
/// Every variant is fatal for the run that produced it. Type conflicts are
/// not errors at this level; they surface as `Rejected` events instead.
#[derive(Debug, Error, Clone)]
pub enum StencilError {
    /// Errors from the domain layer (invalid jobs, undefined filename variables).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (filesystem, rendering, prompts).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// An adapter could not be set up (e.g. bad template delimiters).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StencilError {
    /// Hints for the user, most specific first.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Setup failed: {}", message),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Stencil".into(),
                "Please report this issue at: https://github.com/cosecruz/stencil/issues".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Broad error classes; the CLI maps them to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The templates or the job reference something that does not exist.
    Validation,
    /// The run was refused before any mutation.
    Configuration,
    /// Filesystem or terminal I/O failed.
    Io,
    Internal,
}

pub type StencilResult<T> = Result<T, StencilError>;
