//! Application layer for Stencil.
//!
//! This layer contains:
//! - **Services**: the tree walker (`ScaffoldService`) and the per-entry
//!   state machine (`Reconciler`)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types

pub mod error;
pub mod ports;
pub mod services;

pub use services::{Change, Reconciler, Resolution, ScaffoldService, TargetState, resolve};

pub use ports::{DirEntryInfo, Filesystem, Prompter, Reporter, TemplateRenderer};

pub use error::ApplicationError;
