//! Infrastructure adapters for Stencil.
//!
//! This crate implements the ports defined in `stencil-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod prompt;
pub mod renderer;
pub mod reporter;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use prompt::{FixedPrompter, LinePrompter};
pub use renderer::{Delimiters, MiniJinjaRenderer};
pub use reporter::{MemoryReporter, TracingReporter};
