//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stencil-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: entry inspection and mutation
//!   - `TemplateRenderer`: template content rendering
//!   - `Prompter`: yes/no questions for the `Prompt` policy
//!   - `Reporter`: sink for action events

pub mod output;

pub use output::{DirEntryInfo, Filesystem, Prompter, Reporter, TemplateRenderer};
