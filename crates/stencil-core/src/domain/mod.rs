//! Core domain layer for Stencil.
//!
//! This module contains pure logic with no I/O. Filesystem access,
//! template rendering, prompting and reporting are reached through the
//! ports defined in the application layer.
//!
//! - **No I/O**: names, patterns, fingerprints and events are computed from
//!   values handed in
//! - **Immutable jobs**: a `ScaffoldJob` is built once and only read
//! - **Closed enums**: policies, entry kinds, outcomes and actions are
//!   matched exhaustively

pub mod content;
pub mod entry;
pub mod error;
pub mod event;
pub mod filename;
pub mod ignore;
pub mod job;
pub mod value_objects;

pub use content::{reference_defined_tokens, restore_trailing_newline};
pub use entry::TreeEntry;
pub use error::DomainError;
pub use event::{
    Action, ActionEvent, ReconciliationOutcome, ScaffoldSummary, Severity, SkipReason, Subject,
};
pub use filename::{render_filename, render_path};
pub use ignore::IgnorePatterns;
pub use job::{ScaffoldJob, ScaffoldJobBuilder, TemplateSuffix, Variables, parse_variable};
pub use value_objects::{EntryKind, ExistingPolicy, Fingerprint, Mode};
