//! Stencil core: the scaffolding engine without any I/O of its own.
//!
//! A run takes a [`domain::ScaffoldJob`] (source roots, target root,
//! variables, ignore patterns, template suffix, existing-entry policy) and
//! reconciles every source entry against its target path. The filesystem,
//! the template engine, the yes/no prompt and the event sink are ports
//! (traits in [`application::ports`]) supplied by the caller.
//!
//! ```text
//!   stencil-cli ──builds──▶ ScaffoldJob
//!        │
//!        ▼
//!   ScaffoldService::render_structure
//!        │  walks each source root, files before directories
//!        ▼
//!   Reconciler ──▶ resolve(TargetState, ExistingPolicy) ──▶ Resolution
//!        │
//!        ├─ Filesystem        (LocalFilesystem, MemoryFilesystem)
//!        ├─ TemplateRenderer  (MiniJinjaRenderer)
//!        ├─ Prompter          (LinePrompter, FixedPrompter)
//!        └─ Reporter          (one ActionEvent per entry)
//! ```
//!
//! ```rust,no_run
//! use stencil_core::{
//!     application::ScaffoldService,
//!     domain::{ExistingPolicy, ScaffoldJob},
//! };
//! # fn adapters() -> (
//! #     Box<dyn stencil_core::application::ports::Filesystem>,
//! #     Box<dyn stencil_core::application::ports::TemplateRenderer>,
//! #     Box<dyn stencil_core::application::ports::Prompter>,
//! #     Box<dyn stencil_core::application::ports::Reporter>,
//! # ) { unimplemented!() }
//! # fn main() -> Result<(), stencil_core::error::StencilError> {
//! let job = ScaffoldJob::builder()
//!     .source_root("templates/project")
//!     .target_root("+name+")
//!     .variable("name", "widget")
//!     .existing_policy(ExistingPolicy::Overwrite)
//!     .build()?;
//!
//! let (filesystem, renderer, prompter, reporter) = adapters();
//! let service = ScaffoldService::new(filesystem, renderer, prompter, reporter);
//! let summary = service.render_structure(&job)?;
//! println!("{} created", summary.created);
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

/// The names most callers need, in one import.
pub mod prelude {
    pub use crate::application::{
        Reconciler, ScaffoldService,
        ports::{DirEntryInfo, Filesystem, Prompter, Reporter, TemplateRenderer},
    };
    pub use crate::domain::{
        Action, ActionEvent, EntryKind, ExistingPolicy, Fingerprint, Mode,
        ReconciliationOutcome, ScaffoldJob, ScaffoldJobBuilder, ScaffoldSummary, Severity,
        SkipReason, Subject, TemplateSuffix, TreeEntry, Variables,
    };
    pub use crate::error::{StencilError, StencilResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
