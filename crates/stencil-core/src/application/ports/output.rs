//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stencil-adapters` crate provides implementations.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::domain::{ActionEvent, EntryKind, Mode, Variables};
use crate::error::StencilResult;

/// A child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: OsString,
    pub path: PathBuf,
    /// Kind of the entry itself; links are not followed.
    pub kind: EntryKind,
    /// For symlinks: whether the link resolves to a directory.
    pub points_to_dir: bool,
}

impl DirEntryInfo {
    /// Whether the walk lists this entry with the directories of its
    /// parent (and filters it with the directory patterns).
    pub fn is_dir_like(&self) -> bool {
        match self.kind {
            EntryKind::Directory => true,
            EntryKind::Symlink => self.points_to_dir,
            EntryKind::File => false,
        }
    }
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stencil_adapters::filesystem::LocalFilesystem` (production)
/// - `stencil_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Inspection never follows a symlink at the inspected path itself,
///   except `resolves_to_dir`
/// - Every failure is an `ApplicationError::Filesystem` naming the path
pub trait Filesystem: Send + Sync {
    /// Kind of the entry at `path`, or `None` if nothing is there.
    fn entry_kind(&self, path: &Path) -> StencilResult<Option<EntryKind>>;

    /// Permission bits of the entry at `path`.
    fn mode(&self, path: &Path) -> StencilResult<Mode>;

    /// Full contents of a regular file.
    fn read(&self, path: &Path) -> StencilResult<Vec<u8>>;

    /// Whether `path` is a directory once every symlink is followed.
    /// A missing or dangling path is `false`.
    fn resolves_to_dir(&self, path: &Path) -> StencilResult<bool>;

    /// Where the symlink at `path` points, unresolved.
    fn read_link(&self, path: &Path) -> StencilResult<PathBuf>;

    /// Children of a directory, sorted by name.
    fn list_dir(&self, path: &Path) -> StencilResult<Vec<DirEntryInfo>>;

    /// Create a single directory; the parent must exist.
    fn create_dir(&self, path: &Path) -> StencilResult<()>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> StencilResult<()>;

    /// Create or truncate a file with `contents`.
    fn write_file(&self, path: &Path, contents: &[u8]) -> StencilResult<()>;

    /// Set the permission bits of `path`.
    fn set_mode(&self, path: &Path, mode: Mode) -> StencilResult<()>;

    /// Create a symlink at `path` pointing to `link_target`.
    fn symlink(&self, link_target: &Path, path: &Path) -> StencilResult<()>;

    /// Remove a file or symlink.
    fn remove_file(&self, path: &Path) -> StencilResult<()>;
}

/// Port for template content rendering.
///
/// Implemented by:
/// - `stencil_adapters::renderer::MiniJinjaRenderer`
///
/// Rendering must be strict: a reference to a variable missing from
/// `variables` is an `ApplicationError::UndefinedTemplateVariable`.
pub trait TemplateRenderer: Send + Sync {
    /// Render `source`. `name` identifies the template in errors.
    fn render(&self, name: &Path, source: &str, variables: &Variables) -> StencilResult<String>;

    /// Template source that renders the value of variable `name`, e.g.
    /// `{{{ name }}}`.
    fn variable_reference(&self, name: &str) -> String;
}

/// Port for the yes/no questions asked under the `Prompt` policy.
///
/// Implemented by:
/// - `stencil_adapters::prompt::LinePrompter` (any reader/writer pair)
/// - `stencil_adapters::prompt::FixedPrompter` (non-interactive)
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask `question`; `default` is used on an empty answer, and `None`
    /// forces an explicit answer.
    fn confirm(&self, question: &str, default: Option<bool>) -> StencilResult<bool>;
}

/// Port for the stream of action events.
///
/// Implemented by:
/// - `stencil_adapters::reporter::MemoryReporter` (collects events)
/// - `stencil_adapters::reporter::TracingReporter` (tracing events)
pub trait Reporter: Send + Sync {
    fn report(&self, event: &ActionEvent);
}
