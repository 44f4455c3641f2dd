use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::EntryKind;

/// One node visited during the walk, handed straight to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    kind: EntryKind,
    source: PathBuf,
    relative: PathBuf,
    target_dir: PathBuf,
}

impl TreeEntry {
    /// `relative` is the entry's path below its source root; `target_dir`
    /// is the already-rendered directory the entry is placed in.
    pub fn new(
        kind: EntryKind,
        source: impl Into<PathBuf>,
        relative: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            relative: relative.into(),
            target_dir: target_dir.into(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// The entry's own name, the last component of its source path.
    pub fn file_name(&self) -> &OsStr {
        self.source.file_name().unwrap_or_default()
    }
}
