//! Reconciliation outcomes and the action events reported for them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{EntryKind, Mode};

/// Why an entry was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    /// Target already matches the source.
    Identical,
    /// Target differs but the policy is `Skip`.
    Existing,
    /// Target differs and the user answered "no".
    Declined,
}

/// Result of reconciling one source entry against its target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum ReconciliationOutcome {
    Created,
    /// Content and/or permissions were brought in line with the source.
    Updated,
    Skipped(SkipReason),
    /// A different kind of entry occupies the target path.
    Rejected,
}

impl ReconciliationOutcome {
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Rejected => Severity::Error,
            _ => Severity::Info,
        }
    }

    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Short action tag shown next to each reported path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "mkdir")]
    Mkdir,
    #[serde(rename = "skip")]
    Skip,
    #[serde(rename = "render")]
    Render,
    #[serde(rename = "render (overwrite)")]
    RenderOverwrite,
    #[serde(rename = "copy")]
    Copy,
    #[serde(rename = "copy (overwrite)")]
    CopyOverwrite,
    #[serde(rename = "chmod")]
    Chmod,
    #[serde(rename = "symlink")]
    Symlink,
    #[serde(rename = "symlink (overwrite)")]
    SymlinkOverwrite,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mkdir => "mkdir",
            Self::Skip => "skip",
            Self::Render => "render",
            Self::RenderOverwrite => "render (overwrite)",
            Self::Copy => "copy",
            Self::CopyOverwrite => "copy (overwrite)",
            Self::Chmod => "chmod",
            Self::Symlink => "symlink",
            Self::SymlinkOverwrite => "symlink (overwrite)",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// What an event is about. Templates and plain files share the `File`
/// entry kind but are described differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    /// The target root directory itself.
    Root,
    File,
    Template,
    Directory,
    Symlink,
}

impl Subject {
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Root | Self::Directory => EntryKind::Directory,
            Self::File | Self::Template => EntryKind::File,
            Self::Symlink => EntryKind::Symlink,
        }
    }

    const fn noun(&self) -> &'static str {
        match self {
            Self::Root => "root directory",
            Self::File => "file",
            Self::Template => "template",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
        }
    }
}

/// One structured report line: what happened to which entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    outcome: ReconciliationOutcome,
    subject: Subject,
    action: Action,
    /// Path relative to the source root the entry came from.
    source: PathBuf,
    target: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<Mode>,
}

impl ActionEvent {
    pub fn new(
        outcome: ReconciliationOutcome,
        subject: Subject,
        action: Action,
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
    ) -> Self {
        Self {
            outcome,
            subject,
            action,
            source: source.into(),
            target: target.into(),
            mode: None,
        }
    }

    /// Event for an entry left untouched.
    pub fn skipped(
        reason: SkipReason,
        subject: Subject,
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
    ) -> Self {
        Self::new(
            ReconciliationOutcome::Skipped(reason),
            subject,
            Action::Skip,
            source,
            target,
        )
    }

    /// Event for a target path occupied by a foreign kind of entry.
    pub fn rejected(
        subject: Subject,
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
    ) -> Self {
        Self::new(
            ReconciliationOutcome::Rejected,
            subject,
            Action::Skip,
            source,
            target,
        )
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn outcome(&self) -> ReconciliationOutcome {
        self.outcome
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn kind(&self) -> EntryKind {
        self.subject.kind()
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn severity(&self) -> Severity {
        self.outcome.severity()
    }

    /// Human-readable description of the event.
    pub fn message(&self) -> String {
        use ReconciliationOutcome as O;

        let source = self.source.display();
        let target = self.target.display();
        let noun = self.subject.noun();
        let mode = self.mode.map(|m| m.to_string()).unwrap_or_default();

        match (self.subject, self.outcome) {
            (Subject::Root, O::Created) => format!("Making root directory {target}"),
            (Subject::Root, _) => format!("Skipping existing target root directory {target}"),

            (Subject::Directory, O::Rejected) => {
                format!("Skipping existing non-directory {target}")
            }
            (Subject::File | Subject::Template, O::Rejected) => {
                format!("Skipping existing non-file {target}")
            }
            (Subject::Symlink, O::Rejected) => format!("Skipping existing non-symlink {target}"),

            (_, O::Skipped(SkipReason::Identical)) => format!(
                "Skipping identical {} {target}",
                self.subject.kind().as_str()
            ),
            (_, O::Skipped(_)) => format!(
                "Skipping existing {} {target}",
                self.subject.kind().as_str()
            ),

            (_, O::Updated) if self.action == Action::Chmod => {
                format!("Updating permissions of {noun} {target} to {mode}")
            }
            (Subject::Template, O::Updated) => {
                format!("Rendering and overwriting template {source} to {target}")
            }
            (Subject::Symlink, O::Updated) => {
                format!("Creating and overwriting symlink {source} to {target}")
            }
            (_, O::Updated) => format!("Copying and overwriting file {source} to {target}"),

            (Subject::Template, O::Created) => format!("Rendering template {source} to {target}"),
            (Subject::File, O::Created) => format!("Copying file {source} to {target}"),
            (Subject::Directory, O::Created) => format!("Making directory {target}"),
            (Subject::Symlink, O::Created) => format!("Creating symlink {source} to {target}"),
        }
    }
}

impl fmt::Display for ActionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>19} : {}", self.action, self.target.display())
    }
}

/// Per-run counters, returned when a run succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldSummary {
    run_id: Uuid,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub rejected: usize,
}

impl ScaffoldSummary {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created: 0,
            updated: 0,
            skipped: 0,
            rejected: 0,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record(&mut self, event: &ActionEvent) {
        match event.outcome() {
            ReconciliationOutcome::Created => self.created += 1,
            ReconciliationOutcome::Updated => self.updated += 1,
            ReconciliationOutcome::Skipped(_) => self.skipped += 1,
            ReconciliationOutcome::Rejected => self.rejected += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.rejected
    }

    /// True if the run changed nothing on disk.
    pub fn is_unchanged(&self) -> bool {
        self.created == 0 && self.updated == 0
    }
}

impl Default for ScaffoldSummary {
    fn default() -> Self {
        Self::new()
    }
}
