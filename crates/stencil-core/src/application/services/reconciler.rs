//! Entry reconciliation - the per-entry state machine.
//!
//! For one source entry and its target path the reconciler decides between
//! creating, updating, skipping and rejecting, then performs the mutation.
//! The decision itself is [`resolve`], a pure function of the target state,
//! the existing-entry policy and the user's answer.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, Prompter, TemplateRenderer},
    },
    domain::{
        Action, ActionEvent, EntryKind, ExistingPolicy, Fingerprint, ReconciliationOutcome,
        ScaffoldJob, SkipReason, Subject, TemplateSuffix, TreeEntry, reference_defined_tokens,
        render_filename, restore_trailing_newline,
    },
    error::StencilResult,
};

// ── Decision ─────────────────────────────────────────────────────────────────

/// What differs between an existing target and its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Content differs (for symlinks: the link target). Permissions may too.
    Content,
    /// Only the permission bits differ.
    Permissions,
}

/// The target path as seen by the state machine, once a foreign kind has
/// been ruled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Absent,
    Identical,
    Differs(Change),
}

impl TargetState {
    /// State of an existing target. Content takes precedence: a target whose
    /// content and mode both differ is a `Content` change.
    pub fn existing(same_content: bool, same_mode: bool) -> Self {
        match (same_content, same_mode) {
            (true, true) => Self::Identical,
            (false, _) => Self::Differs(Change::Content),
            (true, false) => Self::Differs(Change::Permissions),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Create,
    Skip(SkipReason),
    Apply(Change),
}

/// Decide what to do with a target path.
///
/// `ask` is only called for a differing target under the `Prompt` policy;
/// its answer turns into `Apply` (yes) or `Skip(Declined)` (no).
pub fn resolve<F>(state: TargetState, policy: ExistingPolicy, ask: F) -> StencilResult<Resolution>
where
    F: FnOnce(Change) -> StencilResult<bool>,
{
    let change = match state {
        TargetState::Absent => return Ok(Resolution::Create),
        TargetState::Identical => return Ok(Resolution::Skip(SkipReason::Identical)),
        TargetState::Differs(change) => change,
    };

    match policy {
        ExistingPolicy::Skip => Ok(Resolution::Skip(SkipReason::Existing)),
        ExistingPolicy::Overwrite => Ok(Resolution::Apply(change)),
        ExistingPolicy::Prompt => {
            if ask(change)? {
                Ok(Resolution::Apply(change))
            } else {
                Ok(Resolution::Skip(SkipReason::Declined))
            }
        }
    }
}

// ── Reconciler ───────────────────────────────────────────────────────────────

/// Applies one job's policy to individual entries.
pub struct Reconciler<'a> {
    filesystem: &'a dyn Filesystem,
    renderer: &'a dyn TemplateRenderer,
    prompter: &'a dyn Prompter,
    job: &'a ScaffoldJob,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        filesystem: &'a dyn Filesystem,
        renderer: &'a dyn TemplateRenderer,
        prompter: &'a dyn Prompter,
        job: &'a ScaffoldJob,
    ) -> Self {
        Self {
            filesystem,
            renderer,
            prompter,
            job,
        }
    }

    /// Reconcile one entry and return the event describing what happened.
    ///
    /// A target occupied by another kind of entry yields a `Rejected` event,
    /// not an error. Undefined variables and failed mutations are errors.
    pub fn reconcile(&self, entry: &TreeEntry) -> StencilResult<ActionEvent> {
        match entry.kind() {
            EntryKind::File => self.reconcile_file(entry),
            EntryKind::Directory => self.reconcile_directory(entry),
            EntryKind::Symlink => self.reconcile_symlink(entry),
        }
    }

    fn reconcile_file(&self, entry: &TreeEntry) -> StencilResult<ActionEvent> {
        let (target, is_template) = self.target_of(entry)?;
        let subject = if is_template {
            Subject::Template
        } else {
            Subject::File
        };

        let existing = self.filesystem.entry_kind(&target)?;
        if let Some(rejected) = self.reject_foreign(existing, EntryKind::File, subject, entry, &target) {
            return Ok(rejected);
        }

        let contents = self.source_contents(entry, is_template)?;
        let mode = self.filesystem.mode(entry.source())?;

        let state = match existing {
            None => TargetState::Absent,
            Some(_) => {
                let current = self.filesystem.read(&target)?;
                TargetState::existing(
                    Fingerprint::of(&contents) == Fingerprint::of(&current),
                    self.filesystem.mode(&target)? == mode,
                )
            }
        };
        debug!(target = %target.display(), ?state, "Compared file");

        let resolution = resolve(state, self.job.existing_policy(), |change| {
            let question = match change {
                Change::Content => format!("Overwrite file {}?", target.display()),
                Change::Permissions => format!(
                    "Update permissions of file {} to {}?",
                    target.display(),
                    mode
                ),
            };
            self.prompter.confirm(&question, Some(false))
        })?;

        let (create, overwrite) = if is_template {
            (Action::Render, Action::RenderOverwrite)
        } else {
            (Action::Copy, Action::CopyOverwrite)
        };

        let event = match resolution {
            Resolution::Skip(reason) => {
                return Ok(ActionEvent::skipped(reason, subject, entry.relative(), target));
            }
            Resolution::Create => {
                self.filesystem.write_file(&target, &contents)?;
                ActionEvent::new(
                    ReconciliationOutcome::Created,
                    subject,
                    create,
                    entry.relative(),
                    &target,
                )
            }
            Resolution::Apply(Change::Content) => {
                self.filesystem.write_file(&target, &contents)?;
                ActionEvent::new(
                    ReconciliationOutcome::Updated,
                    subject,
                    overwrite,
                    entry.relative(),
                    &target,
                )
            }
            Resolution::Apply(Change::Permissions) => ActionEvent::new(
                ReconciliationOutcome::Updated,
                subject,
                Action::Chmod,
                entry.relative(),
                &target,
            ),
        };

        self.filesystem.set_mode(&target, mode)?;
        Ok(event.with_mode(mode))
    }

    fn reconcile_directory(&self, entry: &TreeEntry) -> StencilResult<ActionEvent> {
        let (target, _) = self.target_of(entry)?;
        let subject = Subject::Directory;

        let existing = self.filesystem.entry_kind(&target)?;
        if let Some(rejected) =
            self.reject_foreign(existing, EntryKind::Directory, subject, entry, &target)
        {
            return Ok(rejected);
        }

        // A directory has no content of its own; only its mode is compared.
        let mode = self.filesystem.mode(entry.source())?;
        let state = match existing {
            None => TargetState::Absent,
            Some(_) => TargetState::existing(true, self.filesystem.mode(&target)? == mode),
        };
        debug!(target = %target.display(), ?state, "Compared directory");

        let resolution = resolve(state, self.job.existing_policy(), |_| {
            let question = format!(
                "Update permissions of directory {} to {}?",
                target.display(),
                mode
            );
            self.prompter.confirm(&question, Some(false))
        })?;

        let event = match resolution {
            Resolution::Skip(reason) => {
                return Ok(ActionEvent::skipped(reason, subject, entry.relative(), target));
            }
            Resolution::Create => {
                self.filesystem.create_dir(&target)?;
                ActionEvent::new(
                    ReconciliationOutcome::Created,
                    subject,
                    Action::Mkdir,
                    entry.relative(),
                    &target,
                )
            }
            Resolution::Apply(_) => ActionEvent::new(
                ReconciliationOutcome::Updated,
                subject,
                Action::Chmod,
                entry.relative(),
                &target,
            ),
        };

        // The mode is applied by `finish_directory` once the children exist.
        Ok(event.with_mode(mode))
    }

    /// Apply the mode carried by a directory's create or chmod event.
    ///
    /// Called after the directory's subtree has been walked, so a source
    /// directory without write permission (e.g. `0o555`) can still be filled.
    pub fn finish_directory(&self, event: &ActionEvent) -> StencilResult<()> {
        if event.kind() != EntryKind::Directory {
            return Ok(());
        }
        match (event.outcome(), event.mode()) {
            (ReconciliationOutcome::Created | ReconciliationOutcome::Updated, Some(mode)) => {
                debug!(target = %event.target().display(), %mode, "Applying directory mode");
                self.filesystem.set_mode(event.target(), mode)
            }
            _ => Ok(()),
        }
    }

    fn reconcile_symlink(&self, entry: &TreeEntry) -> StencilResult<ActionEvent> {
        let (target, _) = self.target_of(entry)?;
        let subject = Subject::Symlink;

        let existing = self.filesystem.entry_kind(&target)?;
        if let Some(rejected) =
            self.reject_foreign(existing, EntryKind::Symlink, subject, entry, &target)
        {
            return Ok(rejected);
        }

        let link = self.filesystem.read_link(entry.source())?;
        let state = match existing {
            None => TargetState::Absent,
            Some(_) => TargetState::existing(self.filesystem.read_link(&target)? == link, true),
        };
        debug!(target = %target.display(), link = %link.display(), ?state, "Compared symlink");

        let resolution = resolve(state, self.job.existing_policy(), |_| {
            self.prompter
                .confirm(&format!("Overwrite symlink {}?", target.display()), Some(false))
        })?;

        match resolution {
            Resolution::Skip(reason) => Ok(ActionEvent::skipped(
                reason,
                subject,
                entry.relative(),
                target,
            )),
            Resolution::Create => {
                self.filesystem.symlink(&link, &target)?;
                Ok(ActionEvent::new(
                    ReconciliationOutcome::Created,
                    subject,
                    Action::Symlink,
                    entry.relative(),
                    target,
                ))
            }
            Resolution::Apply(_) => {
                self.filesystem.remove_file(&target)?;
                self.filesystem.symlink(&link, &target)?;
                Ok(ActionEvent::new(
                    ReconciliationOutcome::Updated,
                    subject,
                    Action::SymlinkOverwrite,
                    entry.relative(),
                    target,
                ))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Rendered target path of an entry, and whether the entry is a template.
    ///
    /// Files and symlinks lose the template suffix; only files become
    /// templates. Names that are not valid UTF-8 are used as they are.
    fn target_of(&self, entry: &TreeEntry) -> StencilResult<(PathBuf, bool)> {
        let suffix = self.job.template_suffix();
        let Some(name) = entry.file_name().to_str() else {
            let is_template =
                entry.kind() == EntryKind::File && matches!(suffix, TemplateSuffix::All);
            return Ok((entry.target_dir().join(entry.file_name()), is_template));
        };

        let (is_template, stem) = match entry.kind() {
            EntryKind::File => suffix.classify(name),
            EntryKind::Symlink => (false, suffix.strip(name)),
            EntryKind::Directory => (false, name),
        };
        let rendered = render_filename(stem, self.job.variables())?;
        Ok((entry.target_dir().join(rendered), is_template))
    }

    fn reject_foreign(
        &self,
        existing: Option<EntryKind>,
        expected: EntryKind,
        subject: Subject,
        entry: &TreeEntry,
        target: &Path,
    ) -> Option<ActionEvent> {
        match existing {
            Some(kind) if kind != expected => {
                warn!(
                    target = %target.display(),
                    expected = %expected,
                    found = %kind,
                    "Target occupied by another kind of entry"
                );
                Some(ActionEvent::rejected(subject, entry.relative(), target))
            }
            _ => None,
        }
    }

    /// Bytes the target should hold: the rendered template, or the source
    /// copied verbatim.
    fn source_contents(&self, entry: &TreeEntry, is_template: bool) -> StencilResult<Vec<u8>> {
        let raw = self.filesystem.read(entry.source())?;
        if !is_template {
            return Ok(raw);
        }

        let text = String::from_utf8(raw).map_err(|_| ApplicationError::TemplateEncoding {
            path: entry.source().to_path_buf(),
        })?;
        let variables = self.job.variables();
        let prepared = reference_defined_tokens(&text, variables, |name| {
            self.renderer.variable_reference(name)
        });
        let rendered = self.renderer.render(entry.source(), &prepared, variables)?;
        Ok(restore_trailing_newline(&text, rendered).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::output::MockPrompter;
    use crate::error::StencilError;

    fn never_asked(_: Change) -> StencilResult<bool> {
        panic!("prompt must not be shown");
    }

    #[test]
    fn absent_target_is_always_created() {
        for policy in [
            ExistingPolicy::Skip,
            ExistingPolicy::Prompt,
            ExistingPolicy::Overwrite,
        ] {
            let res = resolve(TargetState::Absent, policy, never_asked).unwrap();
            assert_eq!(res, Resolution::Create);
        }
    }

    #[test]
    fn identical_target_is_skipped_under_every_policy() {
        for policy in [
            ExistingPolicy::Skip,
            ExistingPolicy::Prompt,
            ExistingPolicy::Overwrite,
        ] {
            let res = resolve(TargetState::Identical, policy, never_asked).unwrap();
            assert_eq!(res, Resolution::Skip(SkipReason::Identical));
        }
    }

    #[test]
    fn skip_policy_never_applies() {
        let state = TargetState::Differs(Change::Content);
        let res = resolve(state, ExistingPolicy::Skip, never_asked).unwrap();
        assert_eq!(res, Resolution::Skip(SkipReason::Existing));
    }

    #[test]
    fn overwrite_policy_applies_the_change() {
        let state = TargetState::Differs(Change::Permissions);
        let res = resolve(state, ExistingPolicy::Overwrite, never_asked).unwrap();
        assert_eq!(res, Resolution::Apply(Change::Permissions));
    }

    #[test]
    fn prompt_policy_follows_the_answer() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm()
            .withf(|q, default| q == "Overwrite file out/a?" && *default == Some(false))
            .times(1)
            .returning(|_, _| Ok(true));

        let state = TargetState::Differs(Change::Content);
        let res = resolve(state, ExistingPolicy::Prompt, |_| {
            prompter.confirm("Overwrite file out/a?", Some(false))
        })
        .unwrap();
        assert_eq!(res, Resolution::Apply(Change::Content));

        let res = resolve(state, ExistingPolicy::Prompt, |_| Ok(false)).unwrap();
        assert_eq!(res, Resolution::Skip(SkipReason::Declined));
    }

    #[test]
    fn prompt_failure_propagates() {
        let state = TargetState::Differs(Change::Content);
        let res = resolve(state, ExistingPolicy::Prompt, |_| {
            Err(ApplicationError::Prompt {
                reason: "stdin closed".into(),
            }
            .into())
        });
        assert!(matches!(
            res,
            Err(StencilError::Application(ApplicationError::Prompt { .. }))
        ));
    }

    #[test]
    fn content_difference_takes_precedence() {
        assert_eq!(
            TargetState::existing(false, false),
            TargetState::Differs(Change::Content)
        );
        assert_eq!(
            TargetState::existing(true, false),
            TargetState::Differs(Change::Permissions)
        );
        assert_eq!(TargetState::existing(true, true), TargetState::Identical);
    }
}
