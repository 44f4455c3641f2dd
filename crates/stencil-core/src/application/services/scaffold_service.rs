//! Scaffold Service - main application orchestrator.
//!
//! This service coordinates one rendering run:
//! 1. Validate the source roots and prepare the target root
//! 2. Walk every source root top-down, level by level
//! 3. Reconcile each entry and report what happened
//!
//! Later source roots are layered onto the same target, so a file placed by
//! one root may be updated by the next.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{DirEntryInfo, Filesystem, Prompter, Reporter, TemplateRenderer},
        services::reconciler::Reconciler,
    },
    domain::{
        Action, ActionEvent, EntryKind, ReconciliationOutcome, ScaffoldJob, ScaffoldSummary,
        SkipReason, Subject, TreeEntry, render_path,
    },
    error::StencilResult,
};

/// Main scaffolding service.
///
/// Owns the adapters; a single service can run any number of jobs.
pub struct ScaffoldService {
    filesystem: Box<dyn Filesystem>,
    renderer: Box<dyn TemplateRenderer>,
    prompter: Box<dyn Prompter>,
    reporter: Box<dyn Reporter>,
}

impl ScaffoldService {
    /// Create a new scaffold service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use stencil_core::application::{ScaffoldService, ports::*};
    /// # let filesystem: Box<dyn Filesystem> = unimplemented!();
    /// # let renderer: Box<dyn TemplateRenderer> = unimplemented!();
    /// # let prompter: Box<dyn Prompter> = unimplemented!();
    /// # let reporter: Box<dyn Reporter> = unimplemented!();
    ///
    /// let service = ScaffoldService::new(
    ///     filesystem, // impl Filesystem
    ///     renderer,   // impl TemplateRenderer
    ///     prompter,   // impl Prompter
    ///     reporter,   // impl Reporter
    /// );
    /// ```
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        renderer: Box<dyn TemplateRenderer>,
        prompter: Box<dyn Prompter>,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        Self {
            filesystem,
            renderer,
            prompter,
            reporter,
        }
    }

    /// Render every source root of `job` into its target root.
    ///
    /// Fails before any mutation if a source root is not a directory or the
    /// target root exists without `overwrite_target_root`. Any later error
    /// aborts the run; entries written up to that point stay on disk.
    #[instrument(
        skip_all,
        fields(
            target = %job.target_root().display(),
            sources = job.source_roots().len(),
            policy = %job.existing_policy()
        )
    )]
    pub fn render_structure(&self, job: &ScaffoldJob) -> StencilResult<ScaffoldSummary> {
        let mut summary = ScaffoldSummary::new();
        info!(run_id = %summary.run_id(), "Rendering structure");

        for root in job.source_roots() {
            self.check_source_root(root)?;
        }

        let target_root = render_path(job.target_root(), job.variables())?;
        self.prepare_target_root(job, &target_root, &mut summary)?;

        let reconciler = Reconciler::new(
            self.filesystem.as_ref(),
            self.renderer.as_ref(),
            self.prompter.as_ref(),
            job,
        );
        for root in job.source_roots() {
            debug!(root = %root.display(), "Walking source root");
            self.walk(&reconciler, job, root, root, &target_root, &mut summary)?;
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            rejected = summary.rejected,
            "Structure rendered"
        );
        Ok(summary)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn check_source_root(&self, root: &Path) -> StencilResult<()> {
        if self.is_directory(root)? {
            return Ok(());
        }
        Err(ApplicationError::SourceRootNotDirectory {
            path: root.to_path_buf(),
        }
        .into())
    }

    /// A directory, or a symlink that resolves to one.
    fn is_directory(&self, path: &Path) -> StencilResult<bool> {
        match self.filesystem.entry_kind(path)? {
            Some(EntryKind::Directory) => Ok(true),
            Some(EntryKind::Symlink) => self.filesystem.resolves_to_dir(path),
            Some(EntryKind::File) | None => Ok(false),
        }
    }

    fn prepare_target_root(
        &self,
        job: &ScaffoldJob,
        target_root: &Path,
        summary: &mut ScaffoldSummary,
    ) -> StencilResult<()> {
        let event = match self.filesystem.entry_kind(target_root)? {
            None => {
                self.filesystem.create_dir_all(target_root)?;
                ActionEvent::new(
                    ReconciliationOutcome::Created,
                    Subject::Root,
                    Action::Mkdir,
                    "",
                    target_root,
                )
            }
            Some(_) if !job.overwrite_target_root() => {
                return Err(ApplicationError::TargetRootExists {
                    path: target_root.to_path_buf(),
                }
                .into());
            }
            Some(_) if self.is_directory(target_root)? => {
                ActionEvent::skipped(SkipReason::Existing, Subject::Root, "", target_root)
            }
            Some(_) => {
                return Err(ApplicationError::TargetRootNotDirectory {
                    path: target_root.to_path_buf(),
                }
                .into());
            }
        };

        self.emit(event, summary);
        Ok(())
    }

    /// Reconcile the children of `dir`, files first and then directories,
    /// then descend into every directory that was not rejected. A created or
    /// updated directory gets its mode only after its own subtree is done.
    fn walk(
        &self,
        reconciler: &Reconciler<'_>,
        job: &ScaffoldJob,
        source_root: &Path,
        dir: &Path,
        target_dir: &Path,
        summary: &mut ScaffoldSummary,
    ) -> StencilResult<()> {
        let (dirs, files): (Vec<DirEntryInfo>, Vec<DirEntryInfo>) = self
            .filesystem
            .list_dir(dir)?
            .into_iter()
            .partition(DirEntryInfo::is_dir_like);

        for file in files {
            if job.ignored_files().matches(&file.name) {
                debug!(path = %file.path.display(), "Ignoring file");
                continue;
            }
            let entry = Self::tree_entry(&file, source_root, target_dir);
            let event = reconciler.reconcile(&entry)?;
            self.emit(event, summary);
        }

        let mut descend = Vec::new();
        for subdir in dirs {
            if job.ignored_dirs().matches(&subdir.name) {
                debug!(path = %subdir.path.display(), "Ignoring directory");
                continue;
            }
            let entry = Self::tree_entry(&subdir, source_root, target_dir);
            let event = reconciler.reconcile(&entry)?;

            // Symlinked directories are recreated as links, never entered.
            if subdir.kind == EntryKind::Directory && !event.outcome().is_rejected() {
                descend.push((subdir.path, event.clone()));
            }
            self.emit(event, summary);
        }

        for (source, event) in descend {
            self.walk(reconciler, job, source_root, &source, event.target(), summary)?;
            reconciler.finish_directory(&event)?;
        }
        Ok(())
    }

    fn tree_entry(info: &DirEntryInfo, source_root: &Path, target_dir: &Path) -> TreeEntry {
        let relative = info.path.strip_prefix(source_root).unwrap_or(&info.path);
        TreeEntry::new(info.kind, &info.path, relative, target_dir)
    }

    fn emit(&self, event: ActionEvent, summary: &mut ScaffoldSummary) {
        summary.record(&event);
        self.reporter.report(&event);
    }
}
