//! End-to-end runs of the scaffold service against the in-memory filesystem.

use std::path::{Path, PathBuf};

use mockall::mock;
use stencil_adapters::{FixedPrompter, MemoryFilesystem, MemoryReporter, MiniJinjaRenderer};
use stencil_core::{
    application::{ApplicationError, ScaffoldService, ports::Prompter},
    domain::{
        Action, DomainError, EntryKind, ExistingPolicy, Mode, ReconciliationOutcome, ScaffoldJob,
        Severity, SkipReason, Subject, TemplateSuffix,
    },
    error::{StencilError, StencilResult},
};

mock! {
    pub Asker {}
    impl Prompter for Asker {
        fn confirm(&self, question: &str, default: Option<bool>) -> StencilResult<bool>;
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn service(
    fs: &MemoryFilesystem,
    prompter: impl Prompter + 'static,
    reporter: &MemoryReporter,
) -> ScaffoldService {
    ScaffoldService::new(
        Box::new(fs.clone()),
        Box::new(MiniJinjaRenderer::new().unwrap()),
        Box::new(prompter),
        Box::new(reporter.clone()),
    )
}

fn job(policy: ExistingPolicy) -> ScaffoldJob {
    ScaffoldJob::builder()
        .source_root("/src")
        .target_root("/out")
        .variable("name", "Ada")
        .overwrite_target_root(true)
        .existing_policy(policy)
        .build()
        .unwrap()
}

fn run(fs: &MemoryFilesystem, job: &ScaffoldJob) -> (StencilResult<()>, MemoryReporter) {
    let reporter = MemoryReporter::new();
    let result = service(fs, FixedPrompter::no(), &reporter)
        .render_structure(job)
        .map(|_| ());
    (result, reporter)
}

type Snapshot = Vec<(
    PathBuf,
    Option<EntryKind>,
    Option<Mode>,
    Option<Vec<u8>>,
    Option<PathBuf>,
)>;

/// Every path with its kind, mode, contents and link target.
fn snapshot(fs: &MemoryFilesystem) -> Snapshot {
    fs.paths()
        .into_iter()
        .map(|p| {
            (
                p.clone(),
                fs.kind_of(&p),
                fs.mode_of(&p),
                fs.read_file(&p),
                fs.link_of(&p),
            )
        })
        .collect()
}

fn greeting_source() -> MemoryFilesystem {
    let fs = MemoryFilesystem::new();
    fs.add_dir("/src", 0o755)
        .add_file("/src/greeting.jinja", "Hello +name+!\n", 0o640)
        .add_file("/src/notes.txt", "static", 0o600);
    fs
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn renders_templates_and_copies_files() {
    let fs = greeting_source();
    let job = ScaffoldJob::builder()
        .source_root("/src")
        .target_root("/out")
        .variable("name", "Ada")
        .template_suffix(TemplateSuffix::new(".jinja"))
        .existing_policy(ExistingPolicy::Overwrite)
        .build()
        .unwrap();

    let (result, reporter) = run(&fs, &job);
    result.unwrap();

    assert_eq!(fs.read_to_string("/out/greeting").as_deref(), Some("Hello Ada!\n"));
    assert_eq!(fs.read_to_string("/out/notes.txt").as_deref(), Some("static"));
    assert_eq!(fs.mode_of("/out/greeting"), Some(Mode::from_raw(0o640)));
    assert_eq!(fs.mode_of("/out/notes.txt"), Some(Mode::from_raw(0o600)));
    assert_eq!(fs.kind_of("/out/greeting.jinja"), None);

    let events = reporter.events();
    assert_eq!(events[0].subject(), Subject::Root);
    assert_eq!(events[0].action(), Action::Mkdir);

    let entries: Vec<_> = events.iter().filter(|e| e.subject() != Subject::Root).collect();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.outcome() == ReconciliationOutcome::Created));
    assert_eq!(entries[0].action(), Action::Render);
    assert_eq!(entries[0].source(), Path::new("greeting.jinja"));
    assert_eq!(entries[0].target(), Path::new("/out/greeting"));
    assert_eq!(entries[1].action(), Action::Copy);
    assert_eq!(
        entries[1].message(),
        "Copying file notes.txt to /out/notes.txt"
    );
}

#[test]
fn template_variables_are_rendered() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/app.py.jinja", "NAME = '{{{ name }}}'\n{{% if name %}}\nok\n{{% endif %}}\n", 0o644);

    let (result, _) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(
        fs.read_to_string("/out/app.py").as_deref(),
        Some("NAME = 'Ada'\nok\n")
    );
}

#[test]
fn variable_values_are_inserted_literally() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/build.cfg.jinja", "flags={{{ flags }}}\nagain=+flags+\n", 0o644);

    let job = ScaffoldJob::builder()
        .source_root("/src")
        .target_root("/out")
        .variable("flags", "-O2 +debug+")
        .variable("debug", "XX")
        .existing_policy(ExistingPolicy::Overwrite)
        .build()
        .unwrap();

    let (result, _) = run(&fs, &job);
    result.unwrap();

    assert_eq!(
        fs.read_to_string("/out/build.cfg").as_deref(),
        Some("flags=-O2 +debug+\nagain=-O2 +debug+\n")
    );
}

#[test]
fn trailing_newline_is_preserved() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/one.jinja", "Hi {{{ name }}}\n", 0o644)
        .add_file("/src/two.jinja", "Hi {{{ name }}}", 0o644);

    let (result, _) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(fs.read_to_string("/out/one").as_deref(), Some("Hi Ada\n"));
    assert_eq!(fs.read_to_string("/out/two").as_deref(), Some("Hi Ada"));
}

#[test]
fn filenames_are_substituted() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/+name+.txt", "x", 0o644)
        .add_file("/src/+name+_pkg/__init__.py.jinja", "", 0o644);

    let job = ScaffoldJob::builder()
        .source_root("/src")
        .target_root("/out/+name+")
        .variable("name", "widget")
        .build()
        .unwrap();

    let (result, _) = run(&fs, &job);
    result.unwrap();

    assert_eq!(fs.kind_of("/out/widget"), Some(EntryKind::Directory));
    assert_eq!(fs.read_to_string("/out/widget/widget.txt").as_deref(), Some("x"));
    assert_eq!(fs.kind_of("/out/widget/widget_pkg/__init__.py"), Some(EntryKind::File));
}

#[test]
fn undefined_filename_variable_aborts() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/+missing+.txt", "x", 0o644);

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    match result {
        Err(StencilError::Domain(DomainError::UndefinedFilenameVariable { name, .. })) => {
            assert_eq!(name, "missing");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(
        reporter
            .events()
            .iter()
            .all(|e| e.outcome() != ReconciliationOutcome::Created || e.subject() == Subject::Root)
    );
}

#[test]
fn undefined_template_variable_aborts() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/a.txt", "a", 0o644)
        .add_file("/src/b.jinja", "{{{ missing }}}", 0o644);

    let (result, _) = run(&fs, &job(ExistingPolicy::Overwrite));
    match result {
        Err(StencilError::Application(ApplicationError::UndefinedTemplateVariable {
            name,
            path,
            ..
        })) => {
            assert_eq!(name.as_deref(), Some("missing"));
            assert_eq!(path, PathBuf::from("/src/b.jinja"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // Entries reconciled before the failure stay in place.
    assert_eq!(fs.read_to_string("/out/a.txt").as_deref(), Some("a"));
    assert_eq!(fs.kind_of("/out/b"), None);
}

#[test]
fn second_run_is_all_identical() {
    let fs = greeting_source();
    fs.add_dir("/src/sub", 0o750)
        .add_file("/src/sub/run.sh", "#!/bin/sh\n", 0o755)
        .add_symlink("/src/latest", "sub/run.sh");

    let job = job(ExistingPolicy::Overwrite);
    run(&fs, &job).0.unwrap();
    let before = snapshot(&fs);

    let (result, reporter) = run(&fs, &job);
    result.unwrap();

    assert_eq!(snapshot(&fs), before);
    let events = reporter.events();
    assert_eq!(
        events[0].outcome(),
        ReconciliationOutcome::Skipped(SkipReason::Existing)
    );
    assert!(events[1..]
        .iter()
        .all(|e| e.outcome() == ReconciliationOutcome::Skipped(SkipReason::Identical)));
    assert_eq!(events.len(), 6);
}

#[test]
fn existing_target_root_is_refused() {
    let fs = greeting_source();
    fs.add_dir("/out", 0o755);

    let job = ScaffoldJob::builder()
        .source_root("/src")
        .target_root("/out")
        .variable("name", "Ada")
        .build()
        .unwrap();

    let (result, reporter) = run(&fs, &job);
    assert!(matches!(
        result,
        Err(StencilError::Application(ApplicationError::TargetRootExists { .. }))
    ));
    assert!(reporter.events().is_empty());
    assert_eq!(fs.kind_of("/out/notes.txt"), None);
}

#[test]
fn missing_source_root_is_refused() {
    let fs = MemoryFilesystem::new();
    let (result, _) = run(&fs, &job(ExistingPolicy::Overwrite));
    assert!(matches!(
        result,
        Err(StencilError::Application(ApplicationError::SourceRootNotDirectory { .. }))
    ));
    assert_eq!(fs.kind_of("/out"), None);
}

#[test]
fn source_root_linked_to_a_file_is_refused() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/real.txt", "x", 0o644).add_symlink("/src", "real.txt");

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    assert!(matches!(
        result,
        Err(StencilError::Application(ApplicationError::SourceRootNotDirectory { .. }))
    ));
    assert!(reporter.events().is_empty());
    assert_eq!(fs.kind_of("/out"), None);
}

#[test]
fn source_root_linked_to_a_directory_is_walked() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/templates/a.txt", "a", 0o600)
        .add_symlink("/src", "templates");

    let (result, _) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(fs.read_to_string("/out/a.txt").as_deref(), Some("a"));
    assert_eq!(fs.mode_of("/out/a.txt"), Some(Mode::from_raw(0o600)));
}

#[test]
fn target_root_linked_to_a_file_is_refused() {
    let fs = greeting_source();
    fs.add_file("/elsewhere", "x", 0o644).add_symlink("/out", "elsewhere");

    let (result, _) = run(&fs, &job(ExistingPolicy::Overwrite));
    assert!(matches!(
        result,
        Err(StencilError::Application(ApplicationError::TargetRootNotDirectory { .. }))
    ));
    assert_eq!(fs.read_to_string("/elsewhere").as_deref(), Some("x"));
}

// ── Policies ─────────────────────────────────────────────────────────────────

fn differing_target() -> MemoryFilesystem {
    let fs = greeting_source();
    fs.add_file("/out/notes.txt", "edited", 0o644)
        .add_file("/out/greeting", "Hello Ada!\n", 0o644);
    fs
}

#[test]
fn skip_policy_never_mutates() {
    let fs = differing_target();
    let before = snapshot(&fs);

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Skip));
    result.unwrap();

    assert_eq!(snapshot(&fs), before);
    let outcomes = reporter.outcomes();
    assert_eq!(
        outcomes[1..],
        [
            ReconciliationOutcome::Skipped(SkipReason::Existing),
            ReconciliationOutcome::Skipped(SkipReason::Existing),
        ]
    );
}

#[test]
fn overwrite_policy_updates_content_and_permissions() {
    let fs = differing_target();

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    // greeting only differed in mode
    assert_eq!(fs.mode_of("/out/greeting"), Some(Mode::from_raw(0o640)));
    assert_eq!(fs.read_to_string("/out/notes.txt").as_deref(), Some("static"));
    assert_eq!(fs.mode_of("/out/notes.txt"), Some(Mode::from_raw(0o600)));

    let events = reporter.events();
    assert_eq!(events[1].action(), Action::Chmod);
    assert_eq!(events[1].mode(), Some(Mode::from_raw(0o640)));
    assert_eq!(events[2].action(), Action::CopyOverwrite);
    assert!(events[1..]
        .iter()
        .all(|e| e.outcome() == ReconciliationOutcome::Updated));
}

#[test]
fn prompt_policy_follows_answers() {
    let fs = differing_target();

    let mut asker = MockAsker::new();
    asker
        .expect_confirm()
        .withf(|q, default| {
            q == "Update permissions of file /out/greeting to 640?" && *default == Some(false)
        })
        .times(1)
        .returning(|_, _| Ok(false));
    asker
        .expect_confirm()
        .withf(|q, default| q == "Overwrite file /out/notes.txt?" && *default == Some(false))
        .times(1)
        .returning(|_, _| Ok(true));

    let reporter = MemoryReporter::new();
    service(&fs, asker, &reporter)
        .render_structure(&job(ExistingPolicy::Prompt))
        .unwrap();

    assert_eq!(fs.mode_of("/out/greeting"), Some(Mode::from_raw(0o644)));
    assert_eq!(fs.read_to_string("/out/notes.txt").as_deref(), Some("static"));
    assert_eq!(
        reporter.outcomes()[1..],
        [
            ReconciliationOutcome::Skipped(SkipReason::Declined),
            ReconciliationOutcome::Updated,
        ]
    );
}

#[test]
fn prompt_is_not_shown_for_new_or_identical_entries() {
    let fs = greeting_source();
    fs.add_file("/out/notes.txt", "static", 0o600);

    let mut asker = MockAsker::new();
    asker.expect_confirm().never();

    let reporter = MemoryReporter::new();
    service(&fs, asker, &reporter)
        .render_structure(&job(ExistingPolicy::Prompt))
        .unwrap();

    assert_eq!(
        reporter.outcomes()[1..],
        [
            ReconciliationOutcome::Created,
            ReconciliationOutcome::Skipped(SkipReason::Identical),
        ]
    );
}

#[test]
fn directory_permissions_are_updated() {
    let fs = MemoryFilesystem::new();
    fs.add_dir("/src/bin", 0o750).add_dir("/out/bin", 0o755);

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(fs.mode_of("/out/bin"), Some(Mode::from_raw(0o750)));
    let events = reporter.events();
    let event = &events[1];
    assert_eq!(event.action(), Action::Chmod);
    assert_eq!(
        event.message(),
        "Updating permissions of directory /out/bin to 750"
    );
}

/// `bin` differs only in mode, `link` points somewhere else.
fn differing_dir_and_symlink() -> MemoryFilesystem {
    let fs = MemoryFilesystem::new();
    fs.add_dir("/src/bin", 0o750)
        .add_symlink("/src/link", "v2")
        .add_dir("/out/bin", 0o755)
        .add_symlink("/out/link", "v1");
    fs
}

fn asker_answering(answer: bool) -> MockAsker {
    let mut asker = MockAsker::new();
    asker
        .expect_confirm()
        .withf(|q, default| {
            q == "Update permissions of directory /out/bin to 750?" && *default == Some(false)
        })
        .times(1)
        .returning(move |_, _| Ok(answer));
    asker
        .expect_confirm()
        .withf(|q, default| q == "Overwrite symlink /out/link?" && *default == Some(false))
        .times(1)
        .returning(move |_, _| Ok(answer));
    asker
}

#[test]
fn declined_prompt_keeps_directory_and_symlink() {
    let fs = differing_dir_and_symlink();
    let before = snapshot(&fs);

    let reporter = MemoryReporter::new();
    service(&fs, asker_answering(false), &reporter)
        .render_structure(&job(ExistingPolicy::Prompt))
        .unwrap();

    assert_eq!(snapshot(&fs), before);
    assert_eq!(
        reporter.outcomes()[1..],
        [
            ReconciliationOutcome::Skipped(SkipReason::Declined),
            ReconciliationOutcome::Skipped(SkipReason::Declined),
        ]
    );
}

#[test]
fn accepted_prompt_updates_directory_and_symlink() {
    let fs = differing_dir_and_symlink();

    let reporter = MemoryReporter::new();
    service(&fs, asker_answering(true), &reporter)
        .render_structure(&job(ExistingPolicy::Prompt))
        .unwrap();

    assert_eq!(fs.mode_of("/out/bin"), Some(Mode::from_raw(0o750)));
    assert_eq!(fs.link_of("/out/link"), Some(PathBuf::from("v2")));

    let events = reporter.events();
    assert_eq!(events[1].action(), Action::SymlinkOverwrite);
    assert_eq!(events[2].action(), Action::Chmod);
    assert!(events[1..]
        .iter()
        .all(|e| e.outcome() == ReconciliationOutcome::Updated));
}

#[test]
fn skip_policy_keeps_directory_and_symlink() {
    let fs = differing_dir_and_symlink();
    let before = snapshot(&fs);

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Skip));
    result.unwrap();

    assert_eq!(snapshot(&fs), before);
    assert_eq!(
        reporter.outcomes()[1..],
        [
            ReconciliationOutcome::Skipped(SkipReason::Existing),
            ReconciliationOutcome::Skipped(SkipReason::Existing),
        ]
    );
}

// ── Type conflicts ───────────────────────────────────────────────────────────

#[test]
fn conflicting_directory_is_rejected_and_pruned() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/a.txt", "a", 0o644)
        .add_file("/src/sub/child.txt", "c", 0o644)
        .add_file("/src/zzz/other.txt", "o", 0o644)
        .add_file("/out/sub", "not a dir", 0o644);

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(fs.read_to_string("/out/sub").as_deref(), Some("not a dir"));
    assert_eq!(fs.kind_of("/out/sub/child.txt"), None);
    assert_eq!(fs.read_to_string("/out/a.txt").as_deref(), Some("a"));
    assert_eq!(fs.read_to_string("/out/zzz/other.txt").as_deref(), Some("o"));

    let rejected: Vec<_> = reporter
        .events()
        .into_iter()
        .filter(|e| e.outcome().is_rejected())
        .collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].severity(), Severity::Error);
    assert_eq!(rejected[0].target(), Path::new("/out/sub"));
    assert_eq!(rejected[0].message(), "Skipping existing non-directory /out/sub");
}

#[test]
fn conflicting_file_is_rejected() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/notes.txt", "n", 0o644)
        .add_dir("/out/notes.txt", 0o755);

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(fs.kind_of("/out/notes.txt"), Some(EntryKind::Directory));
    assert_eq!(
        reporter.events()[1].message(),
        "Skipping existing non-file /out/notes.txt"
    );
}

// ── Symlinks ─────────────────────────────────────────────────────────────────

#[test]
fn symlinks_are_recreated_with_suffix_stripped() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/real.txt", "r", 0o644)
        .add_symlink("/src/alias.jinja", "real.txt")
        .add_dir("/src/pkg", 0o755)
        .add_symlink("/src/pkglink", "pkg");

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(fs.link_of("/out/alias"), Some(PathBuf::from("real.txt")));
    assert_eq!(fs.link_of("/out/pkglink"), Some(PathBuf::from("pkg")));
    assert_eq!(fs.kind_of("/out/pkg"), Some(EntryKind::Directory));

    let actions: Vec<_> = reporter.events().iter().map(|e| e.action()).collect();
    assert_eq!(
        actions,
        [
            Action::Mkdir,
            Action::Symlink,
            Action::Copy,
            Action::Mkdir,
            Action::Symlink,
        ]
    );
}

#[test]
fn changed_symlink_is_overwritten() {
    let fs = MemoryFilesystem::new();
    fs.add_symlink("/src/current", "v2")
        .add_symlink("/out/current", "v1");

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    assert_eq!(fs.link_of("/out/current"), Some(PathBuf::from("v2")));
    assert_eq!(reporter.events()[1].action(), Action::SymlinkOverwrite);
}

// ── Layout ───────────────────────────────────────────────────────────────────

#[test]
fn later_roots_overlay_earlier_ones() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/base/readme.md", "base", 0o644)
        .add_file("/base/keep.txt", "keep", 0o644)
        .add_file("/extra/readme.md", "extra", 0o644)
        .add_file("/extra/more/added.txt", "added", 0o644);

    let job = ScaffoldJob::builder()
        .source_roots(["/base", "/extra"])
        .target_root("/out")
        .existing_policy(ExistingPolicy::Overwrite)
        .build()
        .unwrap();

    let (result, reporter) = run(&fs, &job);
    result.unwrap();

    assert_eq!(fs.read_to_string("/out/readme.md").as_deref(), Some("extra"));
    assert_eq!(fs.read_to_string("/out/keep.txt").as_deref(), Some("keep"));
    assert_eq!(fs.read_to_string("/out/more/added.txt").as_deref(), Some("added"));
    assert!(
        reporter
            .events()
            .iter()
            .any(|e| e.action() == Action::CopyOverwrite && e.target() == Path::new("/out/readme.md"))
    );
}

#[test]
fn ignored_entries_are_never_visited() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/mod.py", "x", 0o644)
        .add_file("/src/mod.pyc", "junk", 0o644)
        .add_file("/src/__pycache__/mod.cpython.pyc", "junk", 0o644)
        .add_file("/src/__pycache__/+undefined+.txt", "junk", 0o644);

    let job = ScaffoldJob::builder()
        .source_root("/src")
        .target_root("/out")
        .ignore_file("*.pyc")
        .ignore_dir("__pycache__")
        .build()
        .unwrap();

    let (result, reporter) = run(&fs, &job);
    result.unwrap();

    assert_eq!(fs.kind_of("/out/mod.pyc"), None);
    assert_eq!(fs.kind_of("/out/__pycache__"), None);
    assert_eq!(reporter.events().len(), 2);
}

#[test]
fn files_are_processed_before_directories() {
    let fs = MemoryFilesystem::new();
    fs.add_file("/src/a/inner.txt", "i", 0o644)
        .add_file("/src/b.txt", "b", 0o644)
        .add_file("/src/c/inner.txt", "i", 0o644)
        .add_file("/src/d.txt", "d", 0o644);

    let (result, reporter) = run(&fs, &job(ExistingPolicy::Overwrite));
    result.unwrap();

    let targets: Vec<_> = reporter
        .events()
        .iter()
        .map(|e| e.target().to_path_buf())
        .collect();
    let expected: Vec<PathBuf> = [
        "/out",
        "/out/b.txt",
        "/out/d.txt",
        "/out/a",
        "/out/c",
        "/out/a/inner.txt",
        "/out/c/inner.txt",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(targets, expected);
}
