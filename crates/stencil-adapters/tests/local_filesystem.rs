//! Runs against a real directory tree.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::{Path, PathBuf};

use stencil_adapters::{FixedPrompter, LocalFilesystem, MemoryReporter, MiniJinjaRenderer};
use stencil_core::{
    application::{ApplicationError, ScaffoldService},
    domain::{ExistingPolicy, ReconciliationOutcome, ScaffoldJob, Severity, SkipReason},
    error::StencilError,
};
use tempfile::TempDir;

fn write(path: &Path, contents: &str, mode: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

fn mode(path: &Path) -> u32 {
    fs::symlink_metadata(path).unwrap().permissions().mode() & 0o7777
}

fn service(reporter: &MemoryReporter) -> ScaffoldService {
    ScaffoldService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(MiniJinjaRenderer::new().unwrap()),
        Box::new(FixedPrompter::no()),
        Box::new(reporter.clone()),
    )
}

fn job(source: &Path, target: &Path, policy: ExistingPolicy) -> ScaffoldJob {
    ScaffoldJob::builder()
        .source_root(source)
        .target_root(target)
        .variable("name", "Ada")
        .overwrite_target_root(true)
        .existing_policy(policy)
        .ignore_file("*.pyc")
        .ignore_dir("__pycache__")
        .build()
        .unwrap()
}

#[test]
fn scaffolds_a_tree_and_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let out = temp.path().join("out");

    write(&src.join("greeting.jinja"), "Hello {{{ name }}}!\n", 0o640);
    write(&src.join("notes.txt"), "static", 0o600);
    write(&src.join("bin/+name+.sh"), "#!/bin/sh\necho hi\n", 0o755);
    write(&src.join("cache.pyc"), "junk", 0o644);
    write(&src.join("__pycache__/x.pyc"), "junk", 0o644);
    fs::set_permissions(src.join("bin"), fs::Permissions::from_mode(0o750)).unwrap();
    symlink("notes.txt", src.join("latest")).unwrap();

    let reporter = MemoryReporter::new();
    let summary = service(&reporter)
        .render_structure(&job(&src, &out, ExistingPolicy::Overwrite))
        .unwrap();

    assert_eq!(fs::read_to_string(out.join("greeting")).unwrap(), "Hello Ada!\n");
    assert_eq!(mode(&out.join("greeting")), 0o640);
    assert_eq!(mode(&out.join("notes.txt")), 0o600);
    assert_eq!(mode(&out.join("bin")), 0o750);
    assert_eq!(mode(&out.join("bin/Ada.sh")), 0o755);
    assert_eq!(fs::read_link(out.join("latest")).unwrap(), Path::new("notes.txt"));
    assert!(!out.join("cache.pyc").exists());
    assert!(!out.join("__pycache__").exists());
    assert_eq!(summary.created, 6);

    let reporter = MemoryReporter::new();
    let summary = service(&reporter)
        .render_structure(&job(&src, &out, ExistingPolicy::Overwrite))
        .unwrap();

    assert!(summary.is_unchanged());
    assert!(reporter.outcomes()[1..]
        .iter()
        .all(|o| *o == ReconciliationOutcome::Skipped(SkipReason::Identical)));
}

#[test]
fn content_overwrite_restores_source_permissions() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let out = temp.path().join("out");

    write(&src.join("run.sh"), "new", 0o700);
    write(&out.join("run.sh"), "old", 0o644);

    let reporter = MemoryReporter::new();
    service(&reporter)
        .render_structure(&job(&src, &out, ExistingPolicy::Overwrite))
        .unwrap();

    assert_eq!(fs::read_to_string(out.join("run.sh")).unwrap(), "new");
    assert_eq!(mode(&out.join("run.sh")), 0o700);
}

#[test]
fn file_in_place_of_directory_is_left_alone() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let out = temp.path().join("out");

    write(&src.join("pkg/mod.txt"), "m", 0o644);
    write(&src.join("top.txt"), "t", 0o644);
    write(&out.join("pkg"), "occupied", 0o644);

    let reporter = MemoryReporter::new();
    let summary = service(&reporter)
        .render_structure(&job(&src, &out, ExistingPolicy::Overwrite))
        .unwrap();

    assert_eq!(fs::read_to_string(out.join("pkg")).unwrap(), "occupied");
    assert_eq!(fs::read_to_string(out.join("top.txt")).unwrap(), "t");
    assert_eq!(summary.rejected, 1);
    assert!(reporter
        .events()
        .iter()
        .any(|e| e.severity() == Severity::Error && e.target() == out.join("pkg")));
}

#[test]
fn skip_policy_keeps_local_edits() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let out = temp.path().join("out");

    write(&src.join("config.toml"), "a = 1\n", 0o644);
    write(&out.join("config.toml"), "a = 2\n", 0o600);

    let reporter = MemoryReporter::new();
    service(&reporter)
        .render_structure(&job(&src, &out, ExistingPolicy::Skip))
        .unwrap();

    assert_eq!(fs::read_to_string(out.join("config.toml")).unwrap(), "a = 2\n");
    assert_eq!(mode(&out.join("config.toml")), 0o600);
    assert_eq!(
        reporter.outcomes()[1],
        ReconciliationOutcome::Skipped(SkipReason::Existing)
    );
}

/// Makes directories writable again on drop so the temp dir can be removed.
struct Unlock(Vec<PathBuf>);

impl Drop for Unlock {
    fn drop(&mut self) {
        for dir in &self.0 {
            let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o755));
        }
    }
}

#[test]
fn read_only_directory_is_filled_before_its_mode_is_applied() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    let out = temp.path().join("out");
    let _unlock = Unlock(vec![
        src.join("locked/deeper"),
        src.join("locked"),
        out.join("locked/deeper"),
        out.join("locked"),
    ]);

    write(&src.join("locked/inner.txt"), "inside", 0o444);
    write(&src.join("locked/deeper/leaf.txt"), "leaf", 0o444);
    fs::set_permissions(src.join("locked/deeper"), fs::Permissions::from_mode(0o555)).unwrap();
    fs::set_permissions(src.join("locked"), fs::Permissions::from_mode(0o555)).unwrap();

    let reporter = MemoryReporter::new();
    service(&reporter)
        .render_structure(&job(&src, &out, ExistingPolicy::Overwrite))
        .unwrap();

    assert_eq!(fs::read_to_string(out.join("locked/inner.txt")).unwrap(), "inside");
    assert_eq!(fs::read_to_string(out.join("locked/deeper/leaf.txt")).unwrap(), "leaf");
    assert_eq!(mode(&out.join("locked")), 0o555);
    assert_eq!(mode(&out.join("locked/deeper")), 0o555);
}

#[test]
fn source_root_linked_to_a_file_is_refused() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file.txt");
    let src = temp.path().join("src");
    write(&file, "x", 0o644);
    symlink(&file, &src).unwrap();

    let reporter = MemoryReporter::new();
    let result = service(&reporter)
        .render_structure(&job(&src, &temp.path().join("out"), ExistingPolicy::Overwrite));

    assert!(matches!(
        result,
        Err(StencilError::Application(ApplicationError::SourceRootNotDirectory { .. }))
    ));
    assert!(!temp.path().join("out").exists());
}
