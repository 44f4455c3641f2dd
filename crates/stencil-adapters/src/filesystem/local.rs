//! Local filesystem adapter using std::fs.

use std::fs::{self, FileType};
use std::io;
use std::path::{Path, PathBuf};

use stencil_core::{
    application::{
        ApplicationError,
        ports::{DirEntryInfo, Filesystem},
    },
    domain::{EntryKind, Mode},
    error::{StencilError, StencilResult},
};
use tracing::warn;
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn entry_kind(&self, path: &Path) -> StencilResult<Option<EntryKind>> {
        match fs::symlink_metadata(path) {
            Ok(meta) => match kind_of(meta.file_type()) {
                Some(kind) => Ok(Some(kind)),
                None => Err(ApplicationError::Filesystem {
                    path: path.to_path_buf(),
                    reason: "Unsupported file type".into(),
                }
                .into()),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(path, e, "inspect")),
        }
    }

    fn mode(&self, path: &Path) -> StencilResult<Mode> {
        let meta = fs::symlink_metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
        Ok(mode_of(&meta))
    }

    fn read(&self, path: &Path) -> StencilResult<Vec<u8>> {
        fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn resolves_to_dir(&self, path: &Path) -> StencilResult<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(path, e, "resolve")),
        }
    }

    fn read_link(&self, path: &Path) -> StencilResult<PathBuf> {
        fs::read_link(path).map_err(|e| map_io_error(path, e, "read symlink"))
    }

    fn list_dir(&self, path: &Path) -> StencilResult<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| StencilError::from(ApplicationError::Filesystem {
                path: path.to_path_buf(),
                reason: format!("Failed to list directory: {}", e),
            }))?;

            let Some(kind) = kind_of(entry.file_type()) else {
                warn!(path = %entry.path().display(), "Skipping special file");
                continue;
            };
            let points_to_dir = kind == EntryKind::Symlink
                && fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir());

            entries.push(DirEntryInfo {
                name: entry.file_name().to_os_string(),
                path: entry.path().to_path_buf(),
                kind,
                points_to_dir,
            });
        }

        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> StencilResult<()> {
        fs::create_dir(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> StencilResult<()> {
        fs::write(path, contents).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn set_mode(&self, path: &Path, mode: Mode) -> StencilResult<()> {
        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(mode.bits())
        };
        #[cfg(not(unix))]
        let permissions = {
            // Only the owner write bit has a counterpart here
            let mut permissions = fs::metadata(path)
                .map_err(|e| map_io_error(path, e, "get metadata"))?
                .permissions();
            permissions.set_readonly(mode.bits() & 0o200 == 0);
            permissions
        };

        fs::set_permissions(path, permissions)
            .map_err(|e| map_io_error(path, e, "set permissions"))
    }

    fn symlink(&self, link_target: &Path, path: &Path) -> StencilResult<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(link_target, path)
                .map_err(|e| map_io_error(path, e, "create symlink"))
        }
        #[cfg(not(unix))]
        {
            let _ = link_target;
            Err(ApplicationError::Filesystem {
                path: path.to_path_buf(),
                reason: "Symlinks are only supported on Unix".into(),
            }
            .into())
        }
    }

    fn remove_file(&self, path: &Path) -> StencilResult<()> {
        fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove"))
    }
}

fn kind_of(file_type: FileType) -> Option<EntryKind> {
    if file_type.is_symlink() {
        Some(EntryKind::Symlink)
    } else if file_type.is_dir() {
        Some(EntryKind::Directory)
    } else if file_type.is_file() {
        Some(EntryKind::File)
    } else {
        None
    }
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> Mode {
    use std::os::unix::fs::PermissionsExt;
    Mode::from_raw(meta.permissions().mode())
}

#[cfg(not(unix))]
fn mode_of(meta: &fs::Metadata) -> Mode {
    let write = if meta.permissions().readonly() { 0 } else { 0o200 };
    let exec = if meta.is_dir() { 0o111 } else { 0 };
    Mode::from_raw(0o444 | write | exec)
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> StencilError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
