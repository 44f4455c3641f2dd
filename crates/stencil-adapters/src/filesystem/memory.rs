//! In-memory filesystem adapter for testing.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use stencil_core::{
    application::{
        ApplicationError,
        ports::{DirEntryInfo, Filesystem},
    },
    domain::{EntryKind, Mode},
    error::StencilResult,
};

const DEFAULT_DIR_MODE: u32 = 0o755;
const SYMLINK_MODE: u32 = 0o777;
const MAX_LINK_HOPS: usize = 40;

/// In-memory filesystem for testing.
///
/// Paths are absolute; `/` always exists. Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<BTreeMap<PathBuf, Node>>>,
}

#[derive(Debug, Clone)]
enum Node {
    File { contents: Vec<u8>, mode: Mode },
    Directory { mode: Mode },
    Symlink { target: PathBuf },
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self {
            Self::File { .. } => EntryKind::File,
            Self::Directory { .. } => EntryKind::Directory,
            Self::Symlink { .. } => EntryKind::Symlink,
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Add a directory (and missing parents) with the given mode.
    pub fn add_dir(&self, path: impl AsRef<Path>, mode: u32) -> &Self {
        let path = path.as_ref();
        let mut nodes = self.write();
        Self::insert_parents(&mut nodes, path);
        nodes.insert(
            path.to_path_buf(),
            Node::Directory {
                mode: Mode::from_raw(mode),
            },
        );
        self
    }

    /// Add a file (and missing parents) with the given contents and mode.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>, mode: u32) -> &Self {
        let path = path.as_ref();
        let mut nodes = self.write();
        Self::insert_parents(&mut nodes, path);
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                contents: contents.as_ref().to_vec(),
                mode: Mode::from_raw(mode),
            },
        );
        self
    }

    /// Add a symlink (and missing parents) pointing at `target`.
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> &Self {
        let path = path.as_ref();
        let mut nodes = self.write();
        Self::insert_parents(&mut nodes, path);
        nodes.insert(
            path.to_path_buf(),
            Node::Symlink {
                target: target.as_ref().to_path_buf(),
            },
        );
        self
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.read_lock().get(path.as_ref()) {
            Some(Node::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    /// Read a file's content as UTF-8 (testing helper).
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.read_file(path)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// Mode of a file or directory (testing helper).
    pub fn mode_of(&self, path: impl AsRef<Path>) -> Option<Mode> {
        match self.read_lock().get(path.as_ref())? {
            Node::File { mode, .. } | Node::Directory { mode } => Some(*mode),
            Node::Symlink { .. } => Some(Mode::from_raw(SYMLINK_MODE)),
        }
    }

    /// Unresolved target of a symlink (testing helper).
    pub fn link_of(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        match self.read_lock().get(path.as_ref())? {
            Node::Symlink { target } => Some(target.clone()),
            _ => None,
        }
    }

    /// Kind of the entry at `path`, if any (testing helper).
    pub fn kind_of(&self, path: impl AsRef<Path>) -> Option<EntryKind> {
        self.read_lock().get(path.as_ref()).map(Node::kind)
    }

    /// Every path in the tree, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.read_lock().keys().cloned().collect()
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn read_lock(&self) -> RwLockReadGuard<'_, BTreeMap<PathBuf, Node>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<PathBuf, Node>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_parents(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if is_root(ancestor) {
                break;
            }
            nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Directory {
                    mode: Mode::from_raw(DEFAULT_DIR_MODE),
                });
        }
    }

    fn is_dir(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> bool {
        is_root(path) || matches!(nodes.get(path), Some(Node::Directory { .. }))
    }

    /// Follow symlinks in every component of `path`, the last one included.
    fn resolve(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> PathBuf {
        let mut hops = 0;
        let mut resolved = PathBuf::new();
        for component in path.components() {
            resolved.push(component);
            while let Some(Node::Symlink { target }) = nodes.get(&resolved) {
                if hops == MAX_LINK_HOPS {
                    return resolved;
                }
                hops += 1;
                resolved = match resolved.parent() {
                    Some(parent) => parent.join(target),
                    None => target.clone(),
                };
            }
        }
        resolved
    }

    /// Like `resolve`, but a symlink in the last component is kept.
    fn locate(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> PathBuf {
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => Self::resolve(nodes, parent).join(name),
            _ => path.to_path_buf(),
        }
    }

    fn ensure_parent(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> StencilResult<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !Self::is_dir(nodes, parent) => {
                Err(fs_error(path, "Parent directory does not exist"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn entry_kind(&self, path: &Path) -> StencilResult<Option<EntryKind>> {
        if is_root(path) {
            return Ok(Some(EntryKind::Directory));
        }
        let nodes = self.read_lock();
        Ok(nodes.get(&Self::locate(&nodes, path)).map(Node::kind))
    }

    fn mode(&self, path: &Path) -> StencilResult<Mode> {
        if is_root(path) {
            return Ok(Mode::from_raw(DEFAULT_DIR_MODE));
        }
        let nodes = self.read_lock();
        match nodes.get(&Self::locate(&nodes, path)) {
            Some(Node::File { mode, .. } | Node::Directory { mode }) => Ok(*mode),
            Some(Node::Symlink { .. }) => Ok(Mode::from_raw(SYMLINK_MODE)),
            None => Err(fs_error(path, "No such file or directory")),
        }
    }

    fn read(&self, path: &Path) -> StencilResult<Vec<u8>> {
        let nodes = self.read_lock();
        match nodes.get(&Self::resolve(&nodes, path)) {
            Some(Node::File { contents, .. }) => Ok(contents.clone()),
            Some(_) => Err(fs_error(path, "Not a file")),
            None => Err(fs_error(path, "No such file or directory")),
        }
    }

    fn resolves_to_dir(&self, path: &Path) -> StencilResult<bool> {
        let nodes = self.read_lock();
        Ok(Self::is_dir(&nodes, &Self::resolve(&nodes, path)))
    }

    fn read_link(&self, path: &Path) -> StencilResult<PathBuf> {
        let nodes = self.read_lock();
        match nodes.get(&Self::locate(&nodes, path)) {
            Some(Node::Symlink { target }) => Ok(target.clone()),
            _ => Err(fs_error(path, "Not a symlink")),
        }
    }

    fn list_dir(&self, path: &Path) -> StencilResult<Vec<DirEntryInfo>> {
        let nodes = self.read_lock();
        let dir = Self::resolve(&nodes, path);
        if !Self::is_dir(&nodes, &dir) {
            return Err(fs_error(path, "Not a directory"));
        }

        // BTreeMap order keeps siblings sorted by name.
        Ok(nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(dir.as_path()))
            .filter_map(|(child, node)| {
                let name = child.file_name()?.to_os_string();
                let points_to_dir = matches!(node, Node::Symlink { .. })
                    && Self::is_dir(&nodes, &Self::resolve(&nodes, child));
                Some(DirEntryInfo {
                    path: path.join(&name),
                    name,
                    kind: node.kind(),
                    points_to_dir,
                })
            })
            .collect())
    }

    fn create_dir(&self, path: &Path) -> StencilResult<()> {
        let mut nodes = self.write();
        let located = Self::locate(&nodes, path);
        Self::ensure_parent(&nodes, &located)?;
        if is_root(&located) || nodes.contains_key(&located) {
            return Err(fs_error(path, "File exists"));
        }
        nodes.insert(
            located,
            Node::Directory {
                mode: Mode::from_raw(DEFAULT_DIR_MODE),
            },
        );
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        let mut nodes = self.write();
        let mut missing = Vec::new();
        for ancestor in path.ancestors() {
            if is_root(ancestor) || ancestor.as_os_str().is_empty() {
                break;
            }
            match nodes.get(ancestor) {
                Some(Node::Directory { .. }) => break,
                Some(Node::Symlink { .. }) if Self::is_dir(&nodes, &Self::resolve(&nodes, ancestor)) => {
                    break;
                }
                Some(_) => return Err(fs_error(ancestor, "Not a directory")),
                None => missing.push(ancestor.to_path_buf()),
            }
        }
        for dir in missing {
            let located = Self::locate(&nodes, &dir);
            nodes.insert(
                located,
                Node::Directory {
                    mode: Mode::from_raw(DEFAULT_DIR_MODE),
                },
            );
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> StencilResult<()> {
        let mut nodes = self.write();
        let located = Self::resolve(&nodes, path);
        Self::ensure_parent(&nodes, &located)?;
        match nodes.get_mut(&located) {
            Some(Node::File { contents: old, .. }) => {
                *old = contents.to_vec();
                Ok(())
            }
            Some(_) => Err(fs_error(path, "Not a file")),
            None => {
                nodes.insert(
                    located,
                    Node::File {
                        contents: contents.to_vec(),
                        mode: Mode::from_raw(0o644),
                    },
                );
                Ok(())
            }
        }
    }

    fn set_mode(&self, path: &Path, mode: Mode) -> StencilResult<()> {
        let mut nodes = self.write();
        let located = Self::resolve(&nodes, path);
        match nodes.get_mut(&located) {
            Some(Node::File { mode: old, .. }) | Some(Node::Directory { mode: old }) => {
                *old = mode;
                Ok(())
            }
            Some(Node::Symlink { .. }) => Err(fs_error(path, "Too many levels of symbolic links")),
            None => Err(fs_error(path, "No such file or directory")),
        }
    }

    fn symlink(&self, link_target: &Path, path: &Path) -> StencilResult<()> {
        let mut nodes = self.write();
        let located = Self::locate(&nodes, path);
        Self::ensure_parent(&nodes, &located)?;
        if nodes.contains_key(&located) {
            return Err(fs_error(path, "File exists"));
        }
        nodes.insert(
            located,
            Node::Symlink {
                target: link_target.to_path_buf(),
            },
        );
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> StencilResult<()> {
        let mut nodes = self.write();
        let located = Self::locate(&nodes, path);
        match nodes.get(&located).map(Node::kind) {
            Some(EntryKind::Directory) => Err(fs_error(path, "Is a directory")),
            Some(_) => {
                nodes.remove(&located);
                Ok(())
            }
            None => Err(fs_error(path, "No such file or directory")),
        }
    }
}

fn is_root(path: &Path) -> bool {
    path.parent().is_none() && path.has_root()
}

fn fs_error(path: &Path, reason: &str) -> stencil_core::error::StencilError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}
