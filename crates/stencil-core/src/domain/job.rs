//! The scaffold job: everything one rendering run needs to know.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::{
    error::DomainError, ignore::IgnorePatterns, value_objects::ExistingPolicy,
};

/// Variable name to substitution value, shared by filenames and content.
pub type Variables = BTreeMap<String, String>;

// ── TemplateSuffix ───────────────────────────────────────────────────────────

/// How template files are told apart from files that are copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSuffix {
    /// Every file is a template.
    All,
    /// Only files ending in this suffix are templates. Always starts with `.`.
    Suffix(String),
}

impl TemplateSuffix {
    pub const DEFAULT: &'static str = ".jinja";

    /// Normalise a user-supplied suffix: `html` and `.html` are the same,
    /// and an empty suffix means every file is a template.
    pub fn new(suffix: impl AsRef<str>) -> Self {
        let suffix = suffix.as_ref().trim();
        if suffix.is_empty() {
            Self::All
        } else if suffix.starts_with('.') {
            Self::Suffix(suffix.to_string())
        } else {
            Self::Suffix(format!(".{suffix}"))
        }
    }

    /// Classify a source file name.
    ///
    /// Returns whether the file is a template, and the name the target
    /// entry should have before variable substitution.
    pub fn classify<'a>(&self, name: &'a str) -> (bool, &'a str) {
        match self {
            Self::All => (true, name),
            Self::Suffix(suffix) => match name.strip_suffix(suffix.as_str()) {
                Some(stem) if !stem.is_empty() => (true, stem),
                _ => (false, name),
            },
        }
    }

    /// Strip the suffix from a name if present; used for symlinks, whose
    /// names follow the template convention even though they are never
    /// rendered.
    pub fn strip<'a>(&self, name: &'a str) -> &'a str {
        self.classify(name).1
    }

    pub fn as_suffix(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Suffix(s) => Some(s),
        }
    }
}

impl Default for TemplateSuffix {
    fn default() -> Self {
        Self::Suffix(Self::DEFAULT.to_string())
    }
}

// ── ScaffoldJob ──────────────────────────────────────────────────────────────

/// Root configuration for one rendering run.
///
/// Immutable once built; construct with [`ScaffoldJob::builder`].
#[derive(Debug, Clone)]
pub struct ScaffoldJob {
    source_roots: Vec<PathBuf>,
    target_root: PathBuf,
    variables: Variables,
    ignored_files: IgnorePatterns,
    ignored_dirs: IgnorePatterns,
    template_suffix: TemplateSuffix,
    overwrite_target_root: bool,
    existing_policy: ExistingPolicy,
}

impl ScaffoldJob {
    pub fn builder() -> ScaffoldJobBuilder {
        ScaffoldJobBuilder::default()
    }

    /// Template trees in overlay order; later roots win on conflicts.
    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    /// Destination, possibly still containing `+name+` tokens.
    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn ignored_files(&self) -> &IgnorePatterns {
        &self.ignored_files
    }

    pub fn ignored_dirs(&self) -> &IgnorePatterns {
        &self.ignored_dirs
    }

    pub fn template_suffix(&self) -> &TemplateSuffix {
        &self.template_suffix
    }

    pub fn overwrite_target_root(&self) -> bool {
        self.overwrite_target_root
    }

    pub fn existing_policy(&self) -> ExistingPolicy {
        self.existing_policy
    }
}

/// Builder for [`ScaffoldJob`]; patterns are compiled in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ScaffoldJobBuilder {
    source_roots: Vec<PathBuf>,
    target_root: Option<PathBuf>,
    variables: Variables,
    ignored_files: Vec<String>,
    ignored_dirs: Vec<String>,
    template_suffix: TemplateSuffix,
    overwrite_target_root: bool,
    existing_policy: ExistingPolicy,
}

impl ScaffoldJobBuilder {
    pub fn source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_roots.push(root.into());
        self
    }

    pub fn source_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.source_roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn target_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.target_root = Some(root.into());
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn ignore_file(mut self, pattern: impl Into<String>) -> Self {
        self.ignored_files.push(pattern.into());
        self
    }

    pub fn ignore_files<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_files.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn ignore_dir(mut self, pattern: impl Into<String>) -> Self {
        self.ignored_dirs.push(pattern.into());
        self
    }

    pub fn ignore_dirs<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn template_suffix(mut self, suffix: TemplateSuffix) -> Self {
        self.template_suffix = suffix;
        self
    }

    pub fn overwrite_target_root(mut self, allowed: bool) -> Self {
        self.overwrite_target_root = allowed;
        self
    }

    pub fn existing_policy(mut self, policy: ExistingPolicy) -> Self {
        self.existing_policy = policy;
        self
    }

    pub fn build(self) -> Result<ScaffoldJob, DomainError> {
        if self.source_roots.is_empty() {
            return Err(DomainError::MissingSourceRoot);
        }
        let target_root = self
            .target_root
            .ok_or(DomainError::MissingRequiredField {
                field: "target_root",
            })?;

        Ok(ScaffoldJob {
            source_roots: self.source_roots,
            target_root,
            variables: self.variables,
            ignored_files: IgnorePatterns::new(self.ignored_files)?,
            ignored_dirs: IgnorePatterns::new(self.ignored_dirs)?,
            template_suffix: self.template_suffix,
            overwrite_target_root: self.overwrite_target_root,
            existing_policy: self.existing_policy,
        })
    }
}

/// Parse a `name=value` definition as given on a command line.
pub fn parse_variable(definition: &str) -> Result<(String, String), DomainError> {
    match definition.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(DomainError::InvalidVariable(definition.to_string())),
    }
}
