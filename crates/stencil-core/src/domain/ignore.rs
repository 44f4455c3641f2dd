//! Glob matching against single entry names.

use std::ffi::OsStr;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::domain::error::DomainError;

/// A compiled list of glob patterns.
///
/// Patterns are matched against one path component (the entry's name), so
/// `*` effectively matches any run of characters in that name.
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
    set: GlobSet,
}

impl IgnorePatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = Glob::new(pattern).map_err(|e| DomainError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.kind().to_string(),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| DomainError::InvalidPattern {
            pattern: patterns.join(", "),
            reason: e.to_string(),
        })?;
        Ok(Self { patterns, set })
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    /// True if `name` matches any of the patterns.
    pub fn matches(&self, name: impl AsRef<OsStr>) -> bool {
        self.set.is_match(name.as_ref())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for IgnorePatterns {
    fn default() -> Self {
        Self::empty()
    }
}
