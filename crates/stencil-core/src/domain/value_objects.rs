//! Domain value objects: ExistingPolicy, EntryKind, Mode, Fingerprint.
//!
//! These are pure value types with equality-by-value and no identity.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

// ── ExistingPolicy ───────────────────────────────────────────────────────────

/// Run-wide rule for target entries that already exist and differ from
/// their source.
///
/// Matched exhaustively by the reconciler; a new policy cannot be added
/// without deciding what it does for every entry kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Leave differing entries untouched.
    Skip,
    /// Ask before changing each differing entry.
    #[default]
    Prompt,
    /// Bring every differing entry in line with its source.
    Overwrite,
}

impl ExistingPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Prompt => "prompt",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for ExistingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExistingPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "prompt" | "ask" => Ok(Self::Prompt),
            "overwrite" | "force" => Ok(Self::Overwrite),
            other => Err(DomainError::InvalidPolicy(other.to_string())),
        }
    }
}

// ── EntryKind ────────────────────────────────────────────────────────────────

/// The three kinds of filesystem entry the engine materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

impl EntryKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Mode ─────────────────────────────────────────────────────────────────────

/// POSIX permission bits of an entry, without the file-type bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mode(u32);

impl Mode {
    /// Permission, setuid, setgid and sticky bits.
    pub const MASK: u32 = 0o7777;

    /// Build a mode from a raw `st_mode`, discarding the file-type bits.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & Self::MASK)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

// ── Fingerprint ──────────────────────────────────────────────────────────────

/// Content fingerprint used only to decide whether two entries are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sha256:")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}
