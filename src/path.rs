//! Canonical paths and the subtree relation
//!
//! Every subtree-scoped operation (forget, harvest, rollups) compares paths
//! in one string form: absolute, symlink-resolved, no trailing separator.

use crate::error::PathError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator used in canonical path strings
pub const SEPARATOR: char = '/';

/// An absolute, symlink-free, trailing-separator-stripped path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Wrap a string that is already in canonical form.
    ///
    /// Used for paths read back from the store and for paths built by the
    /// walker from a canonical root; no filesystem access happens here.
    pub fn from_canonical(path: impl Into<String>) -> Self {
        let mut path = path.into();
        while path.len() > 1 && path.ends_with(SEPARATOR) {
            path.pop();
        }
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// True for the filesystem root `/`
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Subtree relation: `other` equals this path or lies beneath it.
    ///
    /// This is a prefix test with a separator boundary, so `/data/foobar`
    /// is not under `/data/foo`.
    pub fn contains(&self, other: &str) -> bool {
        if other == self.0 {
            return true;
        }
        if self.is_root() {
            return other.starts_with(SEPARATOR);
        }
        other
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }

    /// Half-open string range `[lower, upper)` holding exactly the strings
    /// that start with this path plus a separator.
    ///
    /// `'0'` is the byte after `'/'`, so under byte-wise comparison nothing
    /// outside the subtree can sort between the bounds.
    pub fn subtree_range(&self) -> (String, String) {
        let base = if self.is_root() { "" } else { self.0.as_str() };
        (format!("{base}/"), format!("{base}0"))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Resolve `path` to its canonical form.
///
/// Strict: the path must exist, resolve, and be valid UTF-8.
pub fn canonicalize(path: impl AsRef<Path>) -> Result<CanonicalPath, PathError> {
    let path = path.as_ref();
    let resolved = std::fs::canonicalize(path).map_err(|e| PathError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let resolved = resolved.into_os_string().into_string().map_err(|_| PathError::Invalid {
        path: path.to_path_buf(),
        reason: "path is not valid UTF-8".into(),
    })?;
    Ok(CanonicalPath::from_canonical(resolved))
}

/// Resolve `path` and require it to be a directory
pub fn canonicalize_dir(path: impl AsRef<Path>) -> Result<CanonicalPath, PathError> {
    let canonical = canonicalize(path.as_ref())?;
    if !canonical.as_path().is_dir() {
        return Err(PathError::NotADirectory {
            path: PathBuf::from(canonical.as_str()),
        });
    }
    Ok(canonical)
}
