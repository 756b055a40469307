//! Store keys: delimiter-encoded identifiers that map onto relative file paths.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Reserved character that stands for a path separator inside a key.
pub const KEY_DELIMITER: char = ':';

/// Identifier of one entry in a virtual store, e.g. `docs:img:logo.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(String);

impl StoreKey {
    /// Wrap a key exactly as the store reported it.
    pub fn new(raw: impl Into<String>) -> Self {
        StoreKey(raw.into())
    }

    /// Build a key from a `/`- or `\`-separated path.
    ///
    /// Separators become the delimiter, runs collapse, and leading/trailing
    /// delimiters are dropped: `/docs//readme.md` → `docs:readme.md`.
    pub fn from_path(path: &str) -> Self {
        let joined = path
            .split(|c| c == '/' || c == '\\' || c == KEY_DELIMITER)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(":");
        StoreKey(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Relative filesystem path for this key, one component per segment.
    ///
    /// Returns `None` when the key is empty or a segment is `.` or `..`,
    /// since such a path would not stay under the destination root.
    pub fn to_relative_path(&self) -> Option<PathBuf> {
        let mut out = PathBuf::new();
        for segment in self
            .0
            .split(|c| c == KEY_DELIMITER || c == '/')
            .filter(|s| !s.is_empty())
        {
            let mut parts = Path::new(segment).components();
            match (parts.next(), parts.next()) {
                (Some(Component::Normal(part)), None) => out.push(part),
                _ => return None,
            }
        }
        if out.as_os_str().is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreKey {
    fn from(s: &str) -> Self {
        StoreKey::new(s)
    }
}

impl From<String> for StoreKey {
    fn from(s: String) -> Self {
        StoreKey::new(s)
    }
}
