//! Remote source descriptor: which repository, branch, and directory to mount.

use std::time::Duration;

/// Branch used when a source does not name one.
pub const DEFAULT_BRANCH: &str = "main";
/// Directory used when a source does not name one (repository root).
pub const DEFAULT_DIR: &str = "/";
/// Cache time-to-live in seconds used when a source does not set one.
pub const DEFAULT_TTL_SECS: u64 = 600;

/// Caller-facing options; unset (or empty/zero) fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub repo: String,
    pub branch: Option<String>,
    pub dir: Option<String>,
    pub ttl_secs: Option<u64>,
}

/// Immutable description of a remote repository view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceDescriptor {
    repo: String,
    branch: String,
    dir: String,
    ttl_secs: u64,
}

impl SourceDescriptor {
    /// Descriptor for `repo` with default branch, dir, and ttl.
    pub fn new(repo: impl Into<String>) -> Self {
        Self::from_options(SourceOptions {
            repo: repo.into(),
            ..SourceOptions::default()
        })
    }

    /// Resolve options against the built-in defaults.
    pub fn from_options(opts: SourceOptions) -> Self {
        Self::with_defaults(opts, DEFAULT_BRANCH, DEFAULT_TTL_SECS)
    }

    /// Resolve options against caller-supplied defaults (e.g. from config).
    /// Empty strings and a zero ttl count as unset.
    pub fn with_defaults(opts: SourceOptions, default_branch: &str, default_ttl_secs: u64) -> Self {
        let branch = opts
            .branch
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| default_branch.to_string());
        let dir = opts
            .dir
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIR.to_string());
        let ttl_secs = opts
            .ttl_secs
            .filter(|t| *t > 0)
            .unwrap_or(default_ttl_secs);
        Self {
            repo: opts.repo.trim().to_string(),
            branch: branch.trim().to_string(),
            dir,
            ttl_secs,
        }
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Sub-directory as given (`/` means the repository root).
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
