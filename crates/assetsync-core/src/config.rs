use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::store::github::GithubOptions;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_secs: 0.25,
            max_delay_secs: 10,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let base = if cfg.base_delay_secs.is_finite() && cfg.base_delay_secs > 0.0 {
            Duration::from_secs_f64(cfg.base_delay_secs)
        } else {
            Duration::ZERO
        };
        RetryPolicy {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: base,
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/assetsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Base URL of the GitHub REST API (tree listings).
    pub api_url: String,
    /// Base URL of the raw content host (file bodies).
    pub raw_url: String,
    /// User-Agent sent with every request; the GitHub API rejects requests without one.
    pub user_agent: String,
    /// Branch used when a source does not name one.
    pub default_branch: String,
    /// Cache time-to-live in seconds used when a source does not set one.
    pub default_ttl_secs: u64,
    /// Maximum number of item fetches in flight at once.
    pub max_concurrent_fetches: usize,
    /// Connect timeout for each request, in seconds.
    pub connect_timeout_secs: u64,
    /// Overall timeout for each request, in seconds.
    pub request_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
            user_agent: concat!("assetsync/", env!("CARGO_PKG_VERSION")).to_string(),
            default_branch: crate::source::DEFAULT_BRANCH.to_string(),
            default_ttl_secs: crate::source::DEFAULT_TTL_SECS,
            max_concurrent_fetches: 16,
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            retry: None,
        }
    }
}

impl AssetsConfig {
    /// Effective retry policy (config section or built-in defaults).
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    /// Options for the GitHub-backed store derived from this config.
    pub fn github_options(&self) -> GithubOptions {
        GithubOptions {
            api_url: self.api_url.clone(),
            raw_url: self.raw_url.clone(),
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            retry: self.retry_policy(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AssetsConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AssetsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AssetsConfig = toml::from_str(&data)?;
    Ok(cfg)
}
