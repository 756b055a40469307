//! GitHub-backed store.
//!
//! Keys come from the recursive git tree of `repo@branch`, restricted to
//! `dir`. Bodies come from the raw content host. Both the listing and
//! fetched bodies are cached for the source's ttl; when it expires the next
//! access reloads the listing and drops every cached body.

mod decode;
mod http;
mod tree;

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use url::Url;

use super::{AssetStore, StoreBackend, StoreError};
use crate::key::StoreKey;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::source::SourceDescriptor;
use crate::value::ItemValue;

pub use decode::decode_body;
pub use http::HttpResponse;
pub use tree::{parse_listing, Listing, TreeFile};

/// Endpoints and transfer settings for the GitHub backend.
#[derive(Debug, Clone)]
pub struct GithubOptions {
    pub api_url: String,
    pub raw_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GithubOptions {
    fn default() -> Self {
        crate::config::AssetsConfig::default().github_options()
    }
}

impl StoreBackend for GithubOptions {
    type Store = GithubStore;

    fn backend_id(&self) -> String {
        format!("github:{}|{}", self.api_url, self.raw_url)
    }

    fn open(&self, source: &SourceDescriptor) -> Result<GithubStore, StoreError> {
        GithubStore::mount(source, self.clone())
    }
}

struct CachedFile {
    file: TreeFile,
    body: Option<ItemValue>,
}

struct Snapshot {
    files: std::collections::HashMap<StoreKey, CachedFile>,
    expires_at: Instant,
}

/// Store over one repository, branch, and directory.
pub struct GithubStore {
    owner: String,
    name: String,
    branch: String,
    /// `""` for the repository root, otherwise `"dir/"`.
    dir_prefix: String,
    ttl: Duration,
    opts: GithubOptions,
    snapshot: Mutex<Option<Snapshot>>,
}

/// Split and check `owner/name`.
fn parse_repo(repo: &str) -> Result<(String, String), StoreError> {
    let invalid = || StoreError::InvalidRepo(repo.to_string());
    let (owner, name) = repo.split_once('/').ok_or_else(invalid)?;
    let ok = |s: &str| !s.is_empty() && !s.contains('/') && !s.chars().any(char::is_whitespace);
    if !ok(owner) || !ok(name) {
        return Err(invalid());
    }
    Ok((owner.to_string(), name.to_string()))
}

/// `"/"` → `""`, `"/content/assets/"` → `"content/assets/"`.
fn dir_prefix(dir: &str) -> String {
    let trimmed = dir.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Append `/`-separated path pieces to a base URL, percent-encoding each segment.
fn build_url<'a, I>(base: &str, pieces: I) -> Result<Url, StoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let invalid = |reason: String| StoreError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };
    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?;
        segments.pop_if_empty();
        for piece in pieces {
            segments.extend(piece.split('/').filter(|s| !s.is_empty()));
        }
    }
    Ok(url)
}

impl GithubStore {
    /// Validate the descriptor and prepare a store. No request is made until first use.
    pub fn mount(source: &SourceDescriptor, opts: GithubOptions) -> Result<Self, StoreError> {
        let (owner, name) = parse_repo(source.repo())?;
        // Fail on unusable base URLs now rather than on first fetch.
        build_url(&opts.api_url, [] as [&str; 0])?;
        build_url(&opts.raw_url, [] as [&str; 0])?;
        Ok(GithubStore {
            owner,
            name,
            branch: source.branch().to_string(),
            dir_prefix: dir_prefix(source.dir()),
            ttl: source.ttl(),
            opts,
            snapshot: Mutex::new(None),
        })
    }

    fn tree_url(&self) -> Result<Url, StoreError> {
        let mut url = build_url(
            &self.opts.api_url,
            [
                "repos",
                self.owner.as_str(),
                self.name.as_str(),
                "git",
                "trees",
                self.branch.as_str(),
            ],
        )?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    fn raw_url(&self, file: &TreeFile) -> Result<Url, StoreError> {
        build_url(
            &self.opts.raw_url,
            [
                self.owner.as_str(),
                self.name.as_str(),
                self.branch.as_str(),
                file.path.as_str(),
            ],
        )
    }

    fn request<'a>(&'a self, headers: &'a [(&'a str, &'a str)]) -> http::RequestSettings<'a> {
        http::RequestSettings {
            user_agent: &self.opts.user_agent,
            connect_timeout: self.opts.connect_timeout,
            timeout: self.opts.request_timeout,
            headers,
        }
    }

    /// GET with retries; `Ok(None)` on 404.
    fn fetch(
        &self,
        url: &Url,
        headers: &[(&str, &str)],
    ) -> Result<Option<HttpResponse>, StoreError> {
        let settings = self.request(headers);
        run_with_retry(&self.opts.retry, || {
            let resp = http::get(url.as_str(), &settings)?;
            match resp.status {
                200..=299 => Ok(Some(resp)),
                404 => Ok(None),
                status => Err(StoreError::Http {
                    url: url.to_string(),
                    status,
                }),
            }
        })
    }

    fn load_listing(&self) -> Result<Listing, StoreError> {
        let url = self.tree_url()?;
        let headers = [("Accept", "application/vnd.github+json")];
        let resp = self.fetch(&url, &headers)?.ok_or_else(|| StoreError::NotFound {
            url: url.to_string(),
        })?;
        let listing = parse_listing(&resp.body, &self.dir_prefix).map_err(|source| {
            StoreError::Decode {
                url: url.to_string(),
                source,
            }
        })?;
        if listing.truncated {
            tracing::warn!(
                repo = %format!("{}/{}", self.owner, self.name),
                branch = %self.branch,
                "tree listing truncated by GitHub; some files will be missing"
            );
        }
        tracing::debug!(files = listing.files.len(), url = %url, "loaded tree listing");
        Ok(listing)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` on a fresh snapshot, reloading the listing if missing or expired.
    ///
    /// The lock is held across the reload so concurrent callers wait for one
    /// listing request instead of each issuing their own.
    fn with_snapshot<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> Result<R, StoreError> {
        let mut guard = self.lock();
        let mut snapshot = match guard.take() {
            Some(s) if s.expires_at > Instant::now() => s,
            _ => {
                let listing = self.load_listing()?;
                let files = listing
                    .files
                    .into_iter()
                    .map(|(k, file)| (k, CachedFile { file, body: None }))
                    .collect();
                Snapshot {
                    files,
                    expires_at: Instant::now() + self.ttl,
                }
            }
        };
        let out = f(&mut snapshot);
        *guard = Some(snapshot);
        Ok(out)
    }
}

impl AssetStore for GithubStore {
    fn driver_name(&self) -> &'static str {
        "github"
    }

    fn list_keys(&self) -> Result<Vec<StoreKey>, StoreError> {
        self.with_snapshot(|s| s.files.keys().cloned().collect())
    }

    fn get_item(&self, key: &StoreKey) -> Result<Option<ItemValue>, StoreError> {
        let lookup = self.with_snapshot(|s| {
            s.files
                .get(key)
                .map(|cached| (cached.file.clone(), cached.body.clone()))
        })?;
        let Some((file, cached_body)) = lookup else {
            return Ok(None);
        };
        if let Some(body) = cached_body {
            return Ok(Some(body));
        }

        let url = self.raw_url(&file)?;
        let Some(resp) = self.fetch(&url, &[])? else {
            tracing::debug!(key = %key, url = %url, "raw content not found");
            return Ok(None);
        };
        if file.size.is_some_and(|size| size != resp.body.len() as u64) {
            tracing::debug!(
                key = %key,
                listed = ?file.size,
                received = resp.body.len(),
                "raw content size differs from listing"
            );
        }
        let value = decode_body(resp.content_type.as_deref(), resp.body);

        // Cache only if the listing we fetched against is still current.
        if let Some(snapshot) = self.lock().as_mut() {
            if let Some(cached) = snapshot.files.get_mut(key) {
                if cached.file.sha == file.sha {
                    cached.body = value.clone();
                }
            }
        }
        Ok(value)
    }
}
