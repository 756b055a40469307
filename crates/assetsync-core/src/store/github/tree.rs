//! Git tree listing (`GET /repos/{owner}/{repo}/git/trees/{ref}?recursive=1`).

use serde::Deserialize;
use std::collections::HashMap;

use crate::key::StoreKey;

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    sha: String,
    #[serde(default)]
    size: Option<u64>,
}

/// One file of the listing, remembered between listing and fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    pub sha: String,
    pub size: Option<u64>,
}

/// Files under a directory prefix, keyed by their path relative to it.
#[derive(Debug, Default)]
pub struct Listing {
    pub files: HashMap<StoreKey, TreeFile>,
    pub truncated: bool,
}

/// Parse a tree response, keeping blobs under `dir_prefix` (`""` or `"some/dir/"`).
pub fn parse_listing(body: &[u8], dir_prefix: &str) -> Result<Listing, serde_json::Error> {
    let response: TreeResponse = serde_json::from_slice(body)?;
    let files = response
        .tree
        .into_iter()
        .filter(|e| e.kind == "blob")
        .filter_map(|e| {
            let relative = e.path.strip_prefix(dir_prefix)?;
            let key = StoreKey::from_path(relative);
            if key.as_str().is_empty() {
                return None;
            }
            Some((
                key,
                TreeFile {
                    path: e.path,
                    sha: e.sha,
                    size: e.size,
                },
            ))
        })
        .collect();
    Ok(Listing {
        files,
        truncated: response.truncated,
    })
}
