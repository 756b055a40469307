//! Error type shared by store backends.

/// Failure to mount, list, or fetch from a store. Missing items are not
/// errors; `get_item` reports them as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Repository identifier is not of the form `owner/name`.
    #[error("invalid repository identifier {0:?} (expected owner/name)")]
    InvalidRepo(String),

    /// Base URL from config could not be used to build request URLs.
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Repository, branch, or directory listing does not exist.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Non-2xx response other than 404.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    /// Curl reported a transport failure (timeout, DNS, reset).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// Response body could not be decoded.
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn transport(url: &str, source: curl::Error) -> Self {
        StoreError::Transport {
            url: url.to_string(),
            source,
        }
    }
}
