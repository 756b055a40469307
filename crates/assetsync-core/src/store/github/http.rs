//! Blocking HTTP GET via the curl crate (libcurl).

use std::str;
use std::time::Duration;

use crate::store::StoreError;

/// A completed response of any status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    /// `Content-Type` of the final response, if sent.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Transfer settings shared by every request of a store.
#[derive(Debug, Clone)]
pub struct RequestSettings<'a> {
    pub user_agent: &'a str,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub headers: &'a [(&'a str, &'a str)],
}

/// Performs a GET and buffers the body. Follows redirects.
///
/// Only transport failures are errors; the caller interprets the status.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn get(url: &str, settings: &RequestSettings<'_>) -> Result<HttpResponse, StoreError> {
    let mut body: Vec<u8> = Vec::new();
    let mut content_type: Option<String> = None;

    let mut easy = curl::easy::Easy::new();
    let err = |e: curl::Error| StoreError::transport(url, e);
    easy.url(url).map_err(err)?;
    easy.follow_location(true).map_err(err)?;
    easy.max_redirections(10).map_err(err)?;
    easy.useragent(settings.user_agent).map_err(err)?;
    easy.accept_encoding("").map_err(err)?;
    easy.connect_timeout(settings.connect_timeout).map_err(err)?;
    easy.timeout(settings.timeout).map_err(err)?;

    let mut list = curl::easy::List::new();
    for (k, v) in settings.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim())).map_err(err)?;
    }
    if !settings.headers.is_empty() {
        easy.http_headers(list).map_err(err)?;
    }

    {
        let mut transfer = easy.transfer();
        // Redirect hops each send their own headers; the last Content-Type wins.
        transfer
            .header_function(|line| {
                if let Some(value) = str::from_utf8(line).ok().and_then(parse_content_type) {
                    content_type = Some(value);
                }
                true
            })
            .map_err(err)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(err)?;
        transfer.perform().map_err(err)?;
    }

    let status = easy.response_code().map_err(err)?;
    Ok(HttpResponse {
        status,
        content_type,
        body,
    })
}

/// Value of a `Content-Type` header line, if that is what `line` is.
fn parse_content_type(line: &str) -> Option<String> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-type") {
        return None;
    }
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
