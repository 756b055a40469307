//! Retry and backoff for store requests.
//!
//! Store backends classify their failures (timeouts, throttling, connection
//! resets, 5xx) and share one exponential backoff policy.

mod classify;
mod policy;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};

use crate::store::StoreError;

/// Runs a blocking request closure until it succeeds or the policy says stop.
/// Sleeps the current thread between attempts; call from `spawn_blocking`.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, StoreError>
where
    F: FnMut() -> Result<T, StoreError>,
{
    let mut attempt = 1u32;
    loop {
        let err = match f() {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        match policy.decide(attempt, classify(&err)) {
            RetryDecision::NoRetry => return Err(err),
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!(attempt, ?delay, error = %err, "retrying store request");
                std::thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}
