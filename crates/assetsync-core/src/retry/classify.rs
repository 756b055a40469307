//! Map store failures onto retry error kinds.

use super::policy::ErrorKind;
use crate::store::StoreError;

/// Classify an HTTP status code.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl transport error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        ErrorKind::Timeout
    } else if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        ErrorKind::Connection
    } else {
        ErrorKind::Other
    }
}

/// Classify a store error. Only transport and HTTP status failures can be transient.
pub fn classify(e: &StoreError) -> ErrorKind {
    match e {
        StoreError::Transport { source, .. } => classify_curl_error(source),
        StoreError::Http { status, .. } => classify_http_status(*status),
        _ => ErrorKind::Other,
    }
}
