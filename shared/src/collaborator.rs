//! Outbound HTTP to collaborator services
//!
//! Every collaborator call goes through a client built here so that it carries
//! a bounded timeout. Transport failures become `CollaboratorUnavailable`.

use std::time::Duration;

use crate::error::AppError;

/// Default per-call budget in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Build a `reqwest` client with a total request timeout
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

/// Map a transport-level failure to `CollaboratorUnavailable`
pub fn unavailable(collaborator: &str, err: &reqwest::Error) -> AppError {
    let reason = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_decode() {
        "returned an unreadable response"
    } else {
        "request failed"
    };
    tracing::warn!(collaborator, error = %err, "Collaborator call failed");
    AppError::collaborator_unavailable(collaborator, format!("{collaborator} service {reason}"))
}

/// Join a base URL and a path without doubling the slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Append path segments to a base URL, percent-encoding each one
///
/// A segment never introduces a new path level, so ids like `a/../b` stay one segment.
pub fn segment_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, AppError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| AppError::internal(format!("Invalid collaborator URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| AppError::internal(format!("Collaborator URL {base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
