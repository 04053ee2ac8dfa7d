//! Trusted host middleware.
//!
//! Outside debug mode, requests whose `Host` header is not in
//! `LANDING_API_ALLOWED_HOSTS` are rejected with `INVALID_HOST`. An entry of
//! `*` accepts every host; `*.example.com` accepts any subdomain.

use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::api::middleware::error::ApiError;
use crate::app_state::AppState;

/// Whether `host` (port included or not) matches the allow-list.
#[must_use]
pub fn host_allowed(allowed_hosts: &[String], host: Option<&str>) -> bool {
    if allowed_hosts.iter().any(|pattern| pattern == "*") {
        return true;
    }

    let host = host
        .and_then(|h| h.split(':').next())
        .unwrap_or_default()
        .to_ascii_lowercase();

    allowed_hosts.iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        pattern
            .strip_prefix('*')
            .map_or(host == pattern, |suffix| host.ends_with(suffix))
    })
}

/// Reject requests for hosts outside the allow-list.
pub async fn trusted_host(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.settings.debug() {
        return Ok(next.run(request).await);
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok());

    if !host_allowed(state.settings.allowed_hosts(), host) {
        warn!(host = host.unwrap_or_default(), "Rejected request for untrusted host");
        return Err(ApiError::InvalidHost);
    }

    Ok(next.run(request).await)
}
