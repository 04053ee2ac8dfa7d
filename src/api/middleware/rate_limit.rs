//! Rate limiting middleware.
//!
//! A per-client sliding-window limiter kept in process memory. Each client
//! identifier owns the timestamps of its admitted requests inside the
//! trailing window; older entries are pruned lazily on every check.
//!
//! Windows are never evicted, so memory grows with the number of distinct
//! clients seen over the life of the process. State is lost on restart.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::api::extractors::resolve_client_ip;
use crate::api::middleware::error::ApiError;
use crate::app_state::AppState;
use crate::config::Settings;

/// Per-client sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    rate_limit: NonZeroU32,
    window: Duration,
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter admitting `rate_limit` requests per client per `window`.
    #[must_use]
    pub fn new(rate_limit: NonZeroU32, window: Duration) -> Self {
        Self {
            rate_limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Create a limiter from the resolved settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.rate_limit(), settings.rate_limit_window())
    }

    /// Configured ceiling per window.
    #[must_use]
    pub const fn rate_limit(&self) -> NonZeroU32 {
        self.rate_limit
    }

    /// Configured window size.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Admit or reject a request from `client_id` at the current instant.
    pub fn admit(&self, client_id: &str) -> bool {
        self.admit_at(client_id, Instant::now())
    }

    /// Admit or reject a request from `client_id` at `now`.
    ///
    /// The client's window is pruned to entries with `now - t < window`
    /// whether or not the request is admitted; `now` is recorded only on
    /// admission.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let timestamps = windows.entry(client_id.to_string()).or_default();

        timestamps.retain(|t| now.saturating_duration_since(*t) < self.window);

        if timestamps.len() >= self.rate_limit.get() as usize {
            return false;
        }

        timestamps.push(now);
        true
    }

    /// Number of timestamps currently stored for `client_id`.
    #[must_use]
    pub fn recorded(&self, client_id: &str) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(client_id)
            .map_or(0, Vec::len)
    }

    /// Number of client identifiers with a window.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Whether `path` starts with one of the bypass prefixes.
#[must_use]
pub fn is_bypassed(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// Rate limiting middleware.
///
/// Bypassed paths are forwarded before the limiter is consulted, so they are
/// never recorded against any client.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_bypassed(request.uri().path(), state.settings.rate_limit_bypass()) {
        return Ok(next.run(request).await);
    }

    let client_ip = resolve_client_ip(request.extensions());
    if !state.limiter.admit(&client_ip) {
        warn!(
            client_ip = %client_ip,
            path = %request.uri().path(),
            "Rate limit exceeded"
        );
        return Err(ApiError::RateLimitExceeded {
            limit: state.limiter.rate_limit().get(),
            window_secs: state.limiter.window().as_secs(),
        });
    }

    Ok(next.run(request).await)
}
