//! Shared application state for the handler chain.
//!
//! Built once by a composition root and handed to the router, so every
//! invocation in the process shares the same settings, rate-limit windows
//! and CORS policy. Tests construct a fresh state per case.

use std::sync::Arc;

use crate::api::handlers::health::HealthService;
use crate::api::middleware::cors::CorsPolicy;
use crate::api::middleware::rate_limit::RateLimiter;
use crate::config::Settings;
use crate::email::EmailSender;

/// Shared application state for API handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resolved settings.
    pub settings: Arc<Settings>,
    /// Per-client rate-limit windows.
    pub limiter: Arc<RateLimiter>,
    /// CORS policy, shared with the invocation adapter.
    pub cors: Arc<CorsPolicy>,
    /// Outbound email transport.
    pub mailer: Arc<dyn EmailSender>,
    /// Health checks.
    pub health: HealthService,
}

impl AppState {
    /// Create a new `AppState` from resolved settings and a mailer.
    pub fn new(settings: Settings, mailer: Arc<dyn EmailSender>) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::from_settings(&settings)),
            cors: Arc::new(CorsPolicy::from_settings(&settings)),
            settings: Arc::new(settings),
            mailer,
            health: HealthService::new(),
        }
    }
}
