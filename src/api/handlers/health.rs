//! Health check endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::instrument;

use crate::api::models::{HealthResponse, HealthStatus};
use crate::app_state::AppState;

/// Outcome of a health check run.
#[derive(Debug, Clone)]
pub struct HealthResult {
    /// Whether every check passed
    pub healthy: bool,
    /// Individual check results
    pub checks: BTreeMap<String, String>,
}

/// Reports API availability. There are no downstream dependencies to probe.
#[derive(Debug, Clone)]
pub struct HealthService {
    started_at: DateTime<Utc>,
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthService {
    /// Create a service that reports uptime from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }

    /// Basic health check: API availability only.
    #[must_use]
    pub fn check_basic_health(&self) -> HealthResult {
        HealthResult {
            healthy: true,
            checks: BTreeMap::from([("api".to_string(), "OK".to_string())]),
        }
    }

    /// Detailed health check: basic checks plus process uptime.
    #[must_use]
    pub fn check_detailed_health(&self) -> HealthResult {
        let mut result = self.check_basic_health();
        let uptime = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
            .max(0);

        result
            .checks
            .insert("started_at".to_string(), self.started_at.to_rfc3339());
        result
            .checks
            .insert("uptime_seconds".to_string(), uptime.to_string());
        result
    }
}

fn to_response(state: &AppState, result: HealthResult) -> HealthResponse {
    HealthResponse {
        status: if result.healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        },
        version: state.settings.version().to_string(),
        checks: result.checks,
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
/// Basic health check.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let result = state.health.check_basic_health();
    Json(to_response(&state, result))
}

#[utoipa::path(
    get,
    path = "/health/detailed",
    responses(
        (status = 200, description = "Detailed service health", body = HealthResponse)
    ),
    tag = "Health"
)]
/// Detailed health check.
#[instrument(skip(state))]
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let result = state.health.check_detailed_health();
    Json(to_response(&state, result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_health_reports_api_ok() {
        let result = HealthService::new().check_basic_health();
        assert!(result.healthy);
        assert_eq!(result.checks.get("api").map(String::as_str), Some("OK"));
    }

    #[test]
    fn test_detailed_health_adds_uptime() {
        let result = HealthService::new().check_detailed_health();
        assert!(result.checks.contains_key("api"));
        assert!(result.checks.contains_key("uptime_seconds"));
    }
}
