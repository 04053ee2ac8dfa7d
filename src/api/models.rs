//! API request and response models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Service descriptor returned by `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Service version
    pub version: String,
    /// Short description
    pub description: String,
    /// Interactive docs location (debug mode only)
    pub docs_url: Option<String>,
    /// Mount prefix when deployed behind a gateway stage
    pub root_path: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    /// Application version
    pub version: String,
    /// Individual check results
    pub checks: BTreeMap<String, String>,
}

/// Health status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All checks passed
    Healthy,
    /// At least one check failed
    Unhealthy,
}

/// Response of the workflow and run placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceholderResponse {
    /// Static explanation
    pub message: String,
}

/// Contact form submission.
///
/// Both fields are optional at the parsing stage so that missing and blank
/// values produce the same validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ContactRequest {
    /// Visitor name
    #[serde(default)]
    pub name: Option<String>,
    /// Visitor phone number
    #[serde(default)]
    pub phone: Option<String>,
}

/// Contact submission accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    /// Always `ok`
    pub status: String,
}

/// Error response wrapper: `{"error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorBody,
}

/// Error payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g. `RATE_LIMIT_EXCEEDED`)
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Build an error response.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details,
            },
        }
    }

    /// The generic response for unclassified faults.
    #[must_use]
    pub fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "An internal error occurred", None)
    }
}
