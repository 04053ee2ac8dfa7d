//! Unified API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;
use tracing::error;

use crate::api::models::ErrorResponse;
use crate::error::LandingError;

/// API-specific error type.
///
/// Every variant renders as `{"error": {"code", "message", "details"?}}`.
#[derive(Debug)]
pub enum ApiError {
    /// Required request fields are missing or blank.
    MissingFields(Vec<&'static str>),
    /// Request body could not be parsed.
    InvalidBody(String),
    /// `Host` header is not in the allow-list.
    InvalidHost,
    /// Bearer token missing or rejected.
    Unauthorized(String),
    /// Referenced workflow does not exist.
    WorkflowNotFound(String),
    /// Referenced run does not exist.
    RunNotFound(String),
    /// No route matches the request.
    RouteNotFound,
    /// Per-client rate limit exceeded.
    RateLimitExceeded {
        /// Configured ceiling per window
        limit: u32,
        /// Window length in seconds
        window_secs: u64,
    },
    /// Outbound email transport failed.
    EmailSendFailed(String),
    /// Unclassified fault. The message is logged, never returned.
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::InvalidBody(_) | Self::InvalidHost => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::WorkflowNotFound(_) | Self::RunNotFound(_) | Self::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::EmailSendFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "MISSING_REQUIRED_FIELDS",
            Self::InvalidBody(_) => "INVALID_REQUEST_BODY",
            Self::InvalidHost => "INVALID_HOST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::WorkflowNotFound(_) => "WORKFLOW_NOT_FOUND",
            Self::RunNotFound(_) => "RUN_NOT_FOUND",
            Self::RouteNotFound => "NOT_FOUND",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::EmailSendFailed(_) => "EMAIL_SEND_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn into_error_response(self) -> ErrorResponse {
        let code = self.code();
        match self {
            Self::MissingFields(fields) => ErrorResponse::new(
                code,
                format!("Missing required field(s): {}", fields.join(", ")),
                Some(json!({ "fields": fields })),
            ),
            Self::InvalidBody(msg) => ErrorResponse::new(code, msg, None),
            Self::InvalidHost => ErrorResponse::new(code, "Invalid host header", None),
            Self::Unauthorized(msg) => ErrorResponse::new(code, msg, None),
            Self::WorkflowNotFound(id) => {
                ErrorResponse::new(code, format!("Workflow {id} not found"), None)
            }
            Self::RunNotFound(id) => ErrorResponse::new(code, format!("Run {id} not found"), None),
            Self::RouteNotFound => ErrorResponse::new(code, "Not Found", None),
            Self::RateLimitExceeded { limit, window_secs } => {
                let per = if window_secs == 60 {
                    "minute".to_string()
                } else {
                    format!("{window_secs}s")
                };
                ErrorResponse::new(
                    code,
                    format!("Rate limit of {limit} requests per {per} exceeded"),
                    None,
                )
            }
            Self::EmailSendFailed(msg) => {
                error!(error = %msg, "Email transport failure");
                ErrorResponse::new(
                    code,
                    "Failed to send contact email",
                    Some(json!({ "error": msg })),
                )
            }
            Self::Internal(msg) => {
                error!(error = %msg, "Internal error in API handler");
                ErrorResponse::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_error_response())).into_response()
    }
}

impl From<LandingError> for ApiError {
    fn from(err: LandingError) -> Self {
        match err {
            LandingError::EmailError { .. } => Self::EmailSendFailed(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

/// Response for panics caught by `CatchPanicLayer`.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limit_names_the_limit() {
        let response = ApiError::RateLimitExceeded {
            limit: 2,
            window_secs: 60,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(
            body["error"]["message"],
            "Rate limit of 2 requests per minute exceeded"
        );
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_names_a_custom_window() {
        let response = ApiError::RateLimitExceeded {
            limit: 1,
            window_secs: 10,
        }
        .into_response();

        let body = body_json(response).await;
        assert_eq!(
            body["error"]["message"],
            "Rate limit of 1 requests per 10s exceeded"
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_the_cause() {
        let response = ApiError::Internal("db password wrong".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_missing_fields_lists_them() {
        let response = ApiError::MissingFields(vec!["name"]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["details"]["fields"][0], "name");
    }

    #[test]
    fn test_email_landing_error_maps_to_dependency_failure() {
        let err: ApiError = LandingError::email("connection refused", None).into();
        assert_eq!(err.code(), "EMAIL_SEND_FAILED");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_panic_payload_is_not_echoed() {
        let response = handle_panic(Box::new("secret detail"));
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }
}
