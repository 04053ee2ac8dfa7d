//! HTTP handlers for API endpoints.

pub mod contact;
pub mod health;
pub mod root;
pub mod runs;
pub mod workflows;

use crate::api::middleware::error::ApiError;

/// Fallback for requests that match no route.
pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
