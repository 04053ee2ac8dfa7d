//! Run endpoints.
//!
//! Run management is not part of the landing API. The collection routes
//! answer with a static message and single-run lookups always miss.

use axum::{extract::Path, Json};
use tracing::info;

use crate::api::extractors::OptionalUser;
use crate::api::middleware::error::ApiError;
use crate::api::models::PlaceholderResponse;

const NOT_IMPLEMENTED: &str = "Runs API is not implemented for the Landing API.";

#[utoipa::path(
    get,
    path = "/runs",
    responses(
        (status = 200, description = "Placeholder message", body = PlaceholderResponse)
    ),
    tag = "Runs"
)]
/// Placeholder run listing.
pub async fn list_runs(OptionalUser(user): OptionalUser) -> Json<PlaceholderResponse> {
    info!(user = %user, "Run listing requested");
    placeholder()
}

#[utoipa::path(
    post,
    path = "/runs",
    responses(
        (status = 200, description = "Placeholder message", body = PlaceholderResponse)
    ),
    tag = "Runs"
)]
/// Placeholder run creation. The request body is ignored.
pub async fn create_run(OptionalUser(user): OptionalUser) -> Json<PlaceholderResponse> {
    info!(user = %user, "Run creation requested");
    placeholder()
}

#[utoipa::path(
    get,
    path = "/runs/{run_id}",
    params(("run_id" = String, Path, description = "Run identifier")),
    responses(
        (status = 404, description = "Run not found", body = crate::api::models::ErrorResponse)
    ),
    tag = "Runs"
)]
/// Run lookup. Runs are never stored here, so every lookup misses.
pub async fn get_run(
    OptionalUser(user): OptionalUser,
    Path(run_id): Path<String>,
) -> Result<Json<PlaceholderResponse>, ApiError> {
    info!(user = %user, run_id = %run_id, "Run lookup requested");
    Err(ApiError::RunNotFound(run_id))
}

fn placeholder() -> Json<PlaceholderResponse> {
    Json(PlaceholderResponse {
        message: NOT_IMPLEMENTED.to_string(),
    })
}
