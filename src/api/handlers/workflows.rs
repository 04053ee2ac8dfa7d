//! Workflow endpoints.
//!
//! Workflow management is not part of the landing API. The collection routes
//! answer with a static message and single-workflow lookups always miss.

use axum::{extract::Path, Json};
use tracing::info;

use crate::api::extractors::OptionalUser;
use crate::api::middleware::error::ApiError;
use crate::api::models::PlaceholderResponse;

const NOT_IMPLEMENTED: &str = "Workflows API is not implemented for the Landing API.";

#[utoipa::path(
    get,
    path = "/workflows",
    responses(
        (status = 200, description = "Placeholder message", body = PlaceholderResponse)
    ),
    tag = "Workflows"
)]
/// Placeholder workflow listing.
pub async fn list_workflows(OptionalUser(user): OptionalUser) -> Json<PlaceholderResponse> {
    info!(user = %user, "Workflow listing requested");
    placeholder()
}

#[utoipa::path(
    post,
    path = "/workflows",
    responses(
        (status = 200, description = "Placeholder message", body = PlaceholderResponse)
    ),
    tag = "Workflows"
)]
/// Placeholder workflow creation. The request body is ignored.
pub async fn create_workflow(OptionalUser(user): OptionalUser) -> Json<PlaceholderResponse> {
    info!(user = %user, "Workflow creation requested");
    placeholder()
}

#[utoipa::path(
    get,
    path = "/workflows/{workflow_id}",
    params(("workflow_id" = String, Path, description = "Workflow identifier")),
    responses(
        (status = 404, description = "Workflow not found", body = crate::api::models::ErrorResponse)
    ),
    tag = "Workflows"
)]
/// Workflow lookup. Nothing is stored, so every lookup is a miss.
pub async fn get_workflow(
    OptionalUser(user): OptionalUser,
    Path(workflow_id): Path<String>,
) -> Result<Json<PlaceholderResponse>, ApiError> {
    info!(user = %user, workflow_id = %workflow_id, "Workflow lookup requested");
    Err(ApiError::WorkflowNotFound(workflow_id))
}

fn placeholder() -> Json<PlaceholderResponse> {
    Json(PlaceholderResponse {
        message: NOT_IMPLEMENTED.to_string(),
    })
}
