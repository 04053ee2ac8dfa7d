//! OpenAPI documentation for the REST API.

use utoipa::OpenApi;

use crate::api::handlers;

/// OpenAPI documentation for the REST API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root::service_info,
        handlers::health::health_check,
        handlers::health::detailed_health_check,
        handlers::workflows::list_workflows,
        handlers::workflows::create_workflow,
        handlers::workflows::get_workflow,
        handlers::runs::list_runs,
        handlers::runs::create_run,
        handlers::runs::get_run,
        handlers::contact::create_contact,
    ),
    components(schemas(
        crate::api::models::ServiceInfo,
        crate::api::models::HealthResponse,
        crate::api::models::HealthStatus,
        crate::api::models::PlaceholderResponse,
        crate::api::models::ContactRequest,
        crate::api::models::ContactResponse,
        crate::api::models::ErrorResponse,
        crate::api::models::ErrorBody,
    )),
    tags(
        (name = "Service", description = "Service descriptor"),
        (name = "Health", description = "Health check endpoints"),
        (name = "Workflows", description = "Workflow placeholders"),
        (name = "Runs", description = "Run placeholders"),
        (name = "Contact", description = "Contact form submission"),
    ),
    info(
        title = "Landing API",
        version = "0.1.0",
        description = "Backend API for the landing site",
    )
)]
pub struct ApiDoc;
