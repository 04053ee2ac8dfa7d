//! Service descriptor endpoint.

use axum::{extract::State, Json};

use crate::api::models::ServiceInfo;
use crate::app_state::AppState;

/// Service display name.
pub const SERVICE_NAME: &str = "Landing API";

/// Service description.
pub const SERVICE_DESCRIPTION: &str = "Backend API for the Credomax landing site";

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service descriptor", body = ServiceInfo)
    ),
    tag = "Service"
)]
/// Returns the service descriptor.
///
/// `docs_url` is only advertised in debug mode and includes the mount
/// prefix when the API is deployed behind a gateway stage.
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let prefix = state.settings.path_prefix();

    let docs_url = state.settings.debug().then(|| format!("{prefix}/docs"));
    let root_path = (!prefix.is_empty()).then(|| prefix.to_string());

    Json(ServiceInfo {
        name: SERVICE_NAME.to_string(),
        version: state.settings.version().to_string(),
        description: SERVICE_DESCRIPTION.to_string(),
        docs_url,
        root_path,
    })
}
