//! Axum router setup and the always-on server.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{docs::ApiDoc, handlers, middleware as api_middleware};
use crate::app_state::AppState;
use crate::error::{LandingError, LandingResult};

/// Build the handler chain shared by the server and the invocation adapter.
///
/// Middleware runs outermost first: panic catcher, tracing, request logging,
/// trusted host check, rate limiting, CORS, then routing.
pub fn build_router(state: AppState) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(CatchPanicLayer::custom(api_middleware::error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(api_middleware::logging::log_requests))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_middleware::trusted_host::trusted_host,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_middleware::rate_limit::rate_limit,
        ))
        .layer(state.cors.layer());

    Router::new()
        .route("/", get(handlers::root::service_info))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/health/detailed",
            get(handlers::health::detailed_health_check),
        )
        .route(
            "/workflows",
            get(handlers::workflows::list_workflows).post(handlers::workflows::create_workflow),
        )
        .route(
            "/workflows/:workflow_id",
            get(handlers::workflows::get_workflow),
        )
        .route(
            "/runs",
            get(handlers::runs::list_runs).post(handlers::runs::create_run),
        )
        .route("/runs/:run_id", get(handlers::runs::get_run))
        .route("/contact", post(handlers::contact::create_contact))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::not_found)
        .layer(middleware_stack)
        .with_state(state)
}

/// Run the always-on server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server(state: AppState, addr: SocketAddr) -> LandingResult<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LandingError::io(format!("failed to bind {addr}"), e))?;

    info!(addr = %addr, "Landing API starting up");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| LandingError::io("server error", e))?;

    info!("Landing API shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
