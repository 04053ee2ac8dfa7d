//! Request logging middleware using tracing.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn, Span};

use crate::api::extractors::resolve_client_ip;

/// Response header carrying the handler-chain duration in seconds.
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Logs request start and completion and stamps `X-Process-Time`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    Span::current().record("method", method.as_str());
    Span::current().record("uri", path.as_str());

    info!(
        method = %method,
        path = %path,
        query = request.uri().query().unwrap_or_default(),
        client_ip = %resolve_client_ip(request.extensions()),
        "Request started"
    );

    let mut response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %path,
        status_code = status.as_u16(),
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Request completed"
    );

    match HeaderValue::from_str(&duration.as_secs_f64().to_string()) {
        Ok(value) => {
            response.headers_mut().insert(PROCESS_TIME_HEADER, value);
        }
        Err(e) => warn!(error = %e, "Could not encode process time header"),
    }

    response
}
