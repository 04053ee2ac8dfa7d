//! Cloud-function invocation adapter.
//!
//! Translates a gateway [`InvocationEnvelope`] into an `http::Request`,
//! drives it through the same handler chain the always-on server uses, and
//! translates the result back into a [`ResponseEnvelope`].
//!
//! Faults in the adapter's own translation (unknown method, bad base64)
//! become a generic 500 envelope. Faults raised by the handler chain itself
//! are returned as [`LandingError::InvocationError`] so the host runtime can
//! record the failed invocation.
//!
//! ```rust,no_run
//! use landing_api::adapter::{Adapter, InvocationContext, InvocationEnvelope};
//! # use landing_api::app_state::AppState;
//! # async fn example(state: AppState) -> landing_api::error::LandingResult<()> {
//! let adapter = Adapter::for_app(state);
//! let response = adapter
//!     .handle(InvocationEnvelope::new("GET", "/health"), &InvocationContext::new("req-1"))
//!     .await?;
//! assert_eq!(response.status_code, 200);
//! # Ok(())
//! # }
//! ```

pub mod cors;
pub mod envelope;

pub use envelope::{InvocationContext, InvocationEnvelope, InvocationRequest, ResponseEnvelope};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::{BoxError, Router};
use std::sync::Arc;
use tower::{Service, ServiceExt};
use tracing::{error, info, warn};

use crate::api::extractors::UNKNOWN_CLIENT;
use crate::api::middleware::cors::CorsPolicy;
use crate::api::server::build_router;
use crate::app_state::AppState;
use crate::error::{LandingError, LandingResult};

/// Placeholder for request fields that could not be extracted.
const UNKNOWN_FIELD: &str = "UNKNOWN";

/// User agents longer than this are truncated in the invocation log.
const USER_AGENT_LOG_LEN: usize = 50;

/// Drives envelopes through a handler chain.
#[derive(Clone)]
pub struct Adapter<S> {
    chain: S,
    cors: Arc<CorsPolicy>,
    path_prefix: String,
}

impl Adapter<Router> {
    /// Adapter over the application router built from `state`.
    #[must_use]
    pub fn for_app(state: AppState) -> Self {
        let cors = Arc::clone(&state.cors);
        let path_prefix = state.settings.path_prefix().to_string();
        Self::new(build_router(state), cors, path_prefix)
    }
}

impl<S> Adapter<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
{
    /// Adapter over an arbitrary handler chain.
    pub fn new(chain: S, cors: Arc<CorsPolicy>, path_prefix: impl Into<String>) -> Self {
        Self {
            chain,
            cors,
            path_prefix: path_prefix.into(),
        }
    }

    /// Handle one invocation.
    ///
    /// `OPTIONS` requests are answered here without reaching the chain.
    /// Every other response, including the generic 500 for envelopes that
    /// cannot be translated, receives safety-net CORS headers.
    ///
    /// # Errors
    ///
    /// Returns [`LandingError::InvocationError`] when the handler chain
    /// itself fails.
    pub async fn handle(
        &self,
        envelope: InvocationEnvelope,
        context: &InvocationContext,
    ) -> LandingResult<ResponseEnvelope> {
        let request_id = context.request_id.as_str();

        let method = extract_or("method", UNKNOWN_FIELD, request_id, || {
            envelope
                .method()
                .map(str::to_ascii_uppercase)
                .ok_or_else(|| "envelope carries no HTTP method".to_string())
        });
        let path = extract_or("path", UNKNOWN_FIELD, request_id, || {
            envelope
                .request_path()
                .map(str::to_string)
                .ok_or_else(|| "envelope carries no path".to_string())
        });
        let client_ip = extract_or("client_ip", UNKNOWN_CLIENT, request_id, || {
            Ok(envelope
                .forwarded_for()
                .or_else(|| envelope.source_ip())
                .unwrap_or(UNKNOWN_CLIENT)
                .to_string())
        });
        let user_agent = extract_or("user_agent", UNKNOWN_CLIENT, request_id, || {
            Ok(truncate_user_agent(
                envelope.header("user-agent").unwrap_or(UNKNOWN_CLIENT),
            ))
        });
        let origin = envelope.header("origin").map(str::to_string);

        let response = if method == "OPTIONS" {
            cors::preflight_response(origin.as_deref(), &self.cors)
        } else {
            let mut response = match envelope
                .normalize(&self.path_prefix)
                .and_then(InvocationRequest::into_http_request)
            {
                Ok(request) => self.dispatch(request, request_id).await?,
                Err(e) => {
                    error!(request_id, error = %e, "Failed to translate invocation envelope");
                    ResponseEnvelope::internal_error()
                }
            };
            cors::inject_cors_headers(&mut response, origin.as_deref(), &self.cors);
            response
        };

        info!(
            request_id,
            method = %method,
            path = %path,
            client_ip = %client_ip,
            user_agent = %user_agent,
            status = response.status_code,
            "Invocation completed"
        );

        Ok(response)
    }

    async fn dispatch(
        &self,
        request: Request<Body>,
        request_id: &str,
    ) -> LandingResult<ResponseEnvelope> {
        let response = self
            .chain
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| {
                let e: BoxError = e.into();
                error!(request_id, error = %e, "Handler chain failed");
                LandingError::invocation("handler chain failed", Some(e))
            })?;

        ResponseEnvelope::from_response(response).await.map_err(|e| {
            error!(request_id, error = %e, "Failed to collect handler response");
            e
        })
    }
}

/// Run `extract`, falling back to `default` and logging when it fails.
fn extract_or<F>(field: &str, default: &str, request_id: &str, extract: F) -> String
where
    F: FnOnce() -> Result<String, String>,
{
    extract().unwrap_or_else(|e| {
        warn!(request_id, field, error = %e, "Error extracting request info");
        default.to_string()
    })
}

fn truncate_user_agent(user_agent: &str) -> String {
    if user_agent.chars().count() > USER_AGENT_LOG_LEN {
        let truncated: String = user_agent.chars().take(USER_AGENT_LOG_LEN).collect();
        format!("{truncated}...")
    } else {
        user_agent.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_defaults_on_failure() {
        let value = extract_or("method", UNKNOWN_FIELD, "req", || Err("boom".to_string()));
        assert_eq!(value, "UNKNOWN");

        let value = extract_or("method", UNKNOWN_FIELD, "req", || Ok("GET".to_string()));
        assert_eq!(value, "GET");
    }

    #[test]
    fn test_long_user_agent_is_truncated() {
        let long = "a".repeat(80);
        let truncated = truncate_user_agent(&long);
        assert_eq!(truncated.len(), 53);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_user_agent("curl/8"), "curl/8");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = "é".repeat(60);
        let truncated = truncate_user_agent(&long);
        assert_eq!(truncated.chars().count(), 53);
    }
}
