//! CORS policy shared by the declarative layer and the adapter safety net.

use axum::http::{HeaderValue, Method};
use std::collections::BTreeSet;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::Settings;

/// `Access-Control-Allow-Headers` value set by the safety net.
pub const ALLOW_HEADERS: &str = "Content-Type,Authorization";

/// `Access-Control-Allow-Methods` value set by the safety net.
pub const ALLOW_METHODS: &str = "OPTIONS,GET,POST,PUT,DELETE";

/// Which origins may make credentialed cross-origin requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// No allow-list configured: echo any origin that sends an `Origin` header.
    Open,
    /// Only these origins are echoed.
    AllowList(BTreeSet<String>),
}

impl CorsPolicy {
    /// Build a policy from a list of origins.
    ///
    /// An empty list, or one containing `*`, yields [`CorsPolicy::Open`].
    pub fn from_origins<I, T>(origins: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let origins: BTreeSet<String> = origins
            .into_iter()
            .map(Into::into)
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() || origins.contains("*") {
            Self::Open
        } else {
            Self::AllowList(origins)
        }
    }

    /// Resolve the policy from settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        settings
            .cors_origins()
            .map_or(Self::Open, |origins| Self::from_origins(origins.iter().cloned()))
    }

    /// Whether `origin` may receive CORS headers.
    #[must_use]
    pub fn permits(&self, origin: &str) -> bool {
        match self {
            Self::Open => true,
            Self::AllowList(origins) => origins.contains(origin),
        }
    }

    /// Declarative CORS layer for the handler chain.
    ///
    /// The layer echoes the request origin instead of `*` so that
    /// credentials are honoured.
    #[must_use]
    pub fn layer(&self) -> CorsLayer {
        let allow_origin = match self {
            Self::Open => AllowOrigin::mirror_request(),
            Self::AllowList(origins) => AllowOrigin::list(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
            ),
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(AllowHeaders::mirror_request())
    }
}
