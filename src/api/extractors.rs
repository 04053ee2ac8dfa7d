//! Custom extractors and request extensions.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::Extensions;
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::info;

use crate::api::middleware::error::ApiError;

/// Client identifier used when no address is known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client address supplied by the invocation adapter.
///
/// The always-on server relies on `ConnectInfo` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// Resolve the client identifier for a request: adapter-supplied address,
/// then the socket peer address, then `"unknown"`.
#[must_use]
pub fn resolve_client_ip(extensions: &Extensions) -> String {
    if let Some(ClientIp(ip)) = extensions.get::<ClientIp>() {
        return ip.clone();
    }
    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    UNKNOWN_CLIENT.to_string()
}

/// Minimum accepted API key length.
const MIN_API_KEY_LEN: usize = 10;

/// Caller authenticated with a bearer API key.
///
/// Keys are not checked against any store: any key of at least ten
/// characters is accepted and mapped to `user_<first 8 chars>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl AuthenticatedUser {
    /// Validate a raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the header is missing, not a
    /// bearer token, or the key is too short.
    pub fn from_authorization(header: Option<&str>) -> Result<Self, ApiError> {
        let api_key = header
            .and_then(|value| {
                let (scheme, token) = value.trim().split_once(' ')?;
                scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
            })
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing API key".to_string()))?;

        if api_key.chars().count() < MIN_API_KEY_LEN {
            return Err(ApiError::Unauthorized("Invalid API key".to_string()));
        }

        let user_id = format!("user_{}", api_key.chars().take(8).collect::<String>());
        info!(user_id = %user_id, "User authenticated");
        Ok(Self(user_id))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        Self::from_authorization(header)
    }
}

/// Caller identity when authentication is optional; `anonymous` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalUser(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthenticatedUser::from_request_parts(parts, state)
            .await
            .map_or_else(|_| Self("anonymous".to_string()), |user| Self(user.0)))
    }
}
