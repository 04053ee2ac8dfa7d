//! Invocation envelope shapes and their normalization.
//!
//! Gateways send either the REST (`httpMethod`, `path`) or the HTTP API
//! (`requestContext.http.method`, `rawPath`) flavour. Both deserialize into
//! [`InvocationEnvelope`]; every fallback between the two is resolved in
//! [`InvocationEnvelope::normalize`] and the accessors next to it.

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request};
use axum::response::Response;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::api::extractors::{ClientIp, UNKNOWN_CLIENT};
use crate::api::models::ErrorResponse;
use crate::error::{LandingError, LandingResult};

/// Inbound gateway envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEnvelope {
    /// REST flavour method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    /// Gateway request context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_context: Option<RequestContext>,
    /// HTTP API flavour path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_path: Option<String>,
    /// REST flavour path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// HTTP API flavour query string, without the leading `?`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query_string: Option<String>,
    /// REST flavour query parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    /// Request body, base64 when `is_base64_encoded`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Whether `body` is base64
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// `requestContext` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// HTTP API flavour request details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpContext>,
    /// REST flavour caller identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    /// Gateway request id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// `requestContext.http` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpContext {
    /// Request method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Caller address as seen by the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
}

/// `requestContext.identity` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Caller address as seen by the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
}

impl InvocationEnvelope {
    /// Envelope for `method path` with nothing else set.
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            http_method: Some(method.to_string()),
            raw_path: Some(path.to_string()),
            ..Self::default()
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Set a plain-text body.
    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self.is_base64_encoded = false;
        self
    }

    /// Set a body the gateway delivered base64-encoded.
    #[must_use]
    pub fn with_base64_body(mut self, encoded: &str) -> Self {
        self.body = Some(encoded.to_string());
        self.is_base64_encoded = true;
        self
    }

    /// Set the gateway-reported caller address.
    #[must_use]
    pub fn with_source_ip(mut self, ip: &str) -> Self {
        self.request_context
            .get_or_insert_with(RequestContext::default)
            .http
            .get_or_insert_with(HttpContext::default)
            .source_ip = Some(ip.to_string());
        self
    }

    /// Request method, REST flavour first.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.http_method.as_deref().or_else(|| {
            self.request_context
                .as_ref()?
                .http
                .as_ref()?
                .method
                .as_deref()
        })
    }

    /// Request path, `rawPath` first.
    #[must_use]
    pub fn request_path(&self) -> Option<&str> {
        self.raw_path.as_deref().or(self.path.as_deref())
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Gateway-reported caller address.
    #[must_use]
    pub fn source_ip(&self) -> Option<&str> {
        let context = self.request_context.as_ref()?;
        context
            .http
            .as_ref()
            .and_then(|http| http.source_ip.as_deref())
            .or_else(|| {
                context
                    .identity
                    .as_ref()
                    .and_then(|identity| identity.source_ip.as_deref())
            })
    }

    /// First address of `X-Forwarded-For`, the original client.
    #[must_use]
    pub fn forwarded_for(&self) -> Option<&str> {
        self.header("x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }

    /// Gateway request id.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_context.as_ref()?.request_id.as_deref()
    }

    fn query(&self) -> Option<String> {
        if let Some(raw) = self.raw_query_string.as_deref().filter(|q| !q.is_empty()) {
            return Some(raw.to_string());
        }
        self.query_string_parameters
            .as_ref()
            .filter(|params| !params.is_empty())
            .map(|params| {
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params)
                    .finish()
            })
    }

    /// Resolve every fallback into an [`InvocationRequest`].
    ///
    /// `path_prefix` (a gateway stage mount such as `/prod`) is stripped from
    /// the path. A missing path becomes `/`.
    ///
    /// # Errors
    ///
    /// Returns [`LandingError::EnvelopeError`] when the method is missing or
    /// invalid, a header cannot be represented, or the body is flagged as
    /// base64 but does not decode.
    pub fn normalize(self, path_prefix: &str) -> LandingResult<InvocationRequest> {
        let method = self
            .method()
            .ok_or_else(|| LandingError::envelope("envelope carries no HTTP method", None))
            .and_then(|method| {
                Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|e| {
                    LandingError::envelope(format!("invalid HTTP method {method:?}"), Some(Box::new(e)))
                })
            })?;

        let path = encode_path(&strip_prefix(self.request_path().unwrap_or("/"), path_prefix))?;
        let query = self.query();
        let source_ip = self.source_ip().map(str::to_string);

        let mut headers = HeaderMap::new();
        for (name, value) in self.headers.iter().flatten() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                LandingError::envelope(format!("invalid header name {name:?}"), Some(Box::new(e)))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                LandingError::envelope(format!("invalid value for header {name}"), Some(Box::new(e)))
            })?;
            headers.append(name, value);
        }

        let body = match self.body {
            None => Bytes::new(),
            Some(encoded) if self.is_base64_encoded => STANDARD
                .decode(encoded.trim())
                .map(Bytes::from)
                .map_err(|e| LandingError::envelope("body is not valid base64", Some(Box::new(e))))?,
            Some(text) => Bytes::from(text),
        };

        Ok(InvocationRequest {
            method,
            path,
            query,
            headers,
            body,
            source_ip,
        })
    }
}

/// Percent-encode characters that cannot appear in a URI path.
///
/// REST gateways deliver `path` already decoded, so spaces and non-ASCII
/// characters are re-encoded. Existing `%XX` escapes are kept as they are.
fn encode_path(path: &str) -> LandingResult<String> {
    let mut url = url::Url::parse("http://localhost/")
        .map_err(|e| LandingError::envelope("failed to build base URL", Some(Box::new(e))))?;
    url.set_path(path);
    Ok(url.path().to_string())
}

fn strip_prefix(path: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    match path.strip_prefix(prefix) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}

/// A normalized invocation, ready for the handler chain.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Request method
    pub method: Method,
    /// Path with the mount prefix removed
    pub path: String,
    /// Query string without `?`
    pub query: Option<String>,
    /// Request headers
    pub headers: HeaderMap,
    /// Decoded body bytes
    pub body: Bytes,
    /// Gateway-reported caller address
    pub source_ip: Option<String>,
}

impl InvocationRequest {
    /// Build the `http::Request` handed to the handler chain.
    ///
    /// The caller address travels as a [`ClientIp`] extension.
    ///
    /// # Errors
    ///
    /// Returns [`LandingError::EnvelopeError`] if path and query do not form
    /// a valid URI.
    pub fn into_http_request(self) -> LandingResult<Request<Body>> {
        let uri = match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        };

        let mut request = Request::builder()
            .method(self.method)
            .uri(uri.as_str())
            .body(Body::from(self.body))
            .map_err(|e| LandingError::envelope(format!("invalid request URI {uri:?}"), Some(Box::new(e))))?;

        *request.headers_mut() = self.headers;
        request.extensions_mut().insert(ClientIp(
            self.source_ip.unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
        ));
        Ok(request)
    }
}

/// Per-invocation context supplied by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Host request id
    pub request_id: String,
}

impl InvocationContext {
    /// Context carrying `request_id`.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}

/// Response headers: case preserved, lookups and replacement case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(BTreeMap<String, String>);

impl ResponseHeaders {
    /// Value of `name`, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is present, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set `name`, replacing any existing entry that differs only in case.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.0.insert(name.to_string(), value.into());
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Outbound gateway envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// HTTP status
    pub status_code: u16,
    /// Response headers
    pub headers: ResponseHeaders,
    /// Response body, base64 when `is_base64_encoded`
    pub body: String,
    /// Set only for bodies that are not valid UTF-8
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ResponseEnvelope {
    /// Empty-bodied response with `status_code`.
    #[must_use]
    pub fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    /// The generic 500 returned when envelope translation fails.
    #[must_use]
    pub fn internal_error() -> Self {
        let mut headers = ResponseHeaders::default();
        headers.insert("content-type", "application/json");
        Self {
            status_code: 500,
            headers,
            body: json!(ErrorResponse::internal()).to_string(),
            is_base64_encoded: false,
        }
    }

    /// Collect a handler chain response.
    ///
    /// Repeated headers are joined with `, `.
    ///
    /// # Errors
    ///
    /// Returns [`LandingError::InvocationError`] if the body stream fails.
    pub async fn from_response(response: Response) -> LandingResult<Self> {
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|e| LandingError::invocation("failed to read response body", Some(e.into_inner())))?;

        let mut headers = ResponseHeaders::default();
        for name in parts.headers.keys() {
            let values: Vec<&str> = parts
                .headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect();
            if !values.is_empty() {
                headers.insert(name.as_str(), values.join(", "));
            }
        }

        let (body, is_base64_encoded) = match std::str::from_utf8(&bytes) {
            Ok(text) => (text.to_string(), false),
            Err(_) => (STANDARD.encode(&bytes), true),
        };

        Ok(Self {
            status_code: parts.status.as_u16(),
            headers,
            body,
            is_base64_encoded,
        })
    }
}
