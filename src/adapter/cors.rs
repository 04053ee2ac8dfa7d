//! Safety-net CORS headers applied at the adapter boundary.
//!
//! Some gateway configurations answer or rewrite requests before the
//! declarative layer in the handler chain sees them, so the adapter sets the
//! same headers again from the same [`CorsPolicy`].

use crate::adapter::envelope::{ResponseEnvelope, ResponseHeaders};
use crate::api::middleware::cors::{CorsPolicy, ALLOW_HEADERS, ALLOW_METHODS};

/// Add CORS headers to `response` when `origin` is present and permitted.
///
/// Without an origin, or with one the policy rejects, the response is left
/// untouched.
pub fn inject_cors_headers(response: &mut ResponseEnvelope, origin: Option<&str>, policy: &CorsPolicy) {
    let Some(origin) = origin.filter(|origin| policy.permits(origin)) else {
        return;
    };

    let headers = &mut response.headers;
    headers.insert("Access-Control-Allow-Origin", origin);
    headers.insert("Access-Control-Allow-Credentials", "true");
    headers.insert("Access-Control-Allow-Headers", ALLOW_HEADERS);
    headers.insert("Access-Control-Allow-Methods", ALLOW_METHODS);
    add_vary_origin(headers);
}

/// Preflight answer: 200 with an empty body.
#[must_use]
pub fn preflight_response(origin: Option<&str>, policy: &CorsPolicy) -> ResponseEnvelope {
    let mut response = ResponseEnvelope::empty(200);
    inject_cors_headers(&mut response, origin, policy);
    response
}

fn add_vary_origin(headers: &mut ResponseHeaders) {
    let vary = match headers.get("Vary") {
        Some(existing)
            if existing
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("origin")) =>
        {
            return;
        }
        Some(existing) if !existing.trim().is_empty() => format!("{existing}, Origin"),
        _ => "Origin".to_string(),
    };
    headers.insert("Vary", vary);
}
