//! Middleware applied to every request before it reaches a route.
//!
//! Order, outermost first: logging, trusted host, rate limiting, CORS.

pub mod cors;
pub mod error;
pub mod logging;
pub mod rate_limit;
pub mod trusted_host;
