//! HTTP API: routes, middleware and the router shared by both entry points.

pub mod docs;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
