//! # Landing API
//!
//! Backend for a marketing landing site: health checks, a service
//! descriptor, placeholder workflow and run endpoints, and a contact form
//! that forwards submissions by email.
//!
//! The same handler chain is served two ways:
//!
//! - by a long-lived [axum](https://docs.rs/axum) server ([`api::server`])
//! - one request at a time through the cloud-function [`adapter`], which
//!   translates gateway envelopes to and from `http` types
//!
//! ## Architecture
//!
//! 1. **Config** ([`config`]) - `.env` file, process environment and an
//!    optional secrets store, resolved once into [`config::Settings`]
//! 2. **State** ([`app_state`]) - settings, rate-limit windows, CORS policy
//!    and the mailer, shared by every request
//! 3. **Handler chain** ([`api`]) - panic catcher, tracing, request logging,
//!    trusted host, rate limiting, CORS, routing
//! 4. **Adapter** ([`adapter`]) - preflight short-circuit, body decoding,
//!    safety-net CORS, one log line per invocation
//! 5. **Email** ([`email`]) - SMTP delivery behind the [`email::EmailSender`] trait
//!
//! ## Quick Start
//!
//! ```bash
//! # Always-on server
//! cargo run --release -- serve --port 8000
//!
//! # One invocation from a saved gateway event
//! cargo run --release -- invoke --event event.json
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`error::LandingResult<T>`](error::LandingResult).
//! HTTP-facing failures are [`api::middleware::error::ApiError`] values that
//! render as `{"error": {"code", "message", "details"}}`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod adapter;
pub mod api;
pub mod app_state;
pub mod cli;
pub mod config;
pub mod email;
pub mod error;
pub mod observability;
