//! Observability and structured logging infrastructure.
//!
//! Logging goes through the `tracing` framework in both deployment shapes, so
//! the always-on server and the per-invocation adapter emit the same
//! structured events.
//!
//! # Usage
//!
//! Initialize tracing once at process start and keep the returned guard
//! alive for as long as file logging should keep flushing:
//!
//! ```no_run
//! use landing_api::observability;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let _guard = observability::init_tracing(Some("info".to_string()), None, true)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Configuration
//!
//! ```bash
//! # Set log level for all modules
//! RUST_LOG=debug landing-api serve
//!
//! # JSON output, as shipped to the log aggregator
//! LANDING_API_LOG_JSON=true landing-api serve
//!
//! # Additionally write JSON logs to a daily-rotated file
//! LANDING_API_LOG_FILE=./logs/landing-api.log landing-api serve
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{LandingError, LandingResult};

/// Build the filter directive for a bare level such as `info`.
///
/// Full directives (containing `=` or `,`) are passed through untouched.
#[must_use]
pub fn filter_directive(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("landing_api={level},tower_http={level},warn")
    }
}

/// Initialize the tracing subscriber.
///
/// # Arguments
///
/// * `log_level` - Optional level or filter directive. `RUST_LOG` takes precedence.
/// * `log_file` - Optional file path for JSON log output with daily rotation.
/// * `json_output` - JSON console output for log aggregation, pretty output otherwise.
///
/// Returns the file writer guard when file logging is enabled; dropping it
/// stops the background writer.
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be created
/// - A global subscriber is already installed
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> LandingResult<Option<WorkerGuard>> {
    let env_filter = if let Ok(filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(filter)
    } else if let Some(level) = log_level {
        EnvFilter::new(filter_directive(&level))
    } else {
        EnvFilter::new(filter_directive("info"))
    };

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .boxed()
    };

    let mut guard = None;
    let file_layer = if let Some(ref path) = log_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LandingError::io("creating log directory", e))?;
        }

        let file_appender = tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_name().unwrap_or_else(|| OsStr::new("landing-api.log")),
        );
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        // File output is always JSON
        Some(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_current_span(true)
                .with_target(true)
                .boxed(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LandingError::config("tracing subscriber already initialized", Some(Box::new(e))))?;

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized successfully"
    );

    Ok(guard)
}
