//! Configuration management for the landing API.
//!
//! Configuration is resolved once at process start, in three layers:
//!
//! 1. [`load_environment_config`] reads `{config_dir}/{ENVIRONMENT}.env` with
//!    `dotenvy`. Variables already present in the process environment win.
//! 2. [`Settings::from_env`] reads and validates the process environment.
//! 3. [`apply_secrets_overlay`] optionally overrides the SMTP and email
//!    settings from a JSON secret in AWS Secrets Manager.
//!
//! The resulting [`Settings`] value is injected into every component that
//! needs it. There is no global settings singleton.
//!
//! ## Environment Variables
//!
//! All optional (with defaults):
//! - `ENVIRONMENT`: Which `config/<name>.env` file to load (default: `local`)
//! - `LANDING_API_CONFIG_DIR`: Directory holding env files (default: `config`)
//! - `VERSION`: Reported service version (default: crate version)
//! - `LANDING_API_DEBUG`: Debug mode, disables the trusted-host check (default: false)
//! - `LANDING_API_RATE_LIMIT`: Requests per client per window (default: 100)
//! - `LANDING_API_RATE_LIMIT_WINDOW_SECS`: Window size in seconds (default: 60)
//! - `LANDING_API_RATE_LIMIT_BYPASS`: Comma-separated path prefixes (default: `/health`)
//! - `LANDING_API_ALLOWED_HOSTS`: Comma-separated host names (default: `*`)
//! - `LANDING_API_CORS_ORIGINS`: Comma-separated origins (default: unset, open policy)
//! - `LANDING_API_LOG_LEVEL`, `LANDING_API_LOG_JSON`, `LANDING_API_LOG_FILE`
//! - `LANDING_API_SMTP_HOST`, `LANDING_API_SMTP_PORT`, `LANDING_API_SMTP_USERNAME`,
//!   `LANDING_API_SMTP_PASSWORD`, `LANDING_API_SMTP_USE_TLS`
//! - `LANDING_API_EMAIL_FROM`, `LANDING_API_EMAIL_TO`
//! - `LANDING_API_PORT`: Listen port for `serve` (default: 8000)
//! - `PATH_PREFIX`: Mount prefix in front of the API, e.g. `/dev` (default: empty)
//! - `LANDING_API_CONFIG_SECRET_NAME`: Secrets Manager secret to overlay
//!
//! ## Example
//!
//! ```no_run
//! use landing_api::config::Settings;
//! use landing_api::error::LandingResult;
//!
//! # fn main() -> LandingResult<()> {
//! let settings = Settings::from_env()?;
//! println!("Rate limit: {}", settings.rate_limit());
//! # Ok(())
//! # }
//! ```

pub mod secrets;

use crate::error::{LandingError, LandingResult};
use std::env;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default per-client request ceiling.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Default rate window in seconds.
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60;

/// Outcome of loading the per-environment `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFileStatus {
    /// File found and applied
    Loaded,
    /// No file for this environment
    Missing,
    /// File found but could not be parsed
    Failed(String),
}

/// Result of [`load_environment_config`].
///
/// Loading happens before tracing is initialized, so the outcome is
/// returned and logged afterwards with [`EnvironmentLoad::log`].
#[derive(Debug, Clone)]
pub struct EnvironmentLoad {
    /// Resolved environment name
    pub environment: String,
    /// Env file that was looked up
    pub path: PathBuf,
    /// What happened to it
    pub status: EnvFileStatus,
}

impl EnvironmentLoad {
    /// Emit the outcome through `tracing`.
    pub fn log(&self) {
        match &self.status {
            EnvFileStatus::Loaded => {
                info!(path = %self.path.display(), "Loaded environment config");
            }
            EnvFileStatus::Missing => {
                warn!(path = %self.path.display(), "Environment file not found");
            }
            EnvFileStatus::Failed(error) => {
                warn!(path = %self.path.display(), error = %error, "Error loading environment config");
            }
        }
        info!(environment = %self.environment, "Environment resolved");
    }
}

/// Load environment-specific configuration from `{config_dir}/{ENVIRONMENT}.env`.
///
/// `ENVIRONMENT` defaults to `local`. Values already present in the process
/// environment are never overwritten, so system variables take precedence
/// over file values. A missing or malformed file is reported, never fatal.
pub fn load_environment_config(config_dir: &Path) -> EnvironmentLoad {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
    let path = config_dir.join(format!("{environment}.env"));

    let status = if path.exists() {
        match dotenvy::from_path(&path) {
            Ok(()) => EnvFileStatus::Loaded,
            Err(e) => EnvFileStatus::Failed(e.to_string()),
        }
    } else {
        EnvFileStatus::Missing
    };

    EnvironmentLoad {
        environment,
        path,
        status,
    }
}

/// Directory holding the per-environment `.env` files.
#[must_use]
pub fn config_dir() -> PathBuf {
    env::var("LANDING_API_CONFIG_DIR").map_or_else(|_| PathBuf::from("config"), PathBuf::from)
}

/// Apply the secrets overlay when `LANDING_API_CONFIG_SECRET_NAME` is set.
///
/// Secrets store failures are logged and leave `settings` in place.
pub async fn apply_secrets_overlay(settings: Settings) -> Settings {
    match env::var("LANDING_API_CONFIG_SECRET_NAME") {
        Ok(name) if !name.trim().is_empty() => {
            let source = secrets::AwsSecretsManager::from_env().await;
            secrets::overlay_from_source(settings, &source, name.trim()).await
        }
        _ => {
            info!("LANDING_API_CONFIG_SECRET_NAME not set; skipping secrets overlay");
            settings
        }
    }
}

/// Runtime settings for the landing API.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Reported service version
    version: String,

    /// Debug mode
    debug: bool,

    /// Max admitted requests per client per window
    rate_limit: NonZeroU32,

    /// Rate window size
    rate_limit_window: Duration,

    /// Path prefixes that never touch the rate limiter
    rate_limit_bypass: Vec<String>,

    /// Accepted `Host` header values (`*` accepts all)
    allowed_hosts: Vec<String>,

    /// Explicit CORS allow-list, `None` when unset
    cors_origins: Option<Vec<String>>,

    /// Log level directive
    log_level: String,

    /// Emit JSON logs
    log_json: bool,

    /// Optional rotating log file
    log_file: Option<PathBuf>,

    smtp_host: String,
    smtp_port: u16,
    smtp_username: Option<String>,
    smtp_password: Option<String>,
    smtp_use_tls: bool,
    email_from: String,
    email_to: String,

    /// Listen port for the always-on server
    port: u16,

    /// Mount prefix in front of the API (e.g. `/dev`)
    path_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
            rate_limit: NonZeroU32::MIN.saturating_add(DEFAULT_RATE_LIMIT - 1),
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
            rate_limit_bypass: vec!["/health".to_string()],
            allowed_hosts: vec!["*".to_string()],
            cors_origins: None,
            log_level: "info".to_string(),
            log_json: false,
            log_file: None,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_use_tls: true,
            email_from: "no-reply@example.com".to_string(),
            email_to: "contact@example.com".to_string(),
            port: 8000,
            path_prefix: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Numeric or boolean variables do not parse
    /// - `LANDING_API_RATE_LIMIT` or `LANDING_API_RATE_LIMIT_WINDOW_SECS` is zero
    pub fn from_env() -> LandingResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::from_env`].
    pub fn from_lookup<F>(lookup: F) -> LandingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let rate_limit = match get("LANDING_API_RATE_LIMIT") {
            Some(raw) => {
                let value = parse_number::<u32>("LANDING_API_RATE_LIMIT", &raw)?;
                NonZeroU32::new(value).ok_or_else(|| {
                    LandingError::config("LANDING_API_RATE_LIMIT must be a positive integer", None)
                })?
            }
            None => defaults.rate_limit,
        };

        let rate_limit_window = match get("LANDING_API_RATE_LIMIT_WINDOW_SECS") {
            Some(raw) => {
                let secs = parse_number::<u64>("LANDING_API_RATE_LIMIT_WINDOW_SECS", &raw)?;
                if secs == 0 {
                    return Err(LandingError::config(
                        "LANDING_API_RATE_LIMIT_WINDOW_SECS must be a positive integer",
                        None,
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.rate_limit_window,
        };

        Ok(Self {
            version: get("VERSION").unwrap_or(defaults.version),
            debug: get("LANDING_API_DEBUG")
                .map(|raw| parse_bool("LANDING_API_DEBUG", &raw))
                .transpose()?
                .unwrap_or(defaults.debug),
            rate_limit,
            rate_limit_window,
            rate_limit_bypass: get("LANDING_API_RATE_LIMIT_BYPASS")
                .map_or(defaults.rate_limit_bypass, |raw| parse_list(&raw)),
            allowed_hosts: get("LANDING_API_ALLOWED_HOSTS")
                .map_or(defaults.allowed_hosts, |raw| parse_list(&raw)),
            cors_origins: get("LANDING_API_CORS_ORIGINS")
                .map(|raw| parse_list(&raw))
                .filter(|origins| !origins.is_empty()),
            log_level: get("LANDING_API_LOG_LEVEL")
                .map_or(defaults.log_level, |level| level.to_lowercase()),
            log_json: get("LANDING_API_LOG_JSON")
                .map(|raw| parse_bool("LANDING_API_LOG_JSON", &raw))
                .transpose()?
                .unwrap_or(defaults.log_json),
            log_file: get("LANDING_API_LOG_FILE").map(PathBuf::from),
            smtp_host: get("LANDING_API_SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: get("LANDING_API_SMTP_PORT")
                .map(|raw| parse_number::<u16>("LANDING_API_SMTP_PORT", &raw))
                .transpose()?
                .unwrap_or(defaults.smtp_port),
            smtp_username: get("LANDING_API_SMTP_USERNAME"),
            smtp_password: get("LANDING_API_SMTP_PASSWORD"),
            smtp_use_tls: get("LANDING_API_SMTP_USE_TLS")
                .map(|raw| parse_bool("LANDING_API_SMTP_USE_TLS", &raw))
                .transpose()?
                .unwrap_or(defaults.smtp_use_tls),
            email_from: get("LANDING_API_EMAIL_FROM").unwrap_or(defaults.email_from),
            email_to: get("LANDING_API_EMAIL_TO").unwrap_or(defaults.email_to),
            port: get("LANDING_API_PORT")
                .map(|raw| parse_number::<u16>("LANDING_API_PORT", &raw))
                .transpose()?
                .unwrap_or(defaults.port),
            path_prefix: get("PATH_PREFIX")
                .map(|raw| normalize_prefix(&raw))
                .unwrap_or_default(),
        })
    }

    /// Override the rate limit.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: NonZeroU32) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Override the rate window.
    #[must_use]
    pub const fn with_rate_limit_window(mut self, window: Duration) -> Self {
        self.rate_limit_window = window;
        self
    }

    /// Override the rate-limit bypass prefixes.
    #[must_use]
    pub fn with_rate_limit_bypass(mut self, prefixes: Vec<String>) -> Self {
        self.rate_limit_bypass = prefixes;
        self
    }

    /// Override the CORS allow-list.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Option<Vec<String>>) -> Self {
        self.cors_origins = origins.filter(|o| !o.is_empty());
        self
    }

    /// Override debug mode.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Override the accepted host names.
    #[must_use]
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }

    /// Override the mount prefix.
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: &str) -> Self {
        self.path_prefix = normalize_prefix(prefix);
        self
    }

    /// Get the reported version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Check if debug mode is enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Get the per-client request ceiling.
    #[must_use]
    pub const fn rate_limit(&self) -> NonZeroU32 {
        self.rate_limit
    }

    /// Get the rate window size.
    #[must_use]
    pub const fn rate_limit_window(&self) -> Duration {
        self.rate_limit_window
    }

    /// Get the rate-limit bypass prefixes.
    #[must_use]
    pub fn rate_limit_bypass(&self) -> &[String] {
        &self.rate_limit_bypass
    }

    /// Get the accepted host names.
    #[must_use]
    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// Get the CORS allow-list, `None` when unset.
    #[must_use]
    pub fn cors_origins(&self) -> Option<&[String]> {
        self.cors_origins.as_deref()
    }

    /// Get the log level directive.
    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Check if JSON logging is enabled.
    #[must_use]
    pub const fn log_json(&self) -> bool {
        self.log_json
    }

    /// Get the optional log file path.
    #[must_use]
    pub const fn log_file(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Get the SMTP host.
    #[must_use]
    pub fn smtp_host(&self) -> &str {
        &self.smtp_host
    }

    /// Get the SMTP port.
    #[must_use]
    pub const fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    /// Get the SMTP username.
    #[must_use]
    pub fn smtp_username(&self) -> Option<&str> {
        self.smtp_username.as_deref()
    }

    /// Get the SMTP password.
    #[must_use]
    pub fn smtp_password(&self) -> Option<&str> {
        self.smtp_password.as_deref()
    }

    /// Check if STARTTLS is used for SMTP.
    #[must_use]
    pub const fn smtp_use_tls(&self) -> bool {
        self.smtp_use_tls
    }

    /// Get the sender address.
    #[must_use]
    pub fn email_from(&self) -> &str {
        &self.email_from
    }

    /// Get the recipient address for contact submissions.
    #[must_use]
    pub fn email_to(&self) -> &str {
        &self.email_to
    }

    /// Get the listen port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Get the mount prefix, empty when running at the root.
    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}

fn parse_number<T>(key: &str, raw: &str) -> LandingResult<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse::<T>().map_err(|e| {
        LandingError::config(format!("{key} must be a valid number, got: {raw}"), Some(Box::new(e)))
    })
}

fn parse_bool(key: &str, raw: &str) -> LandingResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(LandingError::config(
            format!("{key} must be 'true' or 'false', got: {raw}"),
            None,
        )),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
