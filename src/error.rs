//! Error types for the landing API.
//!
//! This module provides a unified error type [`LandingError`] covering the
//! failures that can occur outside of an individual HTTP handler: loading
//! configuration, translating invocation envelopes, talking to the SMTP relay
//! or the secrets store.
//!
//! HTTP-facing errors live in [`crate::api::middleware::error::ApiError`],
//! which converts from [`LandingError`] where a handler needs it.
//!
//! # Design
//!
//! The error hierarchy is organized by layer:
//! - [`LandingError::ConfigError`]: Configuration and environment issues
//! - [`LandingError::EnvelopeError`]: Malformed cloud-function envelopes
//! - [`LandingError::InvocationError`]: Faults raised by the handler chain itself
//! - [`LandingError::EmailError`]: Outbound email composition or transport
//! - [`LandingError::SecretsError`]: Secrets store access
//! - [`LandingError::IoError`]: Local I/O (event files, log directories)
//!
//! # Example
//!
//! ```
//! use landing_api::error::{LandingError, LandingResult};
//!
//! fn parse_limit(raw: &str) -> LandingResult<u32> {
//!     raw.parse::<u32>()
//!         .map_err(|e| LandingError::config("rate limit must be a number", Some(Box::new(e))))
//! }
//!
//! assert!(parse_limit("abc").is_err());
//! ```

use std::fmt;

/// Result type alias using [`LandingError`].
pub type LandingResult<T> = Result<T, LandingError>;

/// Boxed source error carried by [`LandingError`] variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for the landing API.
#[derive(Debug)]
pub enum LandingError {
    /// Configuration or environment variable errors.
    ///
    /// Variants include:
    /// - Invalid numeric or boolean environment values
    /// - A zero rate limit or window size
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Invocation envelope could not be normalized.
    ///
    /// Variants include:
    /// - Missing or unknown HTTP method
    /// - Body flagged as base64 that does not decode
    /// - Path or headers that cannot form a valid HTTP request
    EnvelopeError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// The handler chain failed to produce a response.
    ///
    /// This is never converted into an HTTP response; it is propagated to
    /// the hosting runtime so the invocation is marked as failed.
    InvocationError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Outbound email errors.
    EmailError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Secrets store errors.
    SecretsError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Local I/O errors.
    IoError {
        /// Human-readable error message
        message: String,
        /// Underlying error
        source: std::io::Error,
    },
}

impl LandingError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use landing_api::error::LandingError;
    ///
    /// let err = LandingError::config("LANDING_API_RATE_LIMIT must be positive", None);
    /// assert!(matches!(err, LandingError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new envelope error.
    ///
    /// # Example
    ///
    /// ```
    /// use landing_api::error::LandingError;
    ///
    /// let err = LandingError::envelope("missing HTTP method", None);
    /// assert!(matches!(err, LandingError::EnvelopeError { .. }));
    /// ```
    #[must_use]
    pub fn envelope(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::EnvelopeError {
            message: message.into(),
            source,
        }
    }

    /// Create a new invocation error.
    #[must_use]
    pub fn invocation(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::InvocationError {
            message: message.into(),
            source,
        }
    }

    /// Create a new email error.
    ///
    /// # Example
    ///
    /// ```
    /// use landing_api::error::LandingError;
    ///
    /// let err = LandingError::email("connection refused", None);
    /// assert_eq!(err.to_string(), "Email error: connection refused");
    /// ```
    #[must_use]
    pub fn email(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::EmailError {
            message: message.into(),
            source,
        }
    }

    /// Create a new secrets store error.
    #[must_use]
    pub fn secrets(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::SecretsError {
            message: message.into(),
            source,
        }
    }

    /// Create a new I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for LandingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::EnvelopeError { message, .. } => write!(f, "Envelope error: {message}"),
            Self::InvocationError { message, .. } => write!(f, "Invocation error: {message}"),
            Self::EmailError { message, .. } => write!(f, "Email error: {message}"),
            Self::SecretsError { message, .. } => write!(f, "Secrets error: {message}"),
            Self::IoError { message, source } => write!(f, "I/O error: {message}: {source}"),
        }
    }
}

impl std::error::Error for LandingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::EnvelopeError { source, .. }
            | Self::InvocationError { source, .. }
            | Self::EmailError { source, .. }
            | Self::SecretsError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            Self::IoError { source, .. } => Some(source),
        }
    }
}

/// Convert from `eyre::Report` to `LandingError`.
///
/// Reports reaching this conversion come from the composition roots, where
/// the only remaining failure class is configuration.
impl From<eyre::Report> for LandingError {
    fn from(err: eyre::Report) -> Self {
        Self::ConfigError {
            message: err.to_string(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error() {
        let err = LandingError::config("bad value", None);
        assert!(matches!(err, LandingError::ConfigError { .. }));
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }

    #[test]
    fn test_envelope_error() {
        let err = LandingError::envelope("missing method", None);
        assert_eq!(err.to_string(), "Envelope error: missing method");
    }

    #[test]
    fn test_invocation_error() {
        let err = LandingError::invocation("handler chain failed", None);
        assert!(matches!(err, LandingError::InvocationError { .. }));
        assert_eq!(err.to_string(), "Invocation error: handler chain failed");
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = LandingError::config("failed to load", Some(Box::new(source)));

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Configuration error: failed to load");
    }

    #[test]
    fn test_io_error_always_has_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = LandingError::io("reading event file", source);

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "I/O error: reading event file: denied");
    }

    #[test]
    fn test_from_eyre_report() {
        let err: LandingError = eyre::eyre!("boom").into();
        assert!(matches!(err, LandingError::ConfigError { .. }));
    }
}
