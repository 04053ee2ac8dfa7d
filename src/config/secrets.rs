//! Secrets store overlay for SMTP and email settings.
//!
//! The secret is a JSON object. Each setting can be given either by its
//! short name (`smtp_host`) or by its environment variable name
//! (`LANDING_API_SMTP_HOST`); `null` values are ignored.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use serde_json::{Map, Value};
use std::env;
use tracing::{info, warn};

use super::Settings;
use crate::error::{LandingError, LandingResult};

/// Source of secret strings, keyed by secret name.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the secret string stored under `name`.
    ///
    /// Returns `Ok(None)` when the secret exists but carries no string value.
    async fn secret_string(&self, name: &str) -> LandingResult<Option<String>>;
}

/// AWS Secrets Manager backed [`SecretSource`].
pub struct AwsSecretsManager {
    client: aws_sdk_secretsmanager::Client,
}

impl AwsSecretsManager {
    /// Build a client from the default credential chain.
    ///
    /// The region comes from `AWS_REGION` when set, otherwise from the SDK's
    /// default provider chain.
    pub async fn from_env() -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Ok(region) = env::var("AWS_REGION") {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self {
            client: aws_sdk_secretsmanager::Client::new(&config),
        }
    }
}

#[async_trait]
impl SecretSource for AwsSecretsManager {
    async fn secret_string(&self, name: &str) -> LandingResult<Option<String>> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                LandingError::secrets(
                    format!("failed to fetch secret {name}: {}", DisplayErrorContext(&e)),
                    None,
                )
            })?;

        Ok(output.secret_string().map(ToString::to_string))
    }
}

/// Fetch `name` from `source` and overlay it onto `settings`.
///
/// Any failure is logged and the original settings are returned unchanged.
pub async fn overlay_from_source<S>(settings: Settings, source: &S, name: &str) -> Settings
where
    S: SecretSource + ?Sized,
{
    let document = match source.secret_string(name).await {
        Ok(Some(document)) if !document.trim().is_empty() => document,
        Ok(_) => {
            warn!(secret = %name, "Secret has no string value; keeping environment settings");
            return settings;
        }
        Err(e) => {
            warn!(secret = %name, error = %e, "Secrets overlay failed; keeping environment settings");
            return settings;
        }
    };

    match apply_secret_document(settings.clone(), &document) {
        Ok(updated) => {
            info!(secret = %name, "Applied secrets overlay");
            updated
        }
        Err(e) => {
            warn!(secret = %name, error = %e, "Secret is not a valid settings document");
            settings
        }
    }
}

/// Apply a JSON secret document to `settings`.
///
/// # Errors
///
/// Returns an error if the document is not a JSON object or a value has the
/// wrong type for its setting.
pub fn apply_secret_document(mut settings: Settings, document: &str) -> LandingResult<Settings> {
    let value: Value = serde_json::from_str(document)
        .map_err(|e| LandingError::secrets("secret is not valid JSON", Some(Box::new(e))))?;
    let Value::Object(data) = value else {
        return Err(LandingError::secrets("secret must be a JSON object", None));
    };

    if let Some(host) = lookup_string(&data, "smtp_host")? {
        settings.smtp_host = host;
    }
    if let Some(port) = lookup_string(&data, "smtp_port")? {
        settings.smtp_port = port.parse::<u16>().map_err(|e| {
            LandingError::secrets(format!("smtp_port must be a port number, got: {port}"), Some(Box::new(e)))
        })?;
    }
    if let Some(username) = lookup_string(&data, "smtp_username")? {
        settings.smtp_username = Some(username);
    }
    if let Some(password) = lookup_string(&data, "smtp_password")? {
        settings.smtp_password = Some(password);
    }
    if let Some(use_tls) = lookup_string(&data, "smtp_use_tls")? {
        settings.smtp_use_tls = super::parse_bool("smtp_use_tls", &use_tls)?;
    }
    if let Some(from) = lookup_string(&data, "email_from")? {
        settings.email_from = from;
    }
    if let Some(to) = lookup_string(&data, "email_to")? {
        settings.email_to = to;
    }

    Ok(settings)
}

/// Look a setting up by short name, then by environment name. Scalars are
/// rendered to strings; the environment form wins when both are present.
fn lookup_string(data: &Map<String, Value>, field: &str) -> LandingResult<Option<String>> {
    let env_key = format!("LANDING_API_{}", field.to_ascii_uppercase());
    let mut found = None;

    for key in [field, env_key.as_str()] {
        match data.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => found = Some(s.clone()),
            Some(Value::Number(n)) => found = Some(n.to_string()),
            Some(Value::Bool(b)) => found = Some(b.to_string()),
            Some(_) => {
                return Err(LandingError::secrets(
                    format!("{key} must be a string, number or boolean"),
                    None,
                ))
            }
        }
    }

    Ok(found)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct StaticSecret(LandingResult<Option<String>>);

    #[async_trait]
    impl SecretSource for StaticSecret {
        async fn secret_string(&self, _name: &str) -> LandingResult<Option<String>> {
            match &self.0 {
                Ok(value) => Ok(value.clone()),
                Err(e) => Err(LandingError::secrets(e.to_string(), None)),
            }
        }
    }

    #[test]
    fn test_short_and_env_keys_are_both_accepted() {
        let document = r#"{
            "smtp_host": "smtp.short.example",
            "LANDING_API_SMTP_PORT": 2525,
            "smtp_use_tls": false,
            "LANDING_API_EMAIL_TO": "sales@example.com",
            "smtp_username": null
        }"#;

        let settings = apply_secret_document(Settings::default(), document).unwrap();

        assert_eq!(settings.smtp_host(), "smtp.short.example");
        assert_eq!(settings.smtp_port(), 2525);
        assert!(!settings.smtp_use_tls());
        assert_eq!(settings.email_to(), "sales@example.com");
        assert!(settings.smtp_username().is_none());
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        assert!(apply_secret_document(Settings::default(), "[1, 2]").is_err());
        assert!(apply_secret_document(Settings::default(), "not json").is_err());
    }

    #[tokio::test]
    async fn test_overlay_failure_keeps_settings() {
        let source = StaticSecret(Err(LandingError::secrets("access denied", None)));
        let settings = overlay_from_source(Settings::default(), &source, "landing/config").await;
        assert_eq!(settings.smtp_host(), "localhost");
    }

    #[tokio::test]
    async fn test_overlay_applies_password() {
        let source = StaticSecret(Ok(Some(
            r#"{"LANDING_API_SMTP_PASSWORD": "hunter22"}"#.to_string(),
        )));
        let settings = overlay_from_source(Settings::default(), &source, "landing/config").await;
        assert_eq!(settings.smtp_password(), Some("hunter22"));
    }

    #[tokio::test]
    async fn test_overlay_with_bad_port_keeps_settings() {
        let source = StaticSecret(Ok(Some(r#"{"smtp_port": "not-a-port"}"#.to_string())));
        let settings = overlay_from_source(Settings::default(), &source, "landing/config").await;
        assert_eq!(settings.smtp_port(), 587);
    }
}
