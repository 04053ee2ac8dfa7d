//! Outbound email for contact submissions.
//!
//! [`EmailSender`] is the seam the contact route depends on;
//! [`SmtpEmailSender`] is the production implementation on top of lettre's
//! async SMTP transport, so no blocking call runs on the runtime threads.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{LandingError, LandingResult};

/// A plain-text email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl EmailMessage {
    /// Compose the notification for a contact form submission.
    #[must_use]
    pub fn contact_submission(settings: &Settings, name: &str, phone: &str) -> Self {
        Self {
            from: settings.email_from().to_string(),
            to: settings.email_to().to_string(),
            subject: "New contact submission".to_string(),
            body: format!("Name: {name}\nPhone: {phone}"),
        }
    }
}

/// Sends email messages.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `message`.
    ///
    /// # Errors
    ///
    /// Returns [`LandingError::EmailError`] when the message cannot be built
    /// or the transport rejects it.
    async fn send(&self, message: &EmailMessage) -> LandingResult<()>;
}

/// SMTP-backed [`EmailSender`].
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    /// Build the transport from settings.
    ///
    /// Uses STARTTLS when `smtp_use_tls` is set and a plain connection
    /// otherwise. Credentials are only sent when both username and password
    /// are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS parameters for `smtp_host` cannot be built.
    pub fn from_settings(settings: &Settings) -> LandingResult<Self> {
        let mut builder = if settings.smtp_use_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(settings.smtp_host())
                .map_err(|e| {
                    LandingError::email("failed to create SMTP STARTTLS transport", Some(Box::new(e)))
                })?
                .port(settings.smtp_port())
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.smtp_host())
                .port(settings.smtp_port())
        };

        if let (Some(user), Some(pass)) = (settings.smtp_username(), settings.smtp_password()) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        debug!(
            host = settings.smtp_host(),
            port = settings.smtp_port(),
            tls = settings.smtp_use_tls(),
            "SMTP transport configured"
        );

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> LandingResult<()> {
        let email = Message::builder()
            .from(message.from.parse().map_err(|e| {
                LandingError::email("invalid sender address", Some(Box::new(e)))
            })?)
            .to(message.to.parse().map_err(|e| {
                LandingError::email("invalid recipient address", Some(Box::new(e)))
            })?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| LandingError::email("failed to build email message", Some(Box::new(e))))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| LandingError::email(format!("SMTP send failed: {e}"), Some(Box::new(e))))?;

        info!(subject = %message.subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_message_composition() {
        let message = EmailMessage::contact_submission(&Settings::default(), "Ada", "+1 555 0100");

        assert_eq!(message.subject, "New contact submission");
        assert_eq!(message.from, "no-reply@example.com");
        assert_eq!(message.to, "contact@example.com");
        assert_eq!(message.body, "Name: Ada\nPhone: +1 555 0100");
    }

    #[test]
    fn test_sender_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpEmailSender>();
    }

    #[tokio::test]
    async fn test_invalid_sender_address_is_an_email_error() {
        let sender = SmtpEmailSender::from_settings(&Settings::default()).unwrap();
        let message = EmailMessage {
            from: "not an address".to_string(),
            to: "contact@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        };

        let result = sender.send(&message).await;
        assert!(matches!(result, Err(LandingError::EmailError { .. })));
    }
}
