//! Contact form submission.
//!
//! Accepts JSON or `application/x-www-form-urlencoded` bodies. Bodies with
//! any other content type are tried as JSON first and then as a form.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use tracing::{info, instrument};

use crate::api::middleware::error::ApiError;
use crate::api::models::{ContactRequest, ContactResponse};
use crate::app_state::AppState;
use crate::email::EmailMessage;

/// A validated submission: both fields present and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    /// Visitor name
    pub name: String,
    /// Visitor phone number
    pub phone: String,
}

impl ContactRequest {
    /// Parse a request body according to its content type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBody`] when a JSON body is malformed or a
    /// field has the wrong type.
    pub fn parse(content_type: &str, body: &[u8]) -> Result<Self, ApiError> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        if content_type.contains("application/json") {
            serde_json::from_slice(body)
                .map_err(|e| ApiError::InvalidBody(format!("Invalid JSON body: {e}")))
        } else if content_type.contains("application/x-www-form-urlencoded") {
            Ok(Self::from_form(body))
        } else {
            Ok(serde_json::from_slice(body).unwrap_or_else(|_| Self::from_form(body)))
        }
    }

    fn from_form(body: &[u8]) -> Self {
        let mut request = Self::default();
        // First value wins for repeated keys
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "name" if request.name.is_none() => request.name = Some(value.into_owned()),
                "phone" if request.phone.is_none() => request.phone = Some(value.into_owned()),
                _ => {}
            }
        }
        request
    }

    /// Check that `name` and `phone` are present and not blank.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingFields`] naming every missing field.
    pub fn validate(self) -> Result<ContactSubmission, ApiError> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let phone = self.phone.as_deref().map(str::trim).unwrap_or_default();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if phone.is_empty() {
            missing.push("phone");
        }
        if !missing.is_empty() {
            return Err(ApiError::MissingFields(missing));
        }

        Ok(ContactSubmission {
            name: name.to_string(),
            phone: phone.to_string(),
        })
    }
}

#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Submission accepted", body = ContactResponse),
        (status = 400, description = "Missing name or phone", body = crate::api::models::ErrorResponse),
        (status = 500, description = "Email could not be sent", body = crate::api::models::ErrorResponse)
    ),
    tag = "Contact"
)]
/// Accept a contact submission and forward it by email.
#[instrument(skip_all)]
pub async fn create_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContactResponse>, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let submission = ContactRequest::parse(&content_type, &body)?.validate()?;

    let message =
        EmailMessage::contact_submission(&state.settings, &submission.name, &submission.phone);
    state.mailer.send(&message).await?;

    info!(name = %submission.name, "Landing form submission");

    Ok(Json(ContactResponse {
        status: "ok".to_string(),
    }))
}
