//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::response::Response;
use landing_api::app_state::AppState;
use landing_api::config::Settings;
use landing_api::email::{EmailMessage, EmailSender};
use landing_api::error::{LandingError, LandingResult};
use std::sync::{Arc, Mutex};

/// Mailer that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> LandingResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Mailer whose transport is always down.
pub struct FailingMailer;

#[async_trait]
impl EmailSender for FailingMailer {
    async fn send(&self, _message: &EmailMessage) -> LandingResult<()> {
        Err(LandingError::email("SMTP send failed: connection refused", None))
    }
}

/// Fresh state with a recording mailer.
pub fn state_with(settings: Settings) -> (AppState, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(settings, mailer.clone());
    (state, mailer)
}

/// Collect a response body as JSON.
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Build a request with an optional JSON body.
pub fn request(method: &str, uri: &str, body: Option<&str>) -> axum::http::Request<Body> {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
