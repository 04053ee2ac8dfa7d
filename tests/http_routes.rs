//! Integration tests for the HTTP surface, driven through the full router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{json_body, request, state_with, FailingMailer};
use landing_api::api::middleware::logging::PROCESS_TIME_HEADER;
use landing_api::api::server::build_router;
use landing_api::app_state::AppState;
use landing_api::config::Settings;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn test_root_describes_the_service() {
    let (state, _) = state_with(Settings::default().with_debug(true).with_path_prefix("/prod"));
    let response = build_router(state)
        .oneshot(request("GET", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["name"], "Landing API");
    assert_eq!(body["docs_url"], "/prod/docs");
    assert_eq!(body["root_path"], "/prod");
}

#[tokio::test]
async fn test_root_hides_docs_outside_debug() {
    let (state, _) = state_with(Settings::default());
    let response = build_router(state)
        .oneshot(request("GET", "/", None))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert!(body["docs_url"].is_null());
    assert!(body["root_path"].is_null());
}

#[tokio::test]
async fn test_health_endpoints() {
    let (state, _) = state_with(Settings::default());
    let router = build_router(state);

    let response = router
        .clone()
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["api"], "OK");

    let response = router
        .oneshot(request("GET", "/health/detailed", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["checks"]["uptime_seconds"].is_string());
}

#[tokio::test]
async fn test_placeholders_answer_statically() {
    let (state, _) = state_with(Settings::default());
    let router = build_router(state);

    for (method, uri, message) in [
        ("GET", "/workflows", "Workflows API is not implemented for the Landing API."),
        ("POST", "/workflows", "Workflows API is not implemented for the Landing API."),
        ("GET", "/runs", "Runs API is not implemented for the Landing API."),
        ("POST", "/runs", "Runs API is not implemented for the Landing API."),
    ] {
        let response = router
            .clone()
            .oneshot(request(method, uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{method} {uri}");
        assert_eq!(json_body(response).await["message"], message);
    }
}

#[tokio::test]
async fn test_lookups_and_unknown_routes_are_not_found() {
    let (state, _) = state_with(Settings::default());
    let router = build_router(state);

    for (uri, code) in [
        ("/workflows/wf-1", "WORKFLOW_NOT_FOUND"),
        ("/runs/run-1", "RUN_NOT_FOUND"),
        ("/no/such/route", "NOT_FOUND"),
    ] {
        let response = router
            .clone()
            .oneshot(request("GET", uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(json_body(response).await["error"]["code"], code);
    }
}

#[tokio::test]
async fn test_contact_sends_email() {
    let (state, mailer) = state_with(Settings::default());
    let response = build_router(state)
        .oneshot(request(
            "POST",
            "/contact",
            Some(r#"{"name": " Ada ", "phone": "+1 555 0100"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New contact submission");
    assert_eq!(sent[0].body, "Name: Ada\nPhone: +1 555 0100");
}

#[tokio::test]
async fn test_contact_accepts_form_bodies() {
    let (state, mailer) = state_with(Settings::default());
    let request = Request::builder()
        .method("POST")
        .uri("/contact")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("name=Grace+Hopper&phone=42"))
        .unwrap();

    let response = build_router(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mailer.sent()[0].body, "Name: Grace Hopper\nPhone: 42");
}

#[tokio::test]
async fn test_contact_with_empty_name_is_rejected() {
    let (state, mailer) = state_with(Settings::default());
    let response = build_router(state)
        .oneshot(request("POST", "/contact", Some(r#"{"name": "", "phone": "123"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELDS");
    assert_eq!(body["error"]["details"]["fields"], serde_json::json!(["name"]));
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_contact_reports_transport_failure() {
    let state = AppState::new(Settings::default(), Arc::new(FailingMailer));
    let response = build_router(state)
        .oneshot(request("POST", "/contact", Some(r#"{"name": "Ada", "phone": "1"}"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "EMAIL_SEND_FAILED");
    assert!(body["error"]["details"]["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_untrusted_host_is_rejected() {
    let settings = Settings::default().with_allowed_hosts(vec!["api.example.com".to_string()]);
    let (state, _) = state_with(settings);
    let router = build_router(state);

    let rejected = Request::builder()
        .uri("/workflows")
        .header("host", "attacker.example")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(rejected).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "INVALID_HOST");

    let accepted = Request::builder()
        .uri("/workflows")
        .header("host", "api.example.com:443")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(accepted).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_debug_mode_skips_host_check() {
    let settings = Settings::default()
        .with_allowed_hosts(vec!["api.example.com".to_string()])
        .with_debug(true);
    let (state, _) = state_with(settings);

    let request = Request::builder()
        .uri("/workflows")
        .header("host", "localhost:8000")
        .body(Body::empty())
        .unwrap();
    let response = build_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_process_time() {
    let (state, _) = state_with(Settings::default());
    let response = build_router(state)
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();

    let value = response.headers().get(PROCESS_TIME_HEADER).unwrap();
    assert!(value.to_str().unwrap().parse::<f64>().is_ok());
}

#[tokio::test]
async fn test_declarative_cors_honours_allow_list() {
    let settings =
        Settings::default().with_cors_origins(Some(vec!["https://allowed.example".to_string()]));
    let (state, _) = state_with(settings);
    let router = build_router(state);

    let allowed = Request::builder()
        .uri("/workflows")
        .header("origin", "https://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://allowed.example"
    );
    assert_eq!(
        response.headers().get("access-control-allow-credentials").unwrap(),
        "true"
    );

    let denied = Request::builder()
        .uri("/workflows")
        .header("origin", "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(denied).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (state, _) = state_with(Settings::default());
    let response = build_router(state)
        .oneshot(request("GET", "/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["paths"]["/contact"].is_object());
}
