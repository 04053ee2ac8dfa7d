//! Integration tests for the sliding-window rate limiter.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use common::{json_body, request, state_with};
use landing_api::api::middleware::rate_limit::RateLimiter;
use landing_api::api::server::build_router;
use landing_api::config::Settings;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

fn limited(limit: u32) -> Settings {
    Settings::default().with_rate_limit(NonZeroU32::new(limit).unwrap())
}

fn from_peer(uri: &str, ip: [u8; 4]) -> Request<Body> {
    let mut request = request("GET", uri, None);
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40_000))));
    request
}

#[tokio::test]
async fn test_third_request_is_rejected() {
    let (state, _) = state_with(limited(2));
    let router = build_router(state);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(from_peer("/workflows", [198, 51, 100, 1]))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(
        statuses,
        [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[tokio::test]
async fn test_rejection_body() {
    let (state, _) = state_with(limited(1));
    let router = build_router(state);

    router
        .clone()
        .oneshot(from_peer("/runs", [198, 51, 100, 2]))
        .await
        .unwrap();
    let response = router
        .oneshot(from_peer("/runs", [198, 51, 100, 2]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(
        body["error"]["message"],
        "Rate limit of 1 requests per minute exceeded"
    );
}

#[tokio::test]
async fn test_rejection_names_configured_window() {
    let settings = limited(1).with_rate_limit_window(Duration::from_secs(10));
    let (state, _) = state_with(settings);
    let router = build_router(state);

    router
        .clone()
        .oneshot(from_peer("/runs", [198, 51, 100, 6]))
        .await
        .unwrap();
    let response = router
        .oneshot(from_peer("/runs", [198, 51, 100, 6]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        json_body(response).await["error"]["message"],
        "Rate limit of 1 requests per 10s exceeded"
    );
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    let (state, _) = state_with(limited(1));
    let router = build_router(state);

    let first = router
        .clone()
        .oneshot(from_peer("/workflows", [198, 51, 100, 3]))
        .await
        .unwrap();
    let second = router
        .oneshot(from_peer("/workflows", [198, 51, 100, 4]))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bypassed_paths_are_never_recorded() {
    let (state, _) = state_with(limited(2));
    let limiter = Arc::clone(&state.limiter);
    let router = build_router(state);

    for _ in 0..1000 {
        let response = router
            .clone()
            .oneshot(from_peer("/health", [198, 51, 100, 5]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(limiter.tracked_clients(), 0);
    assert_eq!(limiter.recorded("198.51.100.5"), 0);

    // The same client still has its full allowance elsewhere
    let response = router
        .oneshot(from_peer("/workflows", [198, 51, 100, 5]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_requests_without_address_share_unknown_window() {
    let (state, _) = state_with(limited(1));
    let limiter = Arc::clone(&state.limiter);
    let router = build_router(state);

    router
        .oneshot(request("GET", "/workflows", None))
        .await
        .unwrap();

    assert_eq!(limiter.recorded("unknown"), 1);
}

#[test]
fn test_concurrent_admissions_never_exceed_limit() {
    let limiter = Arc::new(RateLimiter::new(
        NonZeroU32::new(50).unwrap(),
        Duration::from_secs(60),
    ));
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            let admitted = Arc::clone(&admitted);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    if limiter.admit("203.0.113.10") {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 50);
    assert_eq!(limiter.recorded("203.0.113.10"), 50);
}

#[test]
fn test_admissions_in_any_window_stay_under_limit() {
    let limiter = RateLimiter::new(NonZeroU32::new(3).unwrap(), Duration::from_secs(60));
    let start = Instant::now();

    // One attempt every 7 seconds for five minutes
    let admitted: Vec<Duration> = (0..43)
        .map(|i| Duration::from_secs(i * 7))
        .filter(|offset| limiter.admit_at("c", start + *offset))
        .collect();

    for (i, first) in admitted.iter().enumerate() {
        let in_window = admitted[i..]
            .iter()
            .take_while(|t| **t - *first < Duration::from_secs(60))
            .count();
        assert!(in_window <= 3, "{in_window} admissions within 60s of {first:?}");
    }
}
