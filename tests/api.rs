mod common;

use std::time::Duration;

use axum::http::StatusCode;

use common::{test_app, test_config};

#[tokio::test]
async fn test_health() {
    let app = test_app(test_config());
    let (status, _, body) = app.send("GET", "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "service is up and running");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = test_app(test_config());
    let (status, _, body) = app.send("GET", "/api/v1/users/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "unauthorized");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = test_app(test_config());
    let (status, _, body) = app
        .send("GET", "/api/v1/reservations", Some("not.a.jwt"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app(test_config());
    let (status, _, _) = app.send("GET", "/api/v2/health", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_throttle_rejects_after_limit() {
    let mut config = test_config();
    config.throttle_limit = 2;
    config.throttle_window = Duration::from_secs(60);
    let app = test_app(config);

    let (first, headers, _) = app.send("GET", "/api/v1/health", None, None).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(headers["x-ratelimit-limit"], "2");
    assert_eq!(headers["x-ratelimit-remaining"], "1");

    let (second, _, _) = app.send("GET", "/api/v1/health", None, None).await;
    assert_eq!(second, StatusCode::OK);

    let (third, headers, body) = app.send("GET", "/api/v1/health", None, None).await;
    assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error_type"], "too_many_requests");
    assert!(headers.contains_key("retry-after"));
    assert_eq!(headers["x-ratelimit-remaining"], "0");
}
