//! Fixed-window request throttling.
//!
//! Each client key gets a counter that lives for one window in a moka cache;
//! the entry's TTL is the window, so expiry resets the count.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache;
use tracing::warn;

use crate::error::AppError;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: AtomicU32,
}

/// Result of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed { remaining: u32, reset_secs: u64 },
    Limited { retry_after_secs: u64 },
}

#[derive(Clone)]
pub struct Throttle {
    windows: Cache<String, Arc<Window>>,
    limit: u32,
    window: Duration,
}

impl Throttle {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(window)
                .build(),
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn secs_left(&self, window: &Window) -> u64 {
        let left = self.window.saturating_sub(window.started.elapsed());
        left.as_secs_f64().ceil().max(1.0) as u64
    }

    /// Count a request for `key` and decide whether it may pass
    pub async fn check(&self, key: &str) -> ThrottleDecision {
        let window = self
            .windows
            .get_with(key.to_string(), async {
                Arc::new(Window {
                    started: Instant::now(),
                    count: AtomicU32::new(0),
                })
            })
            .await;

        let count = window.count.fetch_add(1, Ordering::SeqCst) + 1;
        let reset_secs = self.secs_left(&window);

        if count > self.limit {
            ThrottleDecision::Limited {
                retry_after_secs: reset_secs,
            }
        } else {
            ThrottleDecision::Allowed {
                remaining: self.limit - count,
                reset_secs,
            }
        }
    }
}

/// Client key: first `x-forwarded-for` hop, then `x-real-ip`
pub fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Throttling middleware
pub async fn throttle_middleware(
    State(throttle): State<Throttle>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    match throttle.check(&key).await {
        ThrottleDecision::Allowed {
            remaining,
            reset_secs,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(throttle.limit()));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            headers.insert("x-ratelimit-reset", HeaderValue::from(reset_secs));
            response
        }
        ThrottleDecision::Limited { retry_after_secs } => {
            warn!(client = %key, retry_after = retry_after_secs, "Request throttled");

            let mut response = AppError::TooManyRequests { retry_after_secs }.into_response();
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(throttle.limit()));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(0u32));
            headers.insert("x-ratelimit-reset", HeaderValue::from(retry_after_secs));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[tokio::test]
    async fn test_limit_applies_per_key() {
        let throttle = Throttle::new(2, Duration::from_secs(60));

        assert!(matches!(
            throttle.check("a").await,
            ThrottleDecision::Allowed { remaining: 1, .. }
        ));
        assert!(matches!(
            throttle.check("a").await,
            ThrottleDecision::Allowed { remaining: 0, .. }
        ));
        assert!(matches!(
            throttle.check("a").await,
            ThrottleDecision::Limited { .. }
        ));
        assert!(matches!(
            throttle.check("b").await,
            ThrottleDecision::Allowed { remaining: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_retry_after_within_window() {
        let throttle = Throttle::new(0, Duration::from_secs(30));
        match throttle.check("a").await {
            ThrottleDecision::Limited { retry_after_secs } => {
                assert!((1..=30).contains(&retry_after_secs))
            }
            other => panic!("expected Limited, got {:?}", other),
        }
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "203.0.113.7");

        let request = Request::builder()
            .header("x-real-ip", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "10.0.0.2");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&request), "anonymous");
    }
}
