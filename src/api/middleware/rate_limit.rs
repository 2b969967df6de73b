//! Per-client-IP rate limiting

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use tracing::warn;

use crate::api::types::ApiError;
use crate::config::RateLimitConfig;

const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Tracked clients before idle entries are swept
const SWEEP_THRESHOLD: usize = 10_000;

/// Shared limiter keyed by client IP
#[derive(Clone)]
pub struct RateLimitState {
    limiter: Option<Arc<DefaultKeyedRateLimiter<IpAddr>>>,
    max_requests: u32,
    trust_forwarded_headers: bool,
}

impl RateLimitState {
    pub fn new(config: &RateLimitConfig) -> Self {
        let limiter = if config.enabled {
            let quota = Self::quota(config);
            if quota.is_none() {
                warn!(
                    max_requests = config.max_requests,
                    window_secs = config.window_secs,
                    "Rate limit quota is empty, requests are not limited"
                );
            }
            quota.map(|quota| Arc::new(RateLimiter::keyed(quota)))
        } else {
            None
        };

        Self {
            limiter,
            max_requests: config.max_requests,
            trust_forwarded_headers: config.trust_forwarded_headers,
        }
    }

    /// `max_requests` available at once, refilled evenly across the window
    fn quota(config: &RateLimitConfig) -> Option<Quota> {
        let burst = NonZeroU32::new(config.max_requests)?;
        let window = Duration::from_secs(config.window_secs);

        Quota::with_period(window / burst.get()).map(|quota| quota.allow_burst(burst))
    }

    fn client_ip(&self, request: &Request<Body>) -> IpAddr {
        let header_ip = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .and_then(|value| value.trim().parse().ok())
        };

        self.trust_forwarded_headers
            .then(|| header_ip("x-forwarded-for").or_else(|| header_ip("x-real-ip")))
            .flatten()
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

/// Rejects a client with 429 and `Retry-After` once its budget is spent
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = state.limiter.as_ref() else {
        return next.run(request).await;
    };

    if limiter.len() >= SWEEP_THRESHOLD {
        limiter.retain_recent();
    }

    let ip = state.client_ip(&request);

    match limiter.check_key(&ip) {
        Ok(()) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(state.max_requests),
            );
            response
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs()
                .max(1);

            warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let mut response = ApiError::too_many_requests(RATE_LIMIT_MESSAGE).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(config: RateLimitConfig) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                RateLimitState::new(&config),
                rate_limit_middleware,
            ))
    }

    fn limited(max_requests: u32) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs: 900,
            trust_forwarded_headers: true,
        }
    }

    fn from(ip: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_rejects_after_budget() {
        let app = app(limited(2));

        for _ in 0..2 {
            let response = app.clone().oneshot(from("10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["x-ratelimit-limit"], "2");
        }

        let response = app.clone().oneshot(from("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_clients_have_separate_budgets() {
        let app = app(limited(1));

        let first = app.clone().oneshot(from("10.0.0.1")).await.unwrap();
        let other = app.clone().oneshot(from("10.0.0.2, 172.16.0.1")).await.unwrap();
        let again = app.clone().oneshot(from("10.0.0.1")).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(other.status(), StatusCode::OK);
        assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_forwarded_headers_ignored_unless_trusted() {
        let app = app(RateLimitConfig {
            trust_forwarded_headers: false,
            ..limited(1)
        });

        let first = app.clone().oneshot(from("10.0.0.1")).await.unwrap();
        let spoofed = app.clone().oneshot(from("10.0.0.2")).await.unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(spoofed.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_disabled_never_limits() {
        let app = app(RateLimitConfig {
            enabled: false,
            ..limited(1)
        });

        for _ in 0..3 {
            let response = app.clone().oneshot(from("10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(!response.headers().contains_key("x-ratelimit-limit"));
        }
    }
}
