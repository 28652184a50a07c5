//! Fixed-window rate limiting for the credential endpoints.
//!
//! One bucket per (client address, path prefix), tracked in a DashMap.
//! Requests to paths without a rule are never limited. The client address
//! comes from axum's `ConnectInfo`; without it every request shares one
//! anonymous bucket per prefix.

use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::api::ApiError;

/// Buckets kept before expired windows are swept
pub const DEFAULT_MAX_BUCKETS: usize = 10_000;

/// Limit for one path prefix
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed within the window
    pub max_requests: u32,
    pub window: Duration,
}

type BucketKey = (Option<IpAddr>, String);

/// Shared rate limiter state (clone-friendly via Arc)
#[derive(Clone)]
pub struct RateLimiter {
    /// (client, path prefix) → (window_start, request_count)
    buckets: Arc<DashMap<BucketKey, (Instant, u32)>>,
    rules: Arc<Vec<(String, RateLimitConfig)>>,
    max_buckets: usize,
}

impl RateLimiter {
    pub fn new(rules: Vec<(String, RateLimitConfig)>) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            rules: Arc::new(rules),
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }

    /// Cap on tracked buckets
    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = max_buckets.max(1);
        self
    }

    /// Count the request from `client`. Returns `true` if it is within limits.
    pub fn check(&self, client: Option<IpAddr>, path: &str) -> bool {
        let Some((prefix, config)) = self.rules.iter().find(|(p, _)| path.starts_with(p.as_str()))
        else {
            return true;
        };

        let key = (client, prefix.clone());
        if !self.buckets.contains_key(&key) && self.buckets.len() >= self.max_buckets {
            self.sweep_expired();
            // Still full: refuse newcomers rather than grow without bound
            if self.buckets.len() >= self.max_buckets {
                warn!("[RateLimit] Bucket table full, refusing new client");
                return false;
            }
        }

        let mut entry = self
            .buckets
            .entry(key)
            .or_insert_with(|| (Instant::now(), 0));
        let (window_start, count) = entry.value_mut();

        if window_start.elapsed() >= config.window {
            *window_start = Instant::now();
            *count = 1;
            return true;
        }

        if *count >= config.max_requests {
            return false;
        }

        *count += 1;
        true
    }

    /// Drop buckets whose window has ended; they would reset on next use anyway.
    fn sweep_expired(&self) {
        let before = self.buckets.len();
        self.buckets.retain(|(_, prefix), (window_start, _)| {
            self.rules
                .iter()
                .find(|(p, _)| p == prefix)
                .is_some_and(|(_, config)| window_start.elapsed() < config.window)
        });
        debug!(
            "[RateLimit] Swept {} expired buckets",
            before.saturating_sub(self.buckets.len())
        );
    }

    /// Number of tracked buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Axum middleware; the limiter comes from a request extension
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    if let Some(limiter) = request.extensions().get::<RateLimiter>().cloned() {
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let path = request.uri().path();
        if !limiter.check(client, path) {
            warn!(
                client = ?client,
                "[RateLimit] Rejecting {} {}",
                request.method(),
                path
            );
            return ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again later",
            )
            .into_response();
        }
    }

    next.run(request).await
}

/// Login and registration: 20 requests per minute each, per client
pub fn default_auth_rate_limiter() -> RateLimiter {
    let rule = || RateLimitConfig {
        max_requests: 20,
        window: Duration::from_secs(60),
    };
    RateLimiter::new(vec![
        ("/api/auth/login".to_string(), rule()),
        ("/api/auth/register".to_string(), rule()),
    ])
}
