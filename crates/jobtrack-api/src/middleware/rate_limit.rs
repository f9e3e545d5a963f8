//! Per-IP sliding-window rate limiting for the public write endpoints.
//!
//! State is held in process memory and is NOT shared across instances: when
//! the platform runs several copies of this service, each enforces the quota
//! independently. That weakness is deliberate and documented; cross-instance
//! limiting needs an external shared counter. Counters also reset on restart.

use crate::error::HttpAppError;
use crate::utils::ip::extract_client_ip;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jobtrack_core::AppError;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Sharded sliding-window limiter. Keys are hashed across shards to reduce
/// lock contention; each bucket keeps the admission timestamps still inside
/// the trailing window.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    shards: Vec<Arc<Mutex<HashMap<String, VecDeque<Instant>>>>>,
    shard_count: usize,
    quota: u32,
    window: Duration,
    max_buckets: usize,
}

impl SlidingWindowLimiter {
    /// Create a limiter with the default shard count (16 shards).
    pub fn new(quota: u32, window: Duration) -> Self {
        Self::with_shards(quota, window, 16)
    }

    pub fn with_shards(quota: u32, window: Duration, shard_count: usize) -> Self {
        let shards = (0..shard_count)
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            shard_count,
            quota,
            window,
            max_buckets: 10_000,
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shard_count
    }

    /// Admit or deny one event for `key`. Returns the remaining quota on
    /// admission, or how long to wait before the next admission can succeed.
    pub async fn admit(&self, key: &str) -> Result<u32, Duration> {
        let shard = &self.shards[self.shard_index(key)];
        let mut buckets = shard.lock().await;
        let now = Instant::now();

        // Bound memory: drop empty buckets first, then the stalest one.
        if buckets.len() >= self.max_buckets && !buckets.contains_key(key) {
            let window = self.window;
            buckets.retain(|_key, timestamps: &mut VecDeque<Instant>| {
                timestamps
                    .back()
                    .is_some_and(|last| now.duration_since(*last) < window)
            });
            if buckets.len() >= self.max_buckets {
                let stalest = buckets
                    .iter()
                    .min_by_key(|(_, timestamps)| timestamps.back().copied())
                    .map(|(k, _)| k.clone());
                if let Some(key_to_remove) = stalest {
                    buckets.remove(&key_to_remove);
                    tracing::debug!(
                        removed_key = %key_to_remove,
                        "Evicted stalest rate limit bucket due to capacity limit"
                    );
                }
            }
        }

        let timestamps = buckets.entry(key.to_string()).or_default();

        // Slide the window: drop admissions older than it.
        while timestamps
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            timestamps.pop_front();
        }

        if (timestamps.len() as u32) < self.quota {
            timestamps.push_back(now);
            Ok(self.quota - timestamps.len() as u32)
        } else {
            // The denied caller can retry once the oldest in-window
            // admission ages out.
            let retry_after = timestamps
                .front()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            Err(retry_after.max(Duration::from_secs(1)))
        }
    }
}

/// State for the rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: SlidingWindowLimiter,
    pub trusted_proxy_count: usize,
}

impl RateLimitState {
    pub fn from_config(config: &jobtrack_core::Config) -> Self {
        Self {
            limiter: SlidingWindowLimiter::new(
                config.rate_limit_quota,
                Duration::from_secs(config.rate_limit_window_secs),
            ),
            trusted_proxy_count: config.trusted_proxy_count,
        }
    }
}

/// Rate limiting middleware for the public write endpoints, keyed by source
/// IP.
///
/// # Headers
/// - `X-RateLimit-Limit` / `X-RateLimit-Remaining` on admitted requests
/// - `Retry-After` on 429 responses
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimitState>>,
    request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        state.trusted_proxy_count,
    );
    let key = format!("ip:{}", ip);
    let limit = state.limiter.quota();

    match state.limiter.admit(&key).await {
        Ok(remaining) => {
            let mut response = next.run(request).await;
            if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
                response.headers_mut().insert("X-RateLimit-Limit", value);
            }
            if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Remaining", value);
            }
            response
        }
        Err(retry_after) => {
            tracing::warn!(
                key = %key,
                path = %request.uri().path(),
                limit = limit,
                "Rate limit exceeded"
            );

            let mut response = HttpAppError(AppError::RateLimited {
                retry_after_seconds: retry_after.as_secs().max(1),
            })
            .into_response();
            if let Ok(value) = HeaderValue::from_str(&limit.to_string()) {
                response.headers_mut().insert("X-RateLimit-Limit", value);
            }
            response
                .headers_mut()
                .insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_quota_is_enforced_per_key() {
        let limiter = SlidingWindowLimiter::new(5, Duration::from_secs(300));

        for i in 0..5 {
            let remaining = limiter.admit("ip:10.0.0.1").await.unwrap();
            assert_eq!(remaining, 4 - i);
        }
        let retry_after = limiter.admit("ip:10.0.0.1").await.unwrap_err();
        assert!(retry_after >= Duration::from_secs(1));

        // A different source is unaffected.
        assert!(limiter.admit("ip:10.0.0.2").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_millis(200));

        limiter.admit("ip:10.0.0.1").await.unwrap();
        limiter.admit("ip:10.0.0.1").await.unwrap();
        assert!(limiter.admit("ip:10.0.0.1").await.is_err());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(
            limiter.admit("ip:10.0.0.1").await.is_ok(),
            "admissions outside the window must not count"
        );
    }

    #[tokio::test]
    async fn test_fresh_process_starts_at_zero() {
        // No persistence: a new limiter has no memory of prior admissions.
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(300));
        assert!(limiter.admit("ip:10.0.0.1").await.is_ok());
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(300));
        assert!(limiter.admit("ip:10.0.0.1").await.is_ok());
    }
}
