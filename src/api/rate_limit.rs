//! Per-client fixed-window request limiting for the `/api` routes.

use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use dashmap::DashMap;
use tracing::{debug, warn};
use crate::api::auth::{peer_ip, ANONYMOUS_CLIENT, CLIENT_ID_HEADER};
use crate::api::{ApiContext, ApiError};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Clone, Debug)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, key: &str) -> RateLimitResult {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitResult {
        let mut window = self.windows.entry(key.to_string())
            .or_insert(Window { started: now, hits: 0 });
        if now.duration_since(window.started) >= self.window {
            *window = Window { started: now, hits: 0 };
        }
        if window.hits >= self.max_requests {
            let retry_after = self.window.saturating_sub(now.duration_since(window.started));
            return RateLimitResult::Limited { retry_after };
        }
        window.hits += 1;
        RateLimitResult::Allowed { remaining: self.max_requests - window.hits }
    }

    /// Drops windows that have already expired.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.windows.retain(|_, x| now.duration_since(x.started) < self.window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn start_cleanup_task(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                self.cleanup();
                debug!("Rate limiter tracks {} clients", self.tracked_clients());
            }
        })
    }
}

/// Counts the request against its client: the peer IP when known, else the
/// `x-client-id` header.
pub async fn enforce_rate_limit(
    ctx: Extension<ApiContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !req.uri().path().starts_with("/api/") {
        return Ok(next.run(req).await);
    }
    let (parts, body) = req.into_parts();
    let key = peer_ip(&parts)
        .or_else(|| parts.headers.get(CLIENT_ID_HEADER).and_then(|x| x.to_str().ok()).map(str::to_string))
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string());
    let req = Request::from_parts(parts, body);

    match ctx.limiter.check(&key) {
        RateLimitResult::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(ctx.limiter.max_requests()));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            Ok(response)
        }
        RateLimitResult::Limited { retry_after } => {
            warn!("Rate limit hit by {}, retry in {:?}", key, retry_after);
            Err(ApiError::TooManyRequests)
        }
    }
}
