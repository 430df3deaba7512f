// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-client fixed-window rate limiting.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::error::AppError;
use crate::AppState;

const WINDOW: Duration = Duration::from_secs(60);

/// Bucket key used when no client address is known.
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of admitting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32, reset_after_secs: u64 },
    Limited { retry_after_secs: u64 },
}

/// Fixed-window request counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// `max_requests` per minute; 0 disables limiting.
    pub fn new(max_requests: u32) -> Self {
        Self::with_window(max_requests, WINDOW)
    }

    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }

    /// Count one request from `client` at `now`.
    pub fn admit_at(&self, client: &str, now: Instant) -> Admission {
        let mut entry = self.windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let mut elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.count = 0;
            elapsed = Duration::ZERO;
        }

        let reset_after_secs = self.window.saturating_sub(elapsed).as_secs().max(1);
        if entry.count >= self.max_requests {
            return Admission::Limited {
                retry_after_secs: reset_after_secs,
            };
        }

        entry.count += 1;
        Admission::Allowed {
            remaining: self.max_requests - entry.count,
            reset_after_secs,
        }
    }

    pub fn admit(&self, client: &str) -> Admission {
        self.admit_at(client, Instant::now())
    }

    /// Drop windows that ended long ago.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        let expiry = self.window * 2;
        self.windows
            .retain(|_, window| now.saturating_duration_since(window.started) < expiry);
    }
}

/// Client address: last `X-Forwarded-For` entry, the one our front-end
/// proxy appended, else the socket peer. Earlier entries are caller-supplied.
fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.rsplit(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Reject requests over the per-client budget with 429.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = &state.rate_limiter;
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let client = client_key(&request);
    match limiter.admit(&client) {
        Admission::Allowed {
            remaining,
            reset_after_secs,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("RateLimit-Limit", HeaderValue::from(limiter.limit()));
            headers.insert("RateLimit-Remaining", HeaderValue::from(remaining));
            headers.insert("RateLimit-Reset", HeaderValue::from(reset_after_secs));
            response
        }
        Admission::Limited { retry_after_secs } => {
            tracing::warn!(client = %client, retry_after_secs, "Rate limit exceeded");
            AppError::TooManyRequests { retry_after_secs }.into_response()
        }
    }
}
