// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for contact submissions.
//!
//! Each client key owns a window that opens on its first request and lasts
//! `window_secs`. Up to `max_requests` points can be consumed inside the
//! window; after that every request is refused until the window expires.
//!
//! The handler only depends on [`RateLimitStore`], so the in-memory table
//! can be swapped for a shared store when several instances run behind a
//! load balancer.

use crate::config::RateLimitConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Failure of the backing store itself, not a refusal.
#[derive(Debug, Error)]
pub enum LimiterError {
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Capability to consume one point for a client key.
#[async_trait]
pub trait RateLimitStore: Send + Sync + 'static {
    /// Consume one point from `key`'s current window.
    async fn consume(&self, key: &str) -> Result<RateLimitResult, LimiterError>;
}

/// Counter for one client key.
#[derive(Debug)]
struct Window {
    /// Points consumed in this window
    consumed: u32,
    /// When the window expires
    resets_at: Instant,
}

/// Thread-safe in-process rate limiter.
pub struct InMemoryRateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-key windows
    windows: Arc<RwLock<HashMap<String, Window>>>,
}

impl InMemoryRateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }

    /// Drop expired windows (should be called periodically).
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, window| now < window.resets_at);
        let removed = before - windows.len();
        if removed > 0 {
            debug!(removed, remaining = windows.len(), "Expired rate limit windows removed");
        }
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn consume(&self, key: &str) -> Result<RateLimitResult, LimiterError> {
        let now = Instant::now();
        let window_duration = self.config.window_duration();

        // Check and update under one write lock
        let mut windows = self.windows.write().await;
        let window = windows.entry(key.to_string()).or_insert_with(|| Window {
            consumed: 0,
            resets_at: now + window_duration,
        });

        if now >= window.resets_at {
            window.consumed = 0;
            window.resets_at = now + window_duration;
        }

        let reset_in = window.resets_at.saturating_duration_since(now);

        if window.consumed >= self.config.max_requests {
            debug!(key, retry_after_secs = reset_in.as_secs(), "Client rate limit exceeded");
            return Ok(RateLimitResult::Limited {
                retry_after: reset_in,
            });
        }

        window.consumed += 1;
        Ok(RateLimitResult::Allowed {
            remaining: self.config.max_requests - window.consumed,
            reset_in,
        })
    }
}
