// src/services/rate_limit.rs
//! Fixed-window request counter keyed by caller (client IP for tracking)

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct RateLimitState {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    fn new() -> Self {
        Self {
            count: 1,
            window_start: Instant::now(),
        }
    }

    fn reset(&mut self) {
        self.count = 1;
        self.window_start = Instant::now();
    }

    fn is_expired(&self, window: Duration) -> bool {
        self.window_start.elapsed() > window
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited { retry_after: u32 },
}

#[derive(Debug, Clone)]
pub struct RateLimitService {
    /// Requests allowed per window; 0 disables limiting
    limit: u32,
    window: Duration,
    rate_limiter: Arc<RwLock<HashMap<String, RateLimitState>>>,
}

impl RateLimitService {
    pub fn new(limit: u32, window_secs: u64) -> Self {
        info!(
            limit = limit,
            window_seconds = window_secs,
            enabled = limit > 0,
            "Initializing RateLimitService"
        );
        Self {
            limit,
            window: Duration::from_secs(window_secs.max(1)),
            rate_limiter: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Count one request for `key`
    pub async fn check(&self, key: &str) -> RateLimitResult {
        if !self.is_enabled() {
            return RateLimitResult::Allowed;
        }

        let mut limiter = self.rate_limiter.write().await;
        let state = match limiter.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RateLimitState::new());
                return RateLimitResult::Allowed;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        if state.is_expired(self.window) {
            state.reset();
            return RateLimitResult::Allowed;
        }

        if state.count >= self.limit {
            let elapsed = state.window_start.elapsed().as_secs();
            let retry_after = self.window.as_secs().saturating_sub(elapsed).max(1) as u32;
            debug!(key = %key, count = state.count, "Rate limit reached");
            return RateLimitResult::Limited { retry_after };
        }

        state.count += 1;
        RateLimitResult::Allowed
    }

    pub async fn log_violation(&self, key: &str, endpoint: &str) {
        warn!(key = %key, endpoint = %endpoint, "Rate limit violation detected");
    }

    /// Drop entries whose window has passed
    pub async fn cleanup_expired(&self) -> usize {
        let mut limiter = self.rate_limiter.write().await;
        let before = limiter.len();
        limiter.retain(|_, state| !state.is_expired(self.window));
        let removed = before - limiter.len();
        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired rate limit entries");
        }
        removed
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.rate_limiter.read().await.len()
    }
}
