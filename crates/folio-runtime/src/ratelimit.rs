//! In-memory fixed-window rate limiter for tool calls.
//!
//! Each key gets an independent window holding a request count and a reset
//! deadline. When the count reaches `max_requests` the call is rejected until
//! the window expires.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for the rate limiter.
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// Requests admitted per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_millis(60_000),
        }
    }
}

impl From<&folio_config::RateLimitConfig> for WindowConfig {
    fn from(config: &folio_config::RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_millis(config.window_ms),
        }
    }
}

/// The window for a single key.
#[derive(Debug, Clone)]
struct Window {
    count: u32,
    reset_at: Instant,
}

impl Window {
    fn new(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + window,
        }
    }

    /// Roll over if expired, then try to admit one request.
    fn try_admit(&mut self, now: Instant, config: &WindowConfig) -> bool {
        if now > self.reset_at {
            *self = Window::new(now, config.window);
        }
        if self.count >= config.max_requests {
            false
        } else {
            self.count += 1;
            true
        }
    }

    /// Whole seconds until the window resets, at least 1.
    fn retry_after(&self, now: Instant) -> u64 {
        let remaining = self.reset_at.saturating_duration_since(now);
        remaining.as_secs_f64().ceil().max(1.0) as u64
    }
}

/// Shared state for the rate limiter, keyed by an opaque string.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Window>>,
    config: WindowConfig,
}

impl RateLimiter {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Try to admit a request for `key`. Returns Ok(()) if allowed,
    /// or Err(retry_after_secs) if rate limited.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now, self.config.window));
        if entry.try_admit(now, &self.config) {
            Ok(())
        } else {
            Err(entry.retry_after(now))
        }
    }

    /// Requests left in the current window for `key`.
    pub fn remaining(&self, key: &str) -> u32 {
        let now = Instant::now();
        match self.windows.get(key) {
            Some(w) if now <= w.reset_at => self.config.max_requests.saturating_sub(w.count),
            _ => self.config.max_requests,
        }
    }

    /// Evict expired windows.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.windows.retain(|_key, window| window.reset_at >= now);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_ms: u64) -> RateLimiter {
        RateLimiter::new(WindowConfig {
            max_requests,
            window: Duration::from_millis(window_ms),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_admits_max_requests() {
        let limiter = limiter(3, 1_000);
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_ok());
        // 4th should be denied
        assert!(limiter.check("a").is_err());
        assert_eq!(limiter.remaining("a"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_keys_independent() {
        let limiter = limiter(1, 60_000);
        assert!(limiter.check("s1|ua").is_ok());
        assert!(limiter.check("s1|ua").is_err());
        // another key should still be allowed
        assert!(limiter.check("s2|ua").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_value() {
        let limiter = limiter(1, 5_000);
        limiter.check("a").unwrap();
        tokio::time::advance(Duration::from_millis(1_500)).await;
        let retry = limiter.check("a").unwrap_err();
        assert_eq!(retry, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_recovers() {
        let limiter = limiter(2, 1_000);
        limiter.check("a").unwrap();
        limiter.check("a").unwrap();
        assert!(limiter.check("a").is_err());
        tokio::time::advance(Duration::from_millis(1_001)).await;
        assert!(limiter.check("a").is_ok());
        assert_eq!(limiter.remaining("a"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_removes_expired() {
        let limiter = limiter(10, 1_000);
        limiter.check("a").unwrap();
        assert_eq!(limiter.tracked_keys(), 1);
        // cleanup won't remove live windows
        limiter.cleanup();
        assert_eq!(limiter.tracked_keys(), 1);
        tokio::time::advance(Duration::from_millis(2_000)).await;
        limiter.cleanup();
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_default_config() {
        let config = WindowConfig::default();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window, Duration::from_secs(60));
    }
}
