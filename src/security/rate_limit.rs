//! Sliding-window rate limiting for form submissions
//!
//! Attempts are recorded per identifier (a form name, optionally combined
//! with a visitor key). An identifier may make `max_attempts` attempts in any
//! window of `window` length; further attempts are rejected without being
//! recorded, so a rejected visitor is not locked out any longer.
//!
//! # Memory
//!
//! Every `cleanup_interval` calls, identifiers whose attempts have all left
//! the window are dropped. The number of tracked identifiers never exceeds
//! `max_tracked_keys`: a new identifier arriving at the cap forces a cleanup
//! and is rejected if the cap is still reached.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Configuration for the rate limiter
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed per window
    pub max_attempts: usize,

    /// Length of the sliding window
    pub window: Duration,

    /// Hard cap on tracked identifiers
    pub max_tracked_keys: usize,

    /// Run cleanup every N calls
    pub cleanup_interval: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::from_secs(10 * 60),
            max_tracked_keys: 10_000,
            cleanup_interval: 100,
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            ..Default::default()
        }
    }
}

/// In-memory sliding-window rate limiter
pub struct RateLimiter {
    config: RateLimitConfig,
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
    calls: AtomicU64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            attempts: Mutex::new(HashMap::new()),
            calls: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        self.attempts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record an attempt for `identifier` if it is within its allowance
    pub fn is_allowed(&self, identifier: &str) -> bool {
        self.is_allowed_at(identifier, Instant::now())
    }

    /// [`is_allowed`](Self::is_allowed) with an explicit clock reading
    pub fn is_allowed_at(&self, identifier: &str, now: Instant) -> bool {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if call > 0 && self.config.cleanup_interval > 0 && call % self.config.cleanup_interval == 0
        {
            debug!("running periodic rate limiter cleanup after {} calls", call);
            self.cleanup_at(now);
        }

        let mut attempts = self.lock();

        if !attempts.contains_key(identifier) && attempts.len() >= self.config.max_tracked_keys {
            debug!(
                "{} identifiers tracked, forcing cleanup",
                self.config.max_tracked_keys
            );
            self.retain_live(&mut attempts, now);
            if attempts.len() >= self.config.max_tracked_keys {
                warn!("rate limiter full, rejecting new identifier {}", identifier);
                return false;
            }
        }

        let window = self.config.window;
        let entry = attempts.entry(identifier.to_string()).or_default();
        entry.retain(|t| now.saturating_duration_since(*t) < window);

        if entry.len() >= self.config.max_attempts {
            warn!(
                "rate limit exceeded for {} ({} attempts in {:?})",
                identifier,
                entry.len(),
                window
            );
            return false;
        }

        entry.push(now);
        true
    }

    /// Time until `identifier` may try again; zero when it is not limited
    pub fn remaining_time(&self, identifier: &str) -> Duration {
        self.remaining_time_at(identifier, Instant::now())
    }

    /// [`remaining_time`](Self::remaining_time) with an explicit clock reading
    pub fn remaining_time_at(&self, identifier: &str, now: Instant) -> Duration {
        let attempts = self.lock();
        let window = self.config.window;
        let live: Vec<&Instant> = match attempts.get(identifier) {
            Some(times) => times
                .iter()
                .filter(|t| now.saturating_duration_since(**t) < window)
                .collect(),
            None => return Duration::ZERO,
        };

        if live.len() < self.config.max_attempts {
            return Duration::ZERO;
        }

        live.into_iter()
            .min()
            .map(|oldest| window.saturating_sub(now.saturating_duration_since(*oldest)))
            .unwrap_or(Duration::ZERO)
    }

    /// Drop identifiers with no attempts left in the window
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    pub fn cleanup_at(&self, now: Instant) {
        let mut attempts = self.lock();
        self.retain_live(&mut attempts, now);
    }

    fn retain_live(&self, attempts: &mut HashMap<String, Vec<Instant>>, now: Instant) {
        let window = self.config.window;
        let before = attempts.len();
        attempts.retain(|_, times| {
            times.retain(|t| now.saturating_duration_since(*t) < window);
            !times.is_empty()
        });
        let removed = before - attempts.len();
        if removed > 0 {
            debug!("rate limiter cleanup removed {} identifiers", removed);
        }
    }

    /// Number of identifiers currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
