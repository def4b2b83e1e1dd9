//! Per-client rate limiter using the governor crate.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};

use quill_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Idle keys are swept once every this many checks.
const SWEEP_EVERY: u64 = 256;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window, per key.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        let period = self.window / burst.get();
        Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

/// Keyed GCRA limiter. Limits are per-process, not shared across instances.
pub struct InMemoryRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
    checks: AtomicU64,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = config.quota();
        tracing::debug!(
            max_requests = config.max_requests,
            window_secs = config.window.as_secs(),
            "Rate limiter configured"
        );
        Self {
            limiter: DefaultKeyedRateLimiter::<String>::keyed(quota),
            clock: DefaultClock::default(),
            checks: AtomicU64::new(0),
        }
    }

    /// Number of client keys currently held.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Forget keys whose budget has fully refilled.
    fn sweep_if_due(&self) {
        let seen = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % SWEEP_EVERY == 0 {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
            tracing::trace!(keys = self.limiter.len(), "Swept idle rate limit keys");
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let result = match self.limiter.check_key(&key.to_string()) {
            Ok(()) => RateLimitResult {
                allowed: true,
                retry_after: Duration::ZERO,
            },
            Err(not_until) => RateLimitResult {
                allowed: false,
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        };

        self.sweep_if_due();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn budget_is_per_key() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        });

        assert!(limiter.check("1.2.3.4").await.unwrap().allowed);
        assert!(limiter.check("1.2.3.4").await.unwrap().allowed);

        let third = limiter.check("1.2.3.4").await.unwrap();
        assert!(!third.allowed);
        assert!(third.retry_after > Duration::ZERO);

        assert!(limiter.check("5.6.7.8").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn idle_keys_are_swept_periodically() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(1),
        });

        for i in 0..SWEEP_EVERY - 1 {
            limiter.check(&format!("client-{i}")).await.unwrap();
        }
        assert_eq!(limiter.tracked_keys(), (SWEEP_EVERY - 1) as usize);

        tokio::time::sleep(Duration::from_millis(20)).await;
        limiter.check("latest").await.unwrap();

        assert!(limiter.tracked_keys() <= 1);
    }

    #[test]
    fn zero_requests_still_yields_a_quota() {
        let config = RateLimitConfig {
            max_requests: 0,
            window: Duration::ZERO,
        };
        assert_eq!(config.quota().burst_size().get(), 1);
    }
}
