//! Token bucket throttling tail reconnects.

use std::time::Duration;
use tokio::time::Instant;

/// Allows `burst` reconnects back-to-back, then one per `interval`.
#[derive(Debug, Clone)]
pub struct ReconnectLimiter {
    /// Current token count.
    tokens: u32,
    /// Maximum tokens.
    max_tokens: u32,
    /// Time per token.
    interval: Duration,
    /// Last refill timestamp.
    last_refill: Instant,
}

impl ReconnectLimiter {
    pub fn new(burst: u32, interval: Duration) -> Self {
        let max_tokens = burst.max(1);
        Self {
            tokens: max_tokens,
            max_tokens,
            interval: interval.max(Duration::from_millis(1)),
            last_refill: Instant::now(),
        }
    }

    /// Credit whole intervals elapsed since the last refill. Partial
    /// intervals carry over.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let earned = (elapsed.as_nanos() / self.interval.as_nanos()).min(u32::MAX as u128) as u32;

        if earned > 0 {
            self.tokens = self.tokens.saturating_add(earned).min(self.max_tokens);
            self.last_refill = if self.tokens == self.max_tokens {
                now
            } else {
                self.last_refill + self.interval * earned
            };
        }
    }

    /// Take a token if one is available.
    pub fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Time until the next token is available.
    pub fn retry_after(&self) -> Duration {
        if self.tokens > 0 {
            Duration::ZERO
        } else {
            (self.last_refill + self.interval).saturating_duration_since(Instant::now())
        }
    }

    /// Wait until a token can be taken, then take it.
    pub async fn acquire(&mut self) {
        while !self.try_acquire() {
            tokio::time::sleep(self.retry_after()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_throttle() {
        let mut limiter = ReconnectLimiter::new(3, Duration::from_secs(15));

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.retry_after(), Duration::from_secs(15));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(!limiter.try_acquire());
        assert_eq!(limiter.retry_after(), Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_caps_at_burst() {
        let mut limiter = ReconnectLimiter::new(3, Duration::from_secs(15));
        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }

        tokio::time::advance(Duration::from_secs(600)).await;

        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_interval_carries_over() {
        let mut limiter = ReconnectLimiter::new(2, Duration::from_secs(15));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());

        tokio::time::advance(Duration::from_secs(20)).await;
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        // 5s of the last 20s counts toward the next token.
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_token() {
        let mut limiter = ReconnectLimiter::new(1, Duration::from_secs(15));
        let start = Instant::now();

        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(15));
    }
}
