//! Fixed-delay pacing for source reads

use crate::domain::{Result, SheetPipeError};
use std::time::Duration;

/// Waits a fixed delay after every row read
///
/// There is no backoff and no jitter; the delay only keeps the read rate under
/// the source's request quota. A zero delay disables pacing.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Create from a delay in (fractional) seconds
    ///
    /// # Errors
    ///
    /// Returns a configuration error for negative or non-finite delays.
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        Duration::try_from_secs_f64(secs)
            .map(Self::new)
            .map_err(|_| {
                SheetPipeError::Configuration(format!(
                    "rate limit delay must be a non-negative number of seconds, got {secs}"
                ))
            })
    }

    /// A limiter that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Block the calling flow for the configured delay
    pub async fn wait_turn(&self) {
        if self.delay.is_zero() {
            return;
        }
        tokio::time::sleep(self.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_from_secs() {
        let limiter = RateLimiter::from_secs_f64(2.7).unwrap();
        assert_eq!(limiter.delay(), Duration::from_millis(2700));
    }

    #[test]
    fn test_invalid_delays_rejected() {
        assert!(RateLimiter::from_secs_f64(-0.5).is_err());
        assert!(RateLimiter::from_secs_f64(f64::NAN).is_err());
        assert!(RateLimiter::from_secs_f64(f64::INFINITY).is_err());
    }

    #[tokio::test]
    async fn test_wait_turn_sleeps_for_delay() {
        let limiter = RateLimiter::new(Duration::from_millis(30));
        let start = Instant::now();
        limiter.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_disabled_does_not_wait() {
        let limiter = RateLimiter::disabled();
        let start = Instant::now();
        for _ in 0..100 {
            limiter.wait_turn().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
