//! Sliding-window rate limiter for job starts.
//!
//! At most `max_starts` acquisitions succeed in any rolling `window`.
//! Independent of the worker concurrency bound.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Sliding-window limiter on job starts.
#[derive(Debug)]
pub struct RateLimiter {
    max_starts: usize,
    window: Duration,
    starts: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max_starts` per `window`.
    ///
    /// A `max_starts` of zero disables limiting.
    #[must_use]
    pub fn new(max_starts: usize, window: Duration) -> Self {
        Self {
            max_starts,
            window,
            starts: Mutex::new(VecDeque::new()),
        }
    }

    /// Take a slot if one is free.
    ///
    /// Returns `Ok(())` on success, or `Err(wait)` with the time until the
    /// oldest start leaves the window.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        if self.max_starts == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut starts = self.starts.lock();
        while starts
            .front()
            .is_some_and(|start| now.duration_since(*start) >= self.window)
        {
            starts.pop_front();
        }

        if starts.len() < self.max_starts {
            starts.push_back(now);
            return Ok(());
        }

        let oldest = starts.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }

    /// Wait until a slot is free and take it.
    pub async fn acquire(&self) {
        while let Err(wait) = self.try_acquire() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_max_in_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_ok());

        let wait = limiter.try_acquire().unwrap_err();
        assert!(wait <= Duration::from_secs(60));
        assert!(wait > Duration::from_secs(59));
        assert!(limiter.try_acquire().is_err());
    }

    #[test]
    fn zero_max_disables_limit() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        for _ in 0..1000 {
            assert!(limiter.try_acquire().is_ok());
        }
    }

    #[tokio::test]
    async fn slot_frees_after_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50));
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(limiter.try_acquire().is_err());

        let started = Instant::now();
        limiter.acquire().await;

        assert!(started.elapsed() >= Duration::from_millis(30));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
