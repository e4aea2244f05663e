//! Reusable retry policy with exponential backoff.
//!
//! Every call site that needs retries shares this one abstraction instead
//! of re-implementing backoff loops per function. The caller supplies a
//! retryable-error predicate and an on-retry callback for observability.

use std::future::Future;
use std::time::Duration;

/// Retry policy: maximum retries, base delay, and backoff multiplier.
///
/// `max_retries` counts re-attempts after the first try, so the default of
/// 3 allows up to 4 attempts total. The delay before retry `n` is
/// `base_delay * multiplier^(n-1)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            multiplier: 2,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay to sleep before the given retry (1-based).
    fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * self.multiplier.saturating_pow(retry.saturating_sub(1))
    }

    /// Run `op`, retrying while `is_retryable` holds and attempts remain.
    ///
    /// `on_retry(retry_number, &err)` fires before each re-attempt. The
    /// last error is returned once the budget is exhausted or a
    /// non-retryable error appears.
    pub async fn retry<T, E, F, Fut, P, C>(
        &self,
        mut is_retryable: P,
        mut on_retry: C,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(&E) -> bool,
        C: FnMut(u32, &E),
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.max_retries || !is_retryable(&err) {
                        return Err(err);
                    }
                    on_retry(attempt, &err);
                    tokio::time::sleep(self.delay_for(attempt)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fast policy so tests don't sleep for real.
    fn quick() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = quick()
            .retry(
                |_| true,
                |_, _| {},
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(42) }
                },
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_within_budget() {
        let calls = AtomicU32::new(0);
        let retries = AtomicU32::new(0);

        // Fails exactly twice, succeeds on the third attempt
        let result: Result<u32, &str> = quick()
            .retry(
                |_| true,
                |_, _| {
                    retries.fetch_add(1, Ordering::SeqCst);
                },
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n < 2 {
                            Err("timeout")
                        } else {
                            Ok(7)
                        }
                    }
                },
            )
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(retries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausts_budget() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = quick()
            .retry(
                |_| true,
                |_, _| {},
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("timeout") }
                },
            )
            .await;

        assert_eq!(result.unwrap_err(), "timeout");
        // 1 initial attempt + 3 retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = quick()
            .retry(
                |e: &&str| *e == "timeout",
                |_, _| {},
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("constraint violation") }
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }
}
