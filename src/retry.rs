use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::{Error, Result, warning};

/// Upper bound for a server supplied `Retry-After`.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(120);

/// Bounded retry with exponential backoff for transient API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Single attempt, no sleeping. Handy for tests and one-shot commands.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or
    /// `max_attempts` is used up. The last error is returned.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = match e {
                        Error::RateLimited(Some(retry_after)) => retry_after.min(MAX_RETRY_AFTER),
                        _ => self.backoff(attempt),
                    };
                    warning!(
                        "{} (attempt {}/{}), retrying in {}s",
                        e,
                        attempt,
                        self.max_attempts,
                        delay.as_secs()
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
        };
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(5));
        assert_eq!(policy.backoff(40), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_run_retries_transient_errors() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        };
        let mut calls = 0;
        let result = policy
            .run(|| {
                calls += 1;
                let current = calls;
                async move {
                    if current < 3 {
                        Err(Error::Fetch("connection reset".to_string()))
                    } else {
                        Ok(current)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        };
        let mut calls = 0;
        let result: Result<()> = policy
            .run(|| {
                calls += 1;
                async { Err(Error::Fetch("timeout".to_string())) }
            })
            .await;
        assert!(matches!(result, Err(Error::Fetch(_))));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_fatal_errors() {
        let mut calls = 0;
        let result: Result<()> = RetryPolicy::with_max_attempts(5)
            .run(|| {
                calls += 1;
                async { Err(Error::Auth("token revoked".to_string())) }
            })
            .await;
        assert!(matches!(result, Err(Error::Auth(_))));
        assert_eq!(calls, 1);
    }

    /// Fails with `first` once, then succeeds. Returns the paused-clock time spent.
    async fn elapsed_after(first: Error) -> Duration {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
        };
        let mut pending = Some(first);
        let start = tokio::time::Instant::now();
        policy
            .run(|| {
                let outcome = pending.take();
                async move {
                    match outcome {
                        Some(e) => Err(e),
                        None => Ok(()),
                    }
                }
            })
            .await
            .unwrap();
        start.elapsed()
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_for_retry_after() {
        let elapsed = elapsed_after(Error::RateLimited(Some(Duration::from_secs(7)))).await;
        assert!(elapsed >= Duration::from_secs(7), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(8), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_caps_retry_after() {
        let elapsed = elapsed_after(Error::RateLimited(Some(Duration::from_secs(500)))).await;
        assert!(elapsed >= MAX_RETRY_AFTER, "{:?}", elapsed);
        assert!(elapsed < MAX_RETRY_AFTER + Duration::from_secs(1), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_backs_off_without_retry_after() {
        let elapsed = elapsed_after(Error::RateLimited(None)).await;
        assert!(elapsed >= Duration::from_secs(2), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_run_does_not_retry_rejected_requests() {
        let mut calls = 0;
        let result: Result<()> = RetryPolicy::with_max_attempts(5)
            .run(|| {
                calls += 1;
                async { Err(Error::Rejected("404 Not Found".to_string())) }
            })
            .await;
        assert!(matches!(result, Err(Error::Rejected(_))));
        assert_eq!(calls, 1);
    }
}
