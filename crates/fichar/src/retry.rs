//! Bounded retry with linear backoff.
//!
//! One-shot runs wrap the whole login+action cycle here. The operation is
//! handed the attempt number and builds everything it needs from scratch, so
//! every retry gets a fresh browser session.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::result::FicharResult;

/// Retry policy for one-shot runs
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Base delay; attempt N waits N times this
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Linear backoff: 10s after the first failure, 20s after the second, ...
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Run `op` until it succeeds or the attempt bound is exhausted, propagating
/// the last error.
pub async fn run_with_retries<T, F, Fut>(policy: RetryPolicy, mut op: F) -> FicharResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = FicharResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        info!(attempt, max = attempts, "starting attempt");
        match op(attempt).await {
            Ok(value) => {
                info!(attempt, "attempt succeeded");
                return Ok(value);
            }
            Err(err) if attempt < attempts => {
                let delay = policy.delay_after(attempt);
                warn!(attempt, %err, delay_s = delay.as_secs(), "attempt failed, waiting before retry");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(attempt, %err, "all attempts exhausted");
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::FicharError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_with_linear_backoff() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&starts);
        let op = move |attempt: u32| {
            log.lock().unwrap().push(Instant::now());
            async move {
                if attempt >= 3 {
                    Ok(attempt)
                } else {
                    Err(FicharError::login("scripted failure"))
                }
            }
        };

        let result = run_with_retries(RetryPolicy::default(), op).await.unwrap();
        assert_eq!(result, 3);

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts[1] - starts[0], Duration::from_secs(10));
        assert_eq!(starts[2] - starts[1], Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_makes_exactly_three_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let op = move |_attempt: u32| {
            let calls = Arc::clone(&counter);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(FicharError::login("scripted failure"))
            }
        };

        let err = run_with_retries(RetryPolicy::default(), op).await.unwrap_err();
        assert!(matches!(err, FicharError::LoginFailure { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_success_never_sleeps() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let op = move |attempt: u32| {
            let calls = Arc::clone(&counter);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(attempt)
            }
        };

        let start = Instant::now();
        run_with_retries(RetryPolicy::default(), op).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempt_policy_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            base_delay: Duration::from_secs(10),
        };
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let op = move |attempt: u32| {
            let calls = Arc::clone(&counter);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(attempt)
            }
        };

        run_with_retries(policy, op).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
