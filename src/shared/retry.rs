use std::future::Future;
use std::time::Duration;

use crate::modules::discord::PlatformError;

/// Bounded exponential backoff for platform calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn delay_for(&self, attempt: u32, err: &PlatformError) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        match err.retry_after() {
            Some(hint) if hint > exponential => hint,
            _ => exponential,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    op: F,
) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    retry_with_backoff_when(policy, label, PlatformError::is_retryable, op).await
}

/// Like `retry_with_backoff`, but only errors accepted by `should_retry` are
/// sent again. Non-idempotent calls pass `PlatformError::is_rate_limited` so
/// a request the platform may already have applied is never repeated.
pub async fn retry_with_backoff_when<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    should_retry: fn(&PlatformError) -> bool,
    mut op: F,
) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if should_retry(&err) && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt, &err);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    label,
                    attempt,
                    policy.max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let err = PlatformError::Timeout;
        assert_eq!(policy.delay_for(1, &err), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2, &err), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3, &err), Duration::from_millis(4000));
    }

    #[test]
    fn test_delay_honors_larger_retry_after() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let err = PlatformError::RateLimited {
            retry_after_ms: 2500,
        };
        assert_eq!(policy.delay_for(1, &err), Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn test_rate_limited_call_succeeds_on_third_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff(&fast_policy(), "send_message", move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(PlatformError::RateLimited { retry_after_ms: 1 })
            } else {
                Ok(n)
            }
        })
        .await;

        let value = tokio_test::assert_ok!(result);
        assert_eq!(value, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_forbidden_is_returned_without_retry() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> =
            retry_with_backoff(&fast_policy(), "delete_channel", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PlatformError::Forbidden("Missing Permissions".to_string()))
            })
            .await;

        assert!(matches!(result, Err(PlatformError::Forbidden(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> =
            retry_with_backoff(&fast_policy(), "fetch_channel", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PlatformError::Server {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(PlatformError::Server { status: 503, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_only_policy_does_not_resend_after_timeout() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry_with_backoff_when(
            &fast_policy(),
            "create_channel",
            PlatformError::is_rate_limited,
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PlatformError::Timeout)
            },
        )
        .await;

        assert!(matches!(result, Err(PlatformError::Timeout)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_only_policy_still_waits_out_429() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_with_backoff_when(
            &fast_policy(),
            "send_message",
            PlatformError::is_rate_limited,
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 2 {
                    Err(PlatformError::RateLimited { retry_after_ms: 1 })
                } else {
                    Ok(n)
                }
            },
        )
        .await;

        assert_eq!(tokio_test::assert_ok!(result), 2);
    }
}
