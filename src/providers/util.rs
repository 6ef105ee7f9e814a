use crate::core::clock::Clock;
use crate::core::error::UpstreamError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Outcome of a single upstream attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Ready(T),
    /// Failed; wait `delay` before the next attempt if any budget remains
    Retry {
        cause: UpstreamError,
        delay: Duration,
    },
}

/// Runs `operation` until it is ready or `max_attempts` attempts are used.
///
/// # Parameters
/// - `clock`: source of the backoff sleeps
/// - `max_attempts`: total attempts, including the first (at least 1)
/// - `operation`: closure receiving the zero-based attempt index
///
/// # Returns
/// The ready value, or the cause of the last failed attempt. No delay
/// follows the final attempt.
pub async fn with_retry<F, Fut, T>(
    clock: &dyn Clock,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, UpstreamError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Attempt::Ready(val) => return Ok(val),
            Attempt::Retry { cause, delay } => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(cause);
                }
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %cause,
                    "Attempt failed, retrying"
                );
                clock.sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_ready_on_first_attempt_never_sleeps() {
        let clock = ManualClock::default();
        let result = with_retry(&clock, 3, |_| async { Attempt::Ready(7) }).await;

        assert_eq!(result, Ok(7));
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_budget_returns_last_cause() {
        let clock = ManualClock::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&clock, 3, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Attempt::Retry {
                    cause: UpstreamError::transient("test", format!("attempt {attempt}")),
                    delay: Duration::from_millis(100),
                }
            }
        })
        .await;

        assert_eq!(
            result,
            Err(UpstreamError::transient("test", "attempt 2"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(100); 2]);
    }

    #[tokio::test]
    async fn test_rate_limit_and_transient_share_budget() {
        let clock = ManualClock::default();

        let result = with_retry(&clock, 3, |attempt| async move {
            match attempt {
                0 => Attempt::Retry {
                    cause: UpstreamError::RateLimitExceeded { provider: "test" },
                    delay: Duration::from_secs(30),
                },
                1 => Attempt::Retry {
                    cause: UpstreamError::transient("test", "missing entry"),
                    delay: Duration::from_secs(5),
                },
                _ => Attempt::Ready("ok"),
            }
        })
        .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(30), Duration::from_secs(5)]
        );
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let clock = ManualClock::default();
        let calls = AtomicU32::new(0);

        let result = with_retry(&clock, 0, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Attempt::Ready(()) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
