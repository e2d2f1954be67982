//! Bounded retry with a fixed or computed delay.
//!
//! Every network-facing call in the client goes through [`with_retry`]:
//! indexer pages, creation-receipt lookups and the external wallet's
//! receipt polling. There is no jitter and no overall deadline; the
//! worst case wall time is `retry_count * max(delay)`.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::sleep;

use crate::config::RetryConfig;

/// Delay applied before the next attempt.
pub enum RetryDelay<E> {
    /// Fixed delay in milliseconds. Zero skips the wait.
    Fixed(u64),
    /// Delay computed from the attempt index and the error that caused it.
    Computed(Arc<dyn Fn(u32, &E) -> u64 + Send + Sync>),
}

/// Predicate deciding whether a failed attempt is retried.
pub enum ShouldRetry<E> {
    /// Retry every failure until the count is exhausted.
    Always,
    Sync(Arc<dyn Fn(u32, &E) -> bool + Send + Sync>),
    Async(Arc<dyn Fn(u32, &E) -> BoxFuture<'static, bool> + Send + Sync>),
}

/// Retry settings for a single call site.
pub struct RetryPolicy<E> {
    delay: RetryDelay<E>,
    retry_count: u32,
    should_retry: ShouldRetry<E>,
}

impl<E> RetryPolicy<E> {
    /// Default policy: 2 retries, 100ms apart, every error retried.
    pub fn new() -> Self {
        Self {
            delay: RetryDelay::Fixed(100),
            retry_count: 2,
            should_retry: ShouldRetry::Always,
        }
    }

    /// Policy that runs the operation exactly once.
    pub fn no_retry() -> Self {
        Self::new().retry_count(0).delay_ms(0)
    }

    /// Set the maximum number of attempts after the first failure.
    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Set a fixed delay in milliseconds.
    pub fn delay_ms(mut self, delay: u64) -> Self {
        self.delay = RetryDelay::Fixed(delay);
        self
    }

    /// Compute the delay from the attempt index and the error.
    pub fn delay_fn(mut self, f: impl Fn(u32, &E) -> u64 + Send + Sync + 'static) -> Self {
        self.delay = RetryDelay::Computed(Arc::new(f));
        self
    }

    /// Only retry when `f` approves.
    pub fn should_retry(mut self, f: impl Fn(u32, &E) -> bool + Send + Sync + 'static) -> Self {
        self.should_retry = ShouldRetry::Sync(Arc::new(f));
        self
    }

    /// Only retry when the future returned by `f` resolves to `true`.
    pub fn should_retry_async(
        mut self,
        f: impl Fn(u32, &E) -> BoxFuture<'static, bool> + Send + Sync + 'static,
    ) -> Self {
        self.should_retry = ShouldRetry::Async(Arc::new(f));
        self
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.retry_count
    }

    fn delay_for(&self, attempt: u32, error: &E) -> u64 {
        match &self.delay {
            RetryDelay::Fixed(ms) => *ms,
            RetryDelay::Computed(f) => f(attempt, error),
        }
    }

    async fn approves(&self, attempt: u32, error: &E) -> bool {
        match &self.should_retry {
            ShouldRetry::Always => true,
            ShouldRetry::Sync(f) => f(attempt, error),
            ShouldRetry::Async(f) => f(attempt, error).await,
        }
    }
}

impl<E> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            delay: match &self.delay {
                RetryDelay::Fixed(ms) => RetryDelay::Fixed(*ms),
                RetryDelay::Computed(f) => RetryDelay::Computed(Arc::clone(f)),
            },
            retry_count: self.retry_count,
            should_retry: match &self.should_retry {
                ShouldRetry::Always => ShouldRetry::Always,
                ShouldRetry::Sync(f) => ShouldRetry::Sync(Arc::clone(f)),
                ShouldRetry::Async(f) => ShouldRetry::Async(Arc::clone(f)),
            },
        }
    }
}

impl<E> std::fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let delay = match &self.delay {
            RetryDelay::Fixed(ms) => format!("{ms}ms"),
            RetryDelay::Computed(_) => "computed".to_string(),
        };
        f.debug_struct("RetryPolicy")
            .field("retry_count", &self.retry_count)
            .field("delay", &delay)
            .finish_non_exhaustive()
    }
}

impl<E> From<&RetryConfig> for RetryPolicy<E> {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new()
            .retry_count(config.retry_count)
            .delay_ms(config.delay_ms)
    }
}

/// Execute an operation, retrying failures according to `policy`.
///
/// Attempt indexes start at 0. A failure at attempt `n` is retried when
/// `n < retry_count` and the policy's predicate approves; otherwise the
/// error is returned as-is.
pub async fn with_retry<F, Fut, T, E>(mut operation: F, policy: &RetryPolicy<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.retry_count || !policy.approves(attempt, &e).await {
                    if attempt > 0 {
                        tracing::warn!(attempts = attempt + 1, error = %e, "Operation failed");
                    }
                    return Err(e);
                }

                let delay = policy.delay_for(attempt, &e);
                tracing::debug!(
                    attempt = attempt,
                    delay_ms = delay,
                    error = %e,
                    "Retrying after error"
                );

                if delay > 0 {
                    sleep(Duration::from_millis(delay)).await;
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast<E>(retries: u32) -> RetryPolicy<E> {
        RetryPolicy::new().retry_count(retries).delay_ms(1)
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_first_try() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, String> = with_retry(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            },
            &RetryPolicy::new(),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failures() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, String> = with_retry(
            || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(format!("failure {attempt}"))
                    } else {
                        Ok(42)
                    }
                }
            },
            &fast(3),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_max_retries_exceeded() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, String> = with_retry(
            || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {attempt}")) }
            },
            &fast(4),
        )
        .await;

        // Initial attempt + 4 retries = 5 attempts, last error wins
        assert_eq!(result.unwrap_err(), "failure 4");
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_no_retry_policy_runs_once() {
        let attempts = AtomicU32::new(0);

        let result: Result<u32, String> = with_retry(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("nope".to_string()) }
            },
            &RetryPolicy::no_retry(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_predicate_stops_retries() {
        let attempts = AtomicU32::new(0);
        let policy = fast(5).should_retry(|_, e: &String| e != "fatal");

        let result: Result<u32, String> = with_retry(
            || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err("transient".to_string())
                    } else {
                        Err("fatal".to_string())
                    }
                }
            },
            &policy,
        )
        .await;

        assert_eq!(result.unwrap_err(), "fatal");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_async_predicate() {
        let attempts = AtomicU32::new(0);
        let policy = fast(5).should_retry_async(|attempt, _: &String| {
            async move { attempt < 1 }.boxed()
        });

        let result: Result<u32, String> = with_retry(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("down".to_string()) }
            },
            &policy,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_computed_delay_sees_attempt_index() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let policy = RetryPolicy::new().retry_count(3).delay_fn(move |attempt, _: &String| {
            recorder.lock().unwrap().push(attempt);
            0
        });

        let _: Result<(), String> =
            with_retry(|| async { Err("down".to_string()) }, &policy).await;

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_policy_from_config() {
        let policy: RetryPolicy<String> = RetryPolicy::from(&RetryConfig {
            retry_count: 7,
            delay_ms: 250,
        });
        assert_eq!(policy.max_retries(), 7);
        assert!(format!("{policy:?}").contains("250ms"));
    }
}
