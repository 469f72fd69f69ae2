//! Bounded retry with exponential backoff.
//!
//! Attempts are strictly sequential. After a failed attempt with index `i`
//! (zero-based) the policy sleeps `base_delay * 2^i` before trying again. There
//! is no jitter and no cap.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Async sleeping abstraction so tests can observe backoff without waiting.
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    ///
    /// ```rust,no_run
    /// use async_trait::async_trait;
    /// use rocktags::domain::RetrySleeper;
    /// use std::sync::Mutex;
    /// use std::time::Duration;
    ///
    /// #[derive(Default)]
    /// struct CountingSleeper {
    ///     calls: Mutex<u32>,
    /// }
    ///
    /// #[async_trait]
    /// impl RetrySleeper for CountingSleeper {
    ///     async fn sleep(&self, _duration: Duration) {
    ///         *self.calls.lock().expect("calls mutex") += 1;
    ///     }
    /// }
    /// ```
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Outcome of a retried operation together with the attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<V> {
    /// Success value or the last error observed.
    pub value: V,
    /// Number of attempts made, including the first.
    pub attempts: u32,
}

/// Retry budget and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each retry after that.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Delay slept after the failed attempt with zero-based index
    /// `attempt_index`.
    ///
    /// # Examples
    /// ```
    /// use rocktags::domain::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_for(0), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    /// ```
    #[must_use]
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt_index))
    }

    /// Run `operation` until it succeeds or the retry budget is spent.
    ///
    /// The closure receives the zero-based attempt index. On exhaustion the
    /// last error is returned.
    ///
    /// # Errors
    ///
    /// Returns the final attempt's error wrapped in [`Attempted`] once
    /// `max_retries + 1` attempts have failed.
    pub async fn run<T, E, F, Fut>(
        &self,
        sleeper: &dyn RetrySleeper,
        mut operation: F,
    ) -> Result<Attempted<T>, Attempted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt_index = 0_u32;
        loop {
            let attempts = attempt_index.saturating_add(1);
            match operation(attempt_index).await {
                Ok(value) => return Ok(Attempted { value, attempts }),
                Err(error) if attempt_index < self.max_retries => {
                    let delay = self.delay_for(attempt_index);
                    debug!(
                        attempt = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "attempt failed; backing off"
                    );
                    sleeper.sleep(delay).await;
                    attempt_index = attempts;
                }
                Err(error) => {
                    return Err(Attempted {
                        value: error,
                        attempts,
                    });
                }
            }
        }
    }
}
