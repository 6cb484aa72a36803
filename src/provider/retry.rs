// src/provider/retry.rs — Retry with exponential backoff around one remote call
//
// Retries the classified transient errors (connection, HTTP status, rate limit,
// timeout). Anything else is returned on the spot. After the last attempt the
// last error is returned as-is.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::infra::errors::QueryError;

/// Default retry configuration.
const MAX_ATTEMPTS: u32 = 5;
const INITIAL_DELAY_MS: u64 = 1_000;
const BACKOFF_FACTOR: f64 = 2.0;
const MAX_DELAY_MS: u64 = 10_000;
const JITTER_FRACTION: f64 = 0.2;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    /// No single wait exceeds this, jitter and server hints included.
    pub max_delay: Duration,
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
            backoff_factor: BACKOFF_FACTOR,
            max_delay: Duration::from_millis(MAX_DELAY_MS),
            jitter_fraction: JITTER_FRACTION,
        }
    }
}

/// What happened before a backoff wait.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryEvent {
    /// 1-based number of the attempt that just failed.
    pub attempt: u32,
    pub max_attempts: u32,
    pub error: QueryError,
    pub wait: Duration,
}

/// Callback invoked alongside every retry warning.
pub type RetryObserver = Arc<dyn Fn(&RetryEvent) + Send + Sync>;

/// Bounded exponential backoff.
#[derive(Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
    observer: Option<RetryObserver>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RetryConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: RetryObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Wait before the next try, after `attempt` (1-based) has failed.
    pub fn delay_for_attempt(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let max_ms = self.config.max_delay.as_millis() as f64;

        // A server hint replaces the schedule but not the ceiling.
        if let Some(hint) = retry_after {
            return hint.min(self.config.max_delay);
        }

        let exponent = attempt.saturating_sub(1) as i32;
        let base_ms =
            self.config.initial_delay.as_millis() as f64 * self.config.backoff_factor.powi(exponent);
        let capped_ms = base_ms.min(max_ms);

        let jitter = deterministic_jitter(attempt, self.config.jitter_fraction);
        let final_ms = (capped_ms * jitter).clamp(0.0, max_ms);

        Duration::from_millis(final_ms as u64)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, QueryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !e.is_transient() || attempt >= max_attempts {
                        return Err(e);
                    }

                    let retry_after = e.retry_after_ms().map(Duration::from_millis);
                    let wait = self.delay_for_attempt(attempt, retry_after);

                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        wait_ms = wait.as_millis() as u64,
                        "Retry {} due to error: {}. Waiting {:.1}s...",
                        attempt,
                        e,
                        wait.as_secs_f64()
                    );

                    if let Some(observer) = &self.observer {
                        observer(&RetryEvent {
                            attempt,
                            max_attempts,
                            error: e,
                            wait,
                        });
                    }

                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Deterministic jitter for a given attempt to keep retries reproducible in tests.
/// Returns a multiplier in [1 - fraction, 1 + fraction].
fn deterministic_jitter(attempt: u32, fraction: f64) -> f64 {
    let hash = (attempt.wrapping_mul(2654435761)) as f64 / u32::MAX as f64; // 0.0..1.0
    1.0 + fraction * (2.0 * hash - 1.0)
}
