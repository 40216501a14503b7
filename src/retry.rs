use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff policy for calls to the translation service
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles the delay each time)
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset: UI text translation (3 attempts)
    /// Delays: 500ms, 1s = 1.5s total wait time
    ///
    /// Kept short because a visible string keeps showing its source text
    /// until the translation lands.
    pub fn translation() -> Self {
        Self::new(3, Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(4))
            .with_backoff_multiplier(2.0)
    }

    /// Translation preset with a custom attempt budget (clamped to at least one attempt)
    pub fn translation_with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::translation()
        }
    }

    /// Delay before the given attempt (0-indexed)
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translation()
    }
}

/// Errors that know whether another attempt could succeed.
pub trait Retryable: std::fmt::Display {
    fn is_retryable(&self) -> bool;
}

impl RetryConfig {
    /// Run `operation` until it succeeds, fails with a permanent error, or
    /// the attempt budget is spent. A zero budget still makes one attempt.
    ///
    /// The error of the last attempt is returned.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable,
    {
        let budget = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}/{}", label, attempt, budget);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => {
                    debug!("{} failed permanently: {}", label, e);
                    return Err(e);
                }
                Err(e) if attempt >= budget => {
                    warn!("{} gave up after {} attempts: {}", label, budget, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "{} attempt {}/{} failed ({}), retrying in {:?}",
                        label, attempt, budget, e, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
