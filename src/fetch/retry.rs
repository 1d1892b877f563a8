//! Delayed retry schedules.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::{Error, Result};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Try again after the next scheduled delay.
    Retry,
    /// Give up and return the error.
    Abort,
}

/// A retry schedule: one entry per attempt, holding the delay slept
/// before that attempt. The first delay is normally zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// Build a policy from per-attempt delays. An empty list still makes
    /// one immediate attempt.
    pub fn new(delays: Vec<Duration>) -> Self {
        let delays = if delays.is_empty() {
            vec![Duration::ZERO]
        } else {
            delays
        };
        Self { delays }
    }

    /// Build a policy from delays in whole seconds.
    pub fn from_secs(delays: &[u64]) -> Self {
        Self::new(delays.iter().copied().map(Duration::from_secs).collect())
    }

    /// Opening the saved-posts collection: now, +5 min, +10 min.
    pub fn pagination() -> Self {
        Self::from_secs(&[0, 300, 600])
    }

    /// Extracting one post: now, +60 s, +120 s.
    pub fn per_post() -> Self {
        Self::from_secs(&[0, 60, 120])
    }

    /// `attempts` back-to-back attempts with no delay.
    pub fn immediate(attempts: usize) -> Self {
        Self::new(vec![Duration::ZERO; attempts.max(1)])
    }

    /// Total number of attempts.
    pub fn attempts(&self) -> usize {
        self.delays.len()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Run `operation` under this schedule.
    ///
    /// `classify` decides, for each failure that is not the last attempt,
    /// whether to keep going. The last error is returned on exhaustion.
    pub async fn run<T, F, Fut, C>(&self, label: &str, mut operation: F, mut classify: C) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        C: FnMut(&Error) -> RetryAction,
    {
        let attempts = self.attempts();
        let mut last_error = None;

        for (index, delay) in self.delays.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tracing::warn!(
                    "Retrying {} in {}s (attempt {}/{})",
                    label,
                    delay.as_secs_f64(),
                    index + 1,
                    attempts
                );
                sleep(*delay).await;
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let is_last = index + 1 == attempts;
                    if is_last || classify(&e) == RetryAction::Abort {
                        return Err(e);
                    }
                    tracing::debug!("Attempt {}/{} for {} failed: {}", index + 1, attempts, label, e);
                    last_error = Some(e);
                }
            }
        }

        // Unreachable with a non-empty schedule, kept for the type checker
        Err(last_error.unwrap_or_else(|| Error::Connection(format!("{} was never attempted", label))))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::per_post()
    }
}
