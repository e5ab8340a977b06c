//! Attempt observation and logging
//!
//! This module provides the `RetryObserver` trait for monitoring the attempt
//! loop and a `TracingObserver` implementation that logs using the `tracing`
//! crate. Observers see every event but never influence the outcome.

use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::hook::HookStage;

/// Observer trait for attempt loop events
///
/// # Example
///
/// ```rust
/// use attempt_core::retry::RetryObserver;
/// use std::fmt::Display;
/// use std::time::Duration;
///
/// struct MetricsObserver;
///
/// impl RetryObserver for MetricsObserver {
///     fn on_attempt_start(&self, attempt: u32, total_attempts: u32) {
///         // Record attempt start metric
///     }
///
///     fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
///         // Record failure metric
///     }
///
///     fn on_success(&self, attempt: u32, total_duration: Duration) {
///         // Record success metric with latency
///     }
///
///     fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
///         // Record exhaustion metric
///     }
/// }
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start, after its pre-attempt hook
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number (1-indexed)
    /// * `total_attempts` - The configured attempt ceiling
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32);

    /// Called when an attempt fails and another attempt will follow
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number that failed (1-indexed)
    /// * `error` - The recorded failure
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display);

    /// Called when the operation succeeds
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number that succeeded (1-indexed)
    /// * `total_duration` - Total time spent across all attempts
    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// Called when all attempts are exhausted
    ///
    /// # Arguments
    ///
    /// * `attempts` - Total number of attempts made
    /// * `final_error` - The failure from the final attempt
    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display);

    /// Called when an attempt's timer fires before the operation settles
    ///
    /// The operation keeps running in the background after this.
    fn on_attempt_timeout(&self, attempt: u32, timeout: Duration) {
        let _ = (attempt, timeout);
    }

    /// Called when a pre/post attempt hook fails, aborting the loop
    fn on_hook_failed(&self, stage: HookStage, attempt: u32, error: &dyn Display) {
        let _ = (stage, attempt, error);
    }
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _total_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Display) {}
}

/// An observer that logs attempt events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_attempt_timeout`: WARN
/// - `on_success`: INFO (if > 1 attempt) or DEBUG (first attempt)
/// - `on_exhausted`: ERROR
/// - `on_hook_failed`: ERROR
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being attempted (for log context)
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("attempt")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt = attempt,
            total_attempts = total_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            error = %error,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            tracing::info!(
                operation = %self.operation,
                attempt = attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        tracing::error!(
            operation = %self.operation,
            attempts = attempts,
            error = %final_error,
            "all attempts exhausted"
        );
    }

    fn on_attempt_timeout(&self, attempt: u32, timeout: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            timeout_ms = timeout.as_millis() as u64,
            "attempt timed out, operation left running"
        );
    }

    fn on_hook_failed(&self, stage: HookStage, attempt: u32, error: &dyn Display) {
        tracing::error!(
            operation = %self.operation,
            stage = %stage,
            attempt = attempt,
            error = %error,
            "hook failed, aborting"
        );
    }
}

/// An observer that counts attempt events
///
/// Useful for testing and metrics collection.
#[derive(Debug, Default)]
pub struct StatsObserver {
    pub attempt_starts: AtomicU32,
    pub failures: AtomicU32,
    pub successes: AtomicU32,
    pub exhaustions: AtomicU32,
    pub timeouts: AtomicU32,
    pub hook_failures: AtomicU32,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    pub fn timeouts(&self) -> u32 {
        self.timeouts.load(Ordering::SeqCst)
    }

    pub fn hook_failures(&self) -> u32 {
        self.hook_failures.load(Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _total_attempts: u32) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Display) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_timeout(&self, _attempt: u32, _timeout: Duration) {
        self.timeouts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_hook_failed(&self, _stage: HookStage, _attempt: u32, _error: &dyn Display) {
        self.hook_failures.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Arc<T> {
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32) {
        (**self).on_attempt_start(attempt, total_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
        (**self).on_attempt_failed(attempt, error)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_attempt_timeout(&self, attempt: u32, timeout: Duration) {
        (**self).on_attempt_timeout(attempt, timeout)
    }

    fn on_hook_failed(&self, stage: HookStage, attempt: u32, error: &dyn Display) {
        (**self).on_hook_failed(stage, attempt, error)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_start(&self, attempt: u32, total_attempts: u32) {
        (**self).on_attempt_start(attempt, total_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
        (**self).on_attempt_failed(attempt, error)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_attempt_timeout(&self, attempt: u32, timeout: Duration) {
        (**self).on_attempt_timeout(attempt, timeout)
    }

    fn on_hook_failed(&self, stage: HookStage, attempt: u32, error: &dyn Display) {
        (**self).on_hook_failed(stage, attempt, error)
    }
}
