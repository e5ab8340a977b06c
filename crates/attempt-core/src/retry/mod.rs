//! Retry-with-timeout execution wrapper
//!
//! This module runs an async operation up to a configured number of times,
//! optionally racing each attempt against a per-attempt timeout, and
//! surfaces the most recent failure once attempts are exhausted.
//!
//! # Features
//!
//! - Do-while attempt loop: the first attempt always runs
//! - Optional pre/post attempt hooks; a failing hook aborts the loop
//! - Per-attempt timeout race with timers deactivated on every path
//! - Observable attempts via the `RetryObserver` trait
//! - Built-in `TracingObserver` for logging
//!
//! There is no delay between attempts and no classification of
//! errors: every failure, including a timeout, counts the same.
//!
//! # Example
//!
//! ```rust,no_run
//! use attempt_core::retry::{attempt_with_retry, AttemptConfig, Elapsed, Hook, RetryError};
//! use attempt_core::TimeoutSettings;
//!
//! #[derive(Debug, thiserror::Error)]
//! enum ProbeError {
//!     #[error("probe timed out")]
//!     Timeout(#[from] Elapsed),
//!     #[error("service unavailable")]
//!     Unavailable,
//! }
//!
//! async fn example() -> Result<&'static str, RetryError<ProbeError>> {
//!     let config = AttemptConfig::new(|| async { Ok::<_, ProbeError>("healthy") })
//!         .with_total_attempts(3)
//!         .with_timeout(TimeoutSettings::new(0.0, 1.0, 0.0))
//!         .with_post_attempt(Hook::sync(|| Ok(())));
//!
//!     attempt_with_retry(config).await
//! }
//! ```

mod error;
mod executor;
mod hook;
mod observer;
mod timeout;

pub use error::{Elapsed, RetryError};
pub use executor::{attempt_with_retry, AttemptConfig, AttemptExecutor, AttemptExecutorBuilder};
pub use hook::{Hook, HookStage};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use timeout::{start_timeout, CleanupRegistry, TimeoutSignal, TimerHandle};
