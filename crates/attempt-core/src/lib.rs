//! # attempt-core
//!
//! Retry-with-timeout execution wrapper for async operations:
//! - Attempt loop with optional pre/post attempt hooks
//! - Per-attempt timeout race with guaranteed timer cleanup
//! - Observable attempts via the `RetryObserver` trait
//! - Attempt policies loaded from YAML and environment overrides

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::PolicyLoader;
pub use error::{Error, Result};
pub use retry::{attempt_with_retry, AttemptConfig, Elapsed, RetryError};
pub use types::{AttemptPolicy, TimeoutSettings};
