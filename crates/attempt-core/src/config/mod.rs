//! Attempt policy loading
//!
//! Policies are resolved with the following precedence (low to high):
//! 1. Built-in defaults (`AttemptPolicy::default()`)
//! 2. A YAML policy file, when one is configured
//! 3. Environment variables (`ATTEMPT_*` prefix)

mod loader;

pub use loader::{PolicyLoader, ENV_TIMEOUT_MS, ENV_TOTAL_ATTEMPTS};
