use crate::error::{Error, Result};
use crate::types::{AttemptPolicy, TimeoutSettings};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;

/// Overrides `total-number-of-attempts`
pub const ENV_TOTAL_ATTEMPTS: &str = "ATTEMPT_TOTAL_ATTEMPTS";

/// Overrides `attempt-timeout` with a millisecond value; `none` or an empty
/// value disables the timeout
pub const ENV_TIMEOUT_MS: &str = "ATTEMPT_TIMEOUT_MS";

/// Attempt policy loader
#[derive(Debug, Clone, Default)]
pub struct PolicyLoader {
    /// Optional YAML policy file
    file: Option<Utf8PathBuf>,
}

impl PolicyLoader {
    /// Create a loader that only applies defaults and environment overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer the given YAML file over the defaults
    ///
    /// A missing file is skipped.
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Load the policy with full precedence
    pub fn load(&self) -> Result<AttemptPolicy> {
        let mut policy = AttemptPolicy::default();

        if let Some(path) = self.file.as_deref() {
            if path.exists() {
                policy = Self::load_file(path)?;
                tracing::debug!(path = %path, "loaded attempt policy file");
            }
        }

        Self::apply_env_overrides(policy)
    }

    /// Parse a YAML policy file; absent keys take their default values
    pub fn load_file(path: &Utf8Path) -> Result<AttemptPolicy> {
        if !path.exists() {
            return Err(Error::config_not_found(path.as_str()));
        }

        let content = fs::read_to_string(path)?;
        let policy: AttemptPolicy = serde_yaml_ng::from_str(&content)?;
        Ok(policy)
    }

    fn apply_env_overrides(mut policy: AttemptPolicy) -> Result<AttemptPolicy> {
        if let Ok(val) = env::var(ENV_TOTAL_ATTEMPTS) {
            policy.total_number_of_attempts = val.trim().parse().map_err(|_| {
                Error::invalid_config(format!("{} must be a valid number", ENV_TOTAL_ATTEMPTS))
            })?;
        }

        if let Ok(val) = env::var(ENV_TIMEOUT_MS) {
            let val = val.trim();
            policy.attempt_timeout = if val.is_empty() || val.eq_ignore_ascii_case("none") {
                None
            } else {
                let millis: f64 = val.parse().map_err(|_| {
                    Error::invalid_config(format!("{} must be a number or 'none'", ENV_TIMEOUT_MS))
                })?;
                Some(TimeoutSettings::from_millis(millis))
            };
        }

        Ok(policy)
    }
}
