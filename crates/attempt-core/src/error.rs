//! Error types for attempt-core

use thiserror::Error;

/// Result type alias using attempt-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading attempt policies
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = Error::invalid_config("ATTEMPT_TOTAL_ATTEMPTS must be a valid number");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: ATTEMPT_TOTAL_ATTEMPTS must be a valid number"
        );
    }

    #[test]
    fn test_config_not_found_display() {
        let err = Error::config_not_found("/etc/attempt.yaml");
        assert!(err.to_string().contains("/etc/attempt.yaml"));
    }
}
