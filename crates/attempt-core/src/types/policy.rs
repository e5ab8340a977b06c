//! Attempt policy types
//!
//! These types hold the serialisable part of an attempt configuration: how
//! many times an operation is attempted and how long each attempt may run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt policy for an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AttemptPolicy {
    /// Ceiling on the number of attempts
    ///
    /// The first attempt always runs, so `0` behaves like `1`.
    #[serde(default = "default_total_number_of_attempts")]
    pub total_number_of_attempts: u32,

    /// Per-attempt timeout; `None` disables timeout enforcement
    #[serde(default)]
    pub attempt_timeout: Option<TimeoutSettings>,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            total_number_of_attempts: default_total_number_of_attempts(),
            attempt_timeout: None,
        }
    }
}

impl AttemptPolicy {
    /// Create a policy with the given attempt ceiling and no timeout
    pub fn new(total_number_of_attempts: u32) -> Self {
        Self {
            total_number_of_attempts,
            attempt_timeout: None,
        }
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: TimeoutSettings) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }
}

fn default_total_number_of_attempts() -> u32 {
    3
}

/// Per-attempt timeout expressed as three additive components
///
/// Components are not normalised or validated: `{ seconds: 90 }` and
/// `{ minutes: 1, seconds: 30 }` are the same timeout, and negative or
/// fractional components simply combine arithmetically.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeoutSettings {
    #[serde(default)]
    pub minutes: f64,

    #[serde(default)]
    pub seconds: f64,

    #[serde(default)]
    pub millis: f64,
}

impl TimeoutSettings {
    pub fn new(minutes: f64, seconds: f64, millis: f64) -> Self {
        Self {
            minutes,
            seconds,
            millis,
        }
    }

    pub fn from_millis(millis: f64) -> Self {
        Self {
            millis,
            ..Self::default()
        }
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            seconds,
            ..Self::default()
        }
    }

    /// Combined timeout in milliseconds
    ///
    /// `millis + seconds * 1000 + minutes * 60000`, with no clamping.
    pub fn as_millis(&self) -> f64 {
        let mut output = self.millis;
        output += self.seconds * 1000.0;
        output += self.minutes * 60.0 * 1000.0;
        output
    }

    /// Timer duration for this timeout
    ///
    /// A non-positive or NaN sum fires on the next timer tick
    /// (`Duration::ZERO`); sums beyond `u64` milliseconds saturate.
    pub fn duration(&self) -> Duration {
        let millis = self.as_millis();
        if millis.is_nan() || millis <= 0.0 {
            return Duration::ZERO;
        }
        if millis >= u64::MAX as f64 {
            return Duration::MAX;
        }

        let whole = millis.trunc();
        let sub_millis_nanos = ((millis - whole) * 1_000_000.0).round() as u64;

        Duration::from_millis(whole as u64).saturating_add(Duration::from_nanos(sub_millis_nanos))
    }
}

impl From<Duration> for TimeoutSettings {
    fn from(duration: Duration) -> Self {
        Self::from_millis(duration.as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_policy_defaults() {
        let policy = AttemptPolicy::default();
        assert_eq!(policy.total_number_of_attempts, 3);
        assert!(policy.attempt_timeout.is_none());
    }

    #[test]
    fn test_timeout_components_are_additive() {
        let timeout = TimeoutSettings::new(1.0, 1.0, 1.0);
        assert_eq!(timeout.as_millis(), 61001.0);
        assert_eq!(timeout.duration(), Duration::from_millis(61001));
    }

    #[test]
    fn test_timeout_components_are_not_normalised() {
        let overflowing = TimeoutSettings::new(0.0, 90.0, 0.0);
        let normalised = TimeoutSettings::new(1.0, 30.0, 0.0);
        assert_eq!(overflowing.as_millis(), normalised.as_millis());
    }

    #[test]
    fn test_negative_components_combine_arithmetically() {
        let timeout = TimeoutSettings::new(0.0, 2.0, -500.0);
        assert_eq!(timeout.as_millis(), 1500.0);
        assert_eq!(timeout.duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_fractional_components() {
        let timeout = TimeoutSettings::new(0.0, 0.5, 0.25);
        assert_eq!(timeout.as_millis(), 500.25);
        assert_eq!(timeout.duration(), Duration::from_micros(500_250));
    }

    #[test]
    fn test_non_positive_sum_fires_immediately() {
        assert_eq!(TimeoutSettings::from_millis(-10.0).duration(), Duration::ZERO);
        assert_eq!(TimeoutSettings::default().duration(), Duration::ZERO);
        assert_eq!(TimeoutSettings::from_millis(f64::NAN).duration(), Duration::ZERO);
    }

    #[test]
    fn test_huge_sum_saturates() {
        let timeout = TimeoutSettings::new(f64::MAX, 0.0, 0.0);
        assert_eq!(timeout.duration(), Duration::MAX);
    }

    #[test]
    fn test_from_duration() {
        let timeout = TimeoutSettings::from(Duration::from_millis(1500));
        assert_eq!(timeout.as_millis(), 1500.0);
    }

    #[test]
    fn test_policy_yaml_round_trip() {
        let yaml = r#"
total-number-of-attempts: 5
attempt-timeout:
  seconds: 1
"#;
        let policy: AttemptPolicy = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(policy.total_number_of_attempts, 5);

        let timeout = policy.attempt_timeout.unwrap();
        assert_eq!(timeout.minutes, 0.0);
        assert_eq!(timeout.millis, 0.0);
        assert_eq!(timeout.as_millis(), 1000.0);
    }

    #[test]
    fn test_policy_yaml_defaults() {
        let policy: AttemptPolicy = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(policy, AttemptPolicy::default());
    }

    #[test]
    fn test_policy_serialization() {
        let policy = AttemptPolicy::new(2).with_timeout(TimeoutSettings::from_millis(250.0));
        let yaml = serde_yaml_ng::to_string(&policy).unwrap();
        assert!(yaml.contains("total-number-of-attempts: 2"));
        assert!(yaml.contains("millis: 250"));
    }
}
