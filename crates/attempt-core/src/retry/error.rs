//! Error types for the attempt loop
//!
//! An attempt loop ends in failure in exactly two ways: every attempt
//! failed, or a pre/post attempt hook failed. Either way the caller gets a
//! single underlying error value, never a history of failures.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use super::hook::HookStage;

/// Failure marker produced when an attempt's timer fires first
///
/// Carries no payload. It is converted into the operation's own error type
/// through `From<Elapsed>` and stored alongside ordinary operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("attempt timed out")]
pub struct Elapsed;

impl From<Elapsed> for std::io::Error {
    fn from(elapsed: Elapsed) -> Self {
        std::io::Error::new(std::io::ErrorKind::TimedOut, elapsed)
    }
}

/// Errors returned by the attempt loop
///
/// Generic over `E`, the error type of the operation being attempted.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed
    ///
    /// Only the most recent failure is kept; earlier ones are discarded.
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// The failure from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// A pre/post attempt hook failed
    ///
    /// Hook failures abort the loop immediately and never enter the
    /// accumulated attempt failures.
    Hook {
        /// Which hook failed
        stage: HookStage,
        /// The attempt the hook belonged to (1-indexed)
        attempt: u32,
        /// The hook's error
        source: E,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => {
                write!(
                    f,
                    "retry exhausted after {} attempts over {:.2}s: {}",
                    attempts,
                    total_duration.as_secs_f64(),
                    source
                )
            }
            RetryError::Hook {
                stage,
                attempt,
                source,
            } => {
                write!(f, "{} hook failed on attempt {}: {}", stage, attempt, source)
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Hook { source, .. } => Some(source),
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            source,
            total_duration,
        }
    }

    /// Create a new hook failure error
    pub fn hook(stage: HookStage, attempt: u32, source: E) -> Self {
        RetryError::Hook {
            stage,
            attempt,
            source,
        }
    }

    /// Get the number of attempts started
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Hook { attempt, .. } => *attempt,
        }
    }

    /// Check if this error indicates all attempts were exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if this error came from a hook
    pub fn is_hook_failure(&self) -> bool {
        matches!(self, RetryError::Hook { .. })
    }

    /// Get the underlying error, consuming this error
    pub fn into_source(self) -> E {
        match self {
            RetryError::Exhausted { source, .. } => source,
            RetryError::Hook { source, .. } => source,
        }
    }

    /// Get a reference to the underlying error
    pub fn source_ref(&self) -> &E {
        match self {
            RetryError::Exhausted { source, .. } => source,
            RetryError::Hook { source, .. } => source,
        }
    }

    /// Map the error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => RetryError::Exhausted {
                attempts,
                source: f(source),
                total_duration,
            },
            RetryError::Hook {
                stage,
                attempt,
                source,
            } => RetryError::Hook {
                stage,
                attempt,
                source: f(source),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exhausted_error() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            3,
            io::Error::new(io::ErrorKind::TimedOut, "timeout"),
            Duration::from_secs(5),
        );

        assert!(err.is_exhausted());
        assert!(!err.is_hook_failure());
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.source_ref().kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_hook_error() {
        let err: RetryError<io::Error> =
            RetryError::hook(HookStage::PostAttempt, 2, io::Error::other("hook"));

        assert!(err.is_hook_failure());
        assert!(!err.is_exhausted());
        assert_eq!(err.attempts(), 2);
    }

    #[test]
    fn test_into_source() {
        let err: RetryError<String> =
            RetryError::exhausted(3, "original error".to_string(), Duration::from_secs(1));
        assert_eq!(err.into_source(), "original error");

        let err: RetryError<String> =
            RetryError::hook(HookStage::PreAttempt, 1, "hook error".to_string());
        assert_eq!(err.into_source(), "hook error");
    }

    #[test]
    fn test_map_err() {
        let err: RetryError<i32> = RetryError::exhausted(3, 42, Duration::from_secs(1));

        let mapped = err.map_err(|n| format!("error code: {}", n));
        assert!(
            matches!(mapped, RetryError::Exhausted { source, .. } if source == "error code: 42")
        );
    }

    #[test]
    fn test_display() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            3,
            io::Error::new(io::ErrorKind::TimedOut, "connection timeout"),
            Duration::from_millis(5500),
        );

        let display = format!("{}", err);
        assert!(display.contains("retry exhausted"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("5.50s"));
        assert!(display.contains("connection timeout"));

        let err: RetryError<io::Error> =
            RetryError::hook(HookStage::PreAttempt, 1, io::Error::other("not ready"));
        assert_eq!(
            format!("{}", err),
            "pre-attempt hook failed on attempt 1: not ready"
        );
    }

    #[test]
    fn test_error_source_chain() {
        let err: RetryError<io::Error> =
            RetryError::exhausted(1, io::Error::other("inner"), Duration::ZERO);

        let source = Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "inner");
    }

    #[test]
    fn test_elapsed_has_no_payload() {
        assert_eq!(Elapsed.to_string(), "attempt timed out");
        assert_eq!(Elapsed, Elapsed::default());
    }

    #[test]
    fn test_elapsed_into_io_error() {
        let err = io::Error::from(Elapsed);
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(err.to_string(), "attempt timed out");
    }
}
