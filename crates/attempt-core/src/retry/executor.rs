//! Attempt loop
//!
//! Runs an operation up to a configured number of times, racing each
//! attempt against an optional timeout and running hooks around it.
//!
//! Per attempt, in order:
//! 1. pre-attempt hook (an error aborts the loop)
//! 2. the operation, raced against a fresh timer when a timeout is set
//! 3. the attempt's timers are deactivated, on every path
//! 4. success returns at once; a failure or timeout is recorded
//! 5. post-attempt hook (an error aborts the loop)
//!
//! The first attempt always runs; the ceiling is checked after it.

use std::fmt::Display;
use std::future::Future;
use std::panic;

use tokio::time::Instant;

use crate::types::{AttemptPolicy, TimeoutSettings};

use super::error::{Elapsed, RetryError};
use super::hook::{Hook, HookStage};
use super::observer::{NoOpObserver, RetryObserver};
use super::timeout::{start_timeout, CleanupRegistry};

/// Everything one invocation of the attempt loop needs
///
/// # Example
///
/// ```rust,no_run
/// use attempt_core::retry::{attempt_with_retry, AttemptConfig, Elapsed, RetryError};
/// use attempt_core::TimeoutSettings;
///
/// #[derive(Debug)]
/// enum FetchError {
///     Timeout,
///     Status(u16),
/// }
///
/// impl From<Elapsed> for FetchError {
///     fn from(_: Elapsed) -> Self {
///         FetchError::Timeout
///     }
/// }
///
/// impl std::fmt::Display for FetchError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{:?}", self)
///     }
/// }
///
/// async fn example() -> Result<String, RetryError<FetchError>> {
///     let config = AttemptConfig::new(|| async { Ok::<_, FetchError>("body".to_string()) })
///         .with_total_attempts(3)
///         .with_timeout(TimeoutSettings::new(0.0, 1.0, 0.0));
///
///     attempt_with_retry(config).await
/// }
/// ```
pub struct AttemptConfig<F, E> {
    /// The operation; called once per attempt
    pub attempt_logic: F,
    pub pre_attempt: Option<Hook<E>>,
    pub post_attempt: Option<Hook<E>>,
    /// Attempt ceiling; the first attempt runs even when this is 0
    pub total_number_of_attempts: u32,
    /// `None` means no attempt ever times out
    pub attempt_timeout: Option<TimeoutSettings>,
}

impl<F, E> AttemptConfig<F, E> {
    /// Create a config with the default policy and no hooks
    pub fn new(attempt_logic: F) -> Self {
        Self::from_policy(&AttemptPolicy::default(), attempt_logic)
    }

    /// Create a config from a loaded policy
    pub fn from_policy(policy: &AttemptPolicy, attempt_logic: F) -> Self {
        Self {
            attempt_logic,
            pre_attempt: None,
            post_attempt: None,
            total_number_of_attempts: policy.total_number_of_attempts,
            attempt_timeout: policy.attempt_timeout,
        }
    }

    pub fn with_total_attempts(mut self, total_number_of_attempts: u32) -> Self {
        self.total_number_of_attempts = total_number_of_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: TimeoutSettings) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn with_pre_attempt(mut self, hook: Hook<E>) -> Self {
        self.pre_attempt = Some(hook);
        self
    }

    pub fn with_post_attempt(mut self, hook: Hook<E>) -> Self {
        self.post_attempt = Some(hook);
        self
    }
}

/// Run `config.attempt_logic` until it succeeds or attempts run out
///
/// Returns the first success. When every attempt fails, returns
/// [`RetryError::Exhausted`] carrying only the most recent failure. A hook
/// failure returns [`RetryError::Hook`] immediately.
///
/// Timed attempts run the operation on its own Tokio task. When the timer
/// wins, that task is left running detached and whatever it eventually
/// produces is ignored.
pub async fn attempt_with_retry<F, Fut, T, E>(config: AttemptConfig<F, E>) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<Elapsed> + Display + Send + 'static,
{
    let AttemptConfig {
        attempt_logic,
        pre_attempt,
        post_attempt,
        total_number_of_attempts,
        attempt_timeout,
    } = config;

    let mut executor = AttemptExecutor {
        policy: AttemptPolicy {
            total_number_of_attempts,
            attempt_timeout,
        },
        pre_attempt,
        post_attempt,
        observer: NoOpObserver,
    };

    executor.execute(attempt_logic).await
}

/// Builder for configuring an `AttemptExecutor`
///
/// # Example
///
/// ```rust
/// use attempt_core::retry::{AttemptExecutorBuilder, Hook, TracingObserver};
/// use attempt_core::{AttemptPolicy, TimeoutSettings};
///
/// let executor = AttemptExecutorBuilder::<std::io::Error>::new()
///     .with_policy(AttemptPolicy::new(5))
///     .with_timeout(TimeoutSettings::from_millis(250.0))
///     .with_pre_attempt(Hook::sync(|| Ok(())))
///     .with_observer(TracingObserver::new("download"))
///     .build();
/// ```
pub struct AttemptExecutorBuilder<E, O = NoOpObserver> {
    policy: AttemptPolicy,
    pre_attempt: Option<Hook<E>>,
    post_attempt: Option<Hook<E>>,
    observer: O,
}

impl<E> Default for AttemptExecutorBuilder<E, NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> AttemptExecutorBuilder<E, NoOpObserver> {
    /// Create a new builder with the default policy and no hooks
    pub fn new() -> Self {
        Self {
            policy: AttemptPolicy::default(),
            pre_attempt: None,
            post_attempt: None,
            observer: NoOpObserver,
        }
    }
}

impl<E, O> AttemptExecutorBuilder<E, O> {
    /// Set the attempt policy
    pub fn with_policy(mut self, policy: AttemptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_total_attempts(mut self, total_number_of_attempts: u32) -> Self {
        self.policy.total_number_of_attempts = total_number_of_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: TimeoutSettings) -> Self {
        self.policy.attempt_timeout = Some(timeout);
        self
    }

    pub fn with_pre_attempt(mut self, hook: Hook<E>) -> Self {
        self.pre_attempt = Some(hook);
        self
    }

    pub fn with_post_attempt(mut self, hook: Hook<E>) -> Self {
        self.post_attempt = Some(hook);
        self
    }

    /// Set the observer
    ///
    /// The observer receives callbacks during execution.
    pub fn with_observer<O2>(self, observer: O2) -> AttemptExecutorBuilder<E, O2> {
        AttemptExecutorBuilder {
            policy: self.policy,
            pre_attempt: self.pre_attempt,
            post_attempt: self.post_attempt,
            observer,
        }
    }

    /// Build the executor
    pub fn build(self) -> AttemptExecutor<E, O> {
        AttemptExecutor {
            policy: self.policy,
            pre_attempt: self.pre_attempt,
            post_attempt: self.post_attempt,
            observer: self.observer,
        }
    }
}

/// A reusable attempt loop with policy, hooks and observer
///
/// Use `AttemptExecutorBuilder` to create an instance.
pub struct AttemptExecutor<E, O = NoOpObserver> {
    policy: AttemptPolicy,
    pre_attempt: Option<Hook<E>>,
    post_attempt: Option<Hook<E>>,
    observer: O,
}

/// How a single attempt settled
enum Settled<T, E> {
    Succeeded(T),
    Failed(E),
    TimedOut(Elapsed),
}

impl<E, O> AttemptExecutor<E, O>
where
    E: From<Elapsed> + Display + Send + 'static,
    O: RetryObserver,
{
    pub fn policy(&self) -> &AttemptPolicy {
        &self.policy
    }

    /// Execute an operation through the attempt loop
    ///
    /// See [`attempt_with_retry`] for the contract.
    pub async fn execute<F, Fut, T>(&mut self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
    {
        let start = Instant::now();
        let total_attempts = self.policy.total_number_of_attempts;
        let attempt_timeout = self.policy.attempt_timeout;

        let mut errors: Vec<E> = Vec::new();
        let mut remaining = total_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            if let Some(hook) = self.pre_attempt.as_mut() {
                if let Err(err) = hook.run().await {
                    self.observer
                        .on_hook_failed(HookStage::PreAttempt, attempt, &err);
                    return Err(RetryError::hook(HookStage::PreAttempt, attempt, err));
                }
            }

            self.observer.on_attempt_start(attempt, total_attempts);

            let mut cleanups = CleanupRegistry::new();
            let settled = match attempt_timeout.as_ref() {
                Some(timeout) => race_attempt(op(), timeout, &mut cleanups).await,
                None => match op().await {
                    Ok(value) => Settled::Succeeded(value),
                    Err(err) => Settled::Failed(err),
                },
            };
            cleanups.release();

            match settled {
                Settled::Succeeded(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(value);
                }
                Settled::Failed(err) => errors.push(err),
                Settled::TimedOut(elapsed) => {
                    if let Some(timeout) = attempt_timeout.as_ref() {
                        self.observer.on_attempt_timeout(attempt, timeout.duration());
                    }
                    errors.push(E::from(elapsed));
                }
            }

            remaining = remaining.saturating_sub(1);
            if remaining > 0 {
                if let Some(err) = errors.last() {
                    self.observer.on_attempt_failed(attempt, err);
                }
            }

            if let Some(hook) = self.post_attempt.as_mut() {
                if let Err(err) = hook.run().await {
                    self.observer
                        .on_hook_failed(HookStage::PostAttempt, attempt, &err);
                    return Err(RetryError::hook(HookStage::PostAttempt, attempt, err));
                }
            }

            if remaining == 0 {
                break;
            }
        }

        match errors.pop() {
            Some(source) => {
                self.observer.on_exhausted(attempt, &source);
                Err(RetryError::exhausted(attempt, source, start.elapsed()))
            }
            None => unreachable!("attempt loop ended without recording a failure"),
        }
    }
}

/// Race one attempt of the operation against a fresh timer
///
/// The operation runs on its own task so that losing the race does not
/// cancel it. The timer handle lands in `cleanups` before the race starts.
async fn race_attempt<Fut, T, E>(
    operation: Fut,
    timeout: &TimeoutSettings,
    cleanups: &mut CleanupRegistry,
) -> Settled<T, E>
where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<Elapsed> + Send + 'static,
{
    let mut operation = tokio::spawn(operation);
    let timer = start_timeout(timeout, cleanups);

    // Polled operation-first: when both are ready on the same poll the
    // operation wins. A timer firing on another worker can still win a tie.
    tokio::select! {
        biased;

        joined = &mut operation => match joined {
            Ok(Ok(value)) => Settled::Succeeded(value),
            Ok(Err(err)) => Settled::Failed(err),
            Err(join_err) if join_err.is_panic() => panic::resume_unwind(join_err.into_panic()),
            Err(_) => {
                tracing::warn!("attempt task cancelled before settling");
                Settled::Failed(E::from(Elapsed))
            }
        },
        elapsed = timer => Settled::TimedOut(elapsed),
    }
}
