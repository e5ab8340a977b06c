//! Pre/post attempt hooks
//!
//! A hook is an owned, zero-argument, possibly asynchronous action. Hooks
//! are optional: the attempt loop holds them as `Option<Hook<E>>` and an
//! absent hook is a no-op.

use std::fmt;
use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt};

type HookFn<E> = dyn FnMut() -> BoxFuture<'static, Result<(), E>> + Send;

/// Where in the attempt loop a hook runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Before each attempt starts
    PreAttempt,
    /// After each failed attempt, once its timer has been cleaned up
    PostAttempt,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::PreAttempt => write!(f, "pre-attempt"),
            HookStage::PostAttempt => write!(f, "post-attempt"),
        }
    }
}

/// A side-effecting callback run around each attempt
///
/// Only the hook's completion matters to the loop. An `Err` from a hook is
/// fatal: it aborts the whole loop instead of counting as a failed attempt.
///
/// # Example
///
/// ```rust
/// use attempt_core::retry::Hook;
///
/// let pre: Hook<std::io::Error> = Hook::new(|| async {
///     // e.g. refresh a connection pool
///     Ok(())
/// });
///
/// let post: Hook<std::io::Error> = Hook::sync(|| {
///     eprintln!("attempt failed");
///     Ok(())
/// });
/// # let _ = (pre, post);
/// ```
pub struct Hook<E> {
    action: Box<HookFn<E>>,
}

impl<E: Send + 'static> Hook<E> {
    /// Create a hook from an async action
    pub fn new<F, Fut>(mut action: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        Self {
            action: Box::new(move || action().boxed()),
        }
    }

    /// Create a hook from a synchronous action
    pub fn sync<F>(mut action: F) -> Self
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
    {
        Self::new(move || future::ready(action()))
    }
}

impl<E> Hook<E> {
    /// Run the hook to completion
    pub(crate) async fn run(&mut self) -> Result<(), E> {
        (self.action)().await
    }
}

impl<E> fmt::Debug for Hook<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").finish_non_exhaustive()
    }
}
