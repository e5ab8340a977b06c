//! Per-attempt timeout race
//!
//! A timed attempt races the operation against a timer. The timer is
//! scheduled as soon as it is created and its deactivation handle goes
//! straight into the attempt's [`CleanupRegistry`], so the attempt loop can
//! deactivate it whichever side of the race wins.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use super::error::Elapsed;
use crate::types::TimeoutSettings;

/// Schedule a timer for `settings` and register its handle in `cleanups`
///
/// The returned signal resolves to [`Elapsed`] once the timeout has passed,
/// unless the handle is deactivated first, in which case it never resolves.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn start_timeout(settings: &TimeoutSettings, cleanups: &mut CleanupRegistry) -> TimeoutSignal {
    let duration = settings.duration();
    let (fire, fired) = oneshot::channel();

    let timer = tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        let _ = fire.send(Elapsed);
    });

    tracing::trace!(timeout_ms = duration.as_millis() as u64, "attempt timer scheduled");
    cleanups.register(TimerHandle::new(timer.abort_handle()));

    TimeoutSignal { fired: Some(fired) }
}

/// The competing side of a timed attempt
#[derive(Debug)]
#[must_use = "a timeout signal does nothing unless raced against an operation"]
pub struct TimeoutSignal {
    /// `None` once the receiver has completed
    fired: Option<oneshot::Receiver<Elapsed>>,
}

impl Future for TimeoutSignal {
    type Output = Elapsed;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(fired) = self.fired.as_mut() else {
            return Poll::Pending;
        };

        match Pin::new(fired).poll(cx) {
            Poll::Ready(Ok(elapsed)) => {
                self.fired = None;
                Poll::Ready(elapsed)
            }
            // Sender dropped unsent: the timer was deactivated and never fires.
            Poll::Ready(Err(_)) => {
                self.fired = None;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Deactivation handle for a scheduled timer
#[derive(Debug)]
pub struct TimerHandle {
    timer: AbortHandle,
}

impl TimerHandle {
    fn new(timer: AbortHandle) -> Self {
        Self { timer }
    }

    /// Deactivate the timer
    ///
    /// Has no effect once the timer has fired.
    pub fn deactivate(self) {
        self.timer.abort();
    }

    /// Whether the timer has fired or been deactivated
    pub fn is_finished(&self) -> bool {
        self.timer.is_finished()
    }
}

/// Timer handles registered during a single attempt
///
/// Owned by one attempt and released when it concludes. Dropping an
/// unreleased registry deactivates its timers as well.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    handles: Vec<TimerHandle>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handle: TimerHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Deactivate every registered timer
    pub fn release(mut self) {
        self.deactivate_all();
    }

    fn deactivate_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.deactivate();
        }
    }
}

impl Drop for CleanupRegistry {
    fn drop(&mut self) {
        self.deactivate_all();
    }
}
