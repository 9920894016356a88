//! Deferred loads running in their own task.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::fallback::DeferredValue;

/// Handle to a deferred load that is already running.
///
/// The value is assigned exactly once, by the spawned task. Awaiting the
/// handle never fails: load errors and task panics both resolve to
/// [`DeferredValue::Unavailable`]. Dropping the handle aborts the task and
/// discards whatever it would have produced.
#[derive(Debug)]
pub struct Deferred<T> {
    label: &'static str,
    handle: JoinHandle<DeferredValue<T>>,
}

/// Start `load` immediately in its own task and return its handle.
///
/// Errors are logged at `error` (inside the caller's current span) and turned
/// into `Unavailable`. No retries are attempted.
///
/// Must be called from within a Tokio runtime.
pub fn defer<T, E, F>(label: &'static str, load: F) -> Deferred<T>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let task = async move {
        match load.await {
            Ok(value) => DeferredValue::Ready(value),
            Err(e) => {
                tracing::error!(deferred = label, error = %e, "Deferred load failed");
                DeferredValue::Unavailable
            }
        }
    };

    Deferred {
        label,
        handle: tokio::spawn(task.in_current_span()),
    }
}

impl<T> Deferred<T> {
    /// Label the load was started with.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the task has produced its value.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for Deferred<T> {
    type Output = DeferredValue<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(e)) => {
                if e.is_panic() {
                    tracing::error!(deferred = this.label, "Deferred load panicked");
                }
                Poll::Ready(DeferredValue::Unavailable)
            }
        }
    }
}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
