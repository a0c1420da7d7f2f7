//! Baggage scopes bound to a request future.
//!
//! A [`BaggageScope`] is opened by the interceptor that builds the baggage,
//! made current for exactly the future it wraps via [`BaggageScope::run`], and
//! closed when the guard is dropped. Dropping happens when the wrapped future
//! completes, fails, or is itself dropped (client disconnect, timeout), so the
//! close hook fires exactly once per opened scope.

use std::future::Future;
use std::sync::Arc;

use crate::context::Baggage;

tokio::task_local! {
    static CURRENT: Arc<Baggage>;
}

/// Baggage current for the running request, if any scope is open.
pub fn current() -> Option<Arc<Baggage>> {
    CURRENT.try_with(Arc::clone).ok()
}

/// Carry the caller's current baggage into `fut`.
///
/// Task-locals do not follow `tokio::spawn`; wrap child futures with this
/// before spawning them. The baggage is captured at call time.
pub fn in_current_scope<F>(fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let baggage = current();
    async move {
        match baggage {
            Some(baggage) => CURRENT.scope(baggage, fut).await,
            None => fut.await,
        }
    }
}

/// Hooks invoked when a baggage scope opens and closes.
pub trait ScopeObserver: Send + Sync {
    fn opened(&self, baggage: &Baggage);
    fn closed(&self, baggage: &Baggage);
}

/// Default observer: records scope transitions at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ScopeObserver for LoggingObserver {
    fn opened(&self, baggage: &Baggage) {
        tracing::debug!(baggage = %baggage, "Baggage scope opened");
    }

    fn closed(&self, baggage: &Baggage) {
        tracing::debug!(baggage = %baggage, "Baggage scope closed");
    }
}

/// Guard for one open baggage scope.
pub struct BaggageScope {
    baggage: Arc<Baggage>,
    observer: Arc<dyn ScopeObserver>,
}

impl BaggageScope {
    /// Open a scope for `baggage`. It is not current until [`run`](Self::run).
    pub fn open(baggage: Baggage, observer: Arc<dyn ScopeObserver>) -> Self {
        let baggage = Arc::new(baggage);
        observer.opened(&baggage);
        Self { baggage, observer }
    }

    /// Drive `fut` with this scope's baggage current, then close the scope.
    pub async fn run<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        let output = CURRENT.scope(Arc::clone(&self.baggage), fut).await;
        drop(self);
        output
    }
}

impl Drop for BaggageScope {
    fn drop(&mut self) {
        self.observer.closed(&self.baggage);
    }
}

impl std::fmt::Debug for BaggageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaggageScope")
            .field("baggage", &self.baggage)
            .finish()
    }
}
