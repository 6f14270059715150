//! Middleware chain.
//!
//! A middleware receives the request and a [`Next`] continuation standing for
//! the rest of the pipeline (the remaining middleware, then dispatch). It
//! either calls [`Next::run`], possibly with a transformed request, or
//! short-circuits by returning a response itself.
//!
//! Any `Fn(In, Next<In, Out>) -> impl Future<Output = Out>` closure is a
//! middleware.
//!
//! # Example
//!
//! ```ignore
//! let server = ProcedureServer::new(definition)
//!     .with_middleware(|input: JsonCall, next: Next<JsonCall, JsonReply>| async move {
//!         if input.procedure.starts_with('_') {
//!             return JsonReply::error("forbidden", "private procedure");
//!         }
//!         next.run(input).await
//!     });
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::registry::BoxFuture;

/// Request interceptor.
pub trait Middleware<In, Out>: Send + Sync + 'static {
    /// Handle `input`, delegating to `next` or answering directly.
    fn call(&self, input: In, next: Next<In, Out>) -> BoxFuture<'static, Out>;
}

impl<In, Out, F, Fut> Middleware<In, Out> for F
where
    F: Fn(In, Next<In, Out>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send + 'static,
{
    fn call(&self, input: In, next: Next<In, Out>) -> BoxFuture<'static, Out> {
        Box::pin((self)(input, next))
    }
}

/// Shared middleware list, outermost first.
pub(crate) type MiddlewareList<In, Out> = Arc<[Arc<dyn Middleware<In, Out>>]>;

/// Innermost step of the pipeline.
pub(crate) type Endpoint<In, Out> = dyn Fn(In) -> BoxFuture<'static, Out> + Send + Sync;

/// The remainder of the pipeline after the current middleware.
///
/// `Next` is consumed by [`run`](Next::run), so the rest of the pipeline
/// runs at most once per middleware invocation.
pub struct Next<In, Out> {
    chain: MiddlewareList<In, Out>,
    index: usize,
    endpoint: Arc<Endpoint<In, Out>>,
}

impl<In: 'static, Out: 'static> Next<In, Out> {
    pub(crate) fn new(chain: MiddlewareList<In, Out>, endpoint: Arc<Endpoint<In, Out>>) -> Self {
        Self {
            chain,
            index: 0,
            endpoint,
        }
    }

    /// Run the rest of the pipeline with `input`.
    pub fn run(self, input: In) -> BoxFuture<'static, Out> {
        match self.chain.get(self.index).cloned() {
            Some(middleware) => {
                let next = Next {
                    chain: self.chain,
                    index: self.index + 1,
                    endpoint: self.endpoint,
                };
                middleware.call(input, next)
            }
            None => (self.endpoint)(input),
        }
    }

    /// Number of middleware still ahead of dispatch.
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }
}

/// Middleware that bounds the time spent in the rest of the pipeline.
///
/// When `duration` elapses first, the pending work is dropped and the
/// response produced by `on_timeout` is returned instead.
pub struct Timeout<F> {
    duration: Duration,
    on_timeout: Arc<F>,
}

impl<F> Timeout<F> {
    /// Create a timeout middleware.
    pub fn new(duration: Duration, on_timeout: F) -> Self {
        Self {
            duration,
            on_timeout: Arc::new(on_timeout),
        }
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<In, Out, F> Middleware<In, Out> for Timeout<F>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: Fn() -> Out + Send + Sync + 'static,
{
    fn call(&self, input: In, next: Next<In, Out>) -> BoxFuture<'static, Out> {
        let duration = self.duration;
        let on_timeout = self.on_timeout.clone();

        // The rest of the pipeline starts only once the timer is armed.
        Box::pin(async move {
            match tokio::time::timeout(duration, next.run(input)).await {
                Ok(output) => output,
                Err(_) => {
                    tracing::warn!(timeout_ms = duration.as_millis() as u64, "request timed out");
                    on_timeout()
                }
            }
        })
    }
}
