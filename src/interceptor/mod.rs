//! Interceptor chain.
//!
//! # Data Flow
//! ```text
//! GatewayRequest
//!     → Next::run → interceptor[0].intercept(req, next)
//!         → Next::run → interceptor[1].intercept(req', next)
//!             → ...
//!                 → Upstream::dispatch(req'')
//!     ← Result<Response, GatewayError> (exactly one per request)
//! ```
//!
//! # Design Decisions
//! - Lower priority value runs earlier; priorities must be unique
//! - Priorities up to and including [`TENANT_CONTEXT_PRIORITY`] belong to the
//!   built-in trace and tenant stages
//! - `Next` is consumed by `run`, so an interceptor can call its continuation
//!   at most once
//! - An interceptor may forward, forward a modified copy, short-circuit with a
//!   response, or fail

pub mod chain;

use async_trait::async_trait;
use axum::response::Response;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::http::GatewayRequest;

pub use chain::{ChainError, InterceptorChain};

/// Priority of [`TraceContextInjector`](crate::filters::TraceContextInjector).
pub const TRACE_CONTEXT_PRIORITY: i32 = -9999;

/// Priority of [`TenantContextPropagator`](crate::filters::TenantContextPropagator).
pub const TENANT_CONTEXT_PRIORITY: i32 = -9998;

pub const TRACE_CONTEXT_NAME: &str = "trace-context";

pub const TENANT_CONTEXT_NAME: &str = "tenant-context";

/// One stage of request processing.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Name used in logs and chain listings.
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32;

    async fn intercept(
        &self,
        request: GatewayRequest,
        next: Next<'_>,
    ) -> Result<Response, GatewayError>;
}

/// Terminal stage: the call to the upstream target.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn dispatch(&self, request: GatewayRequest) -> Result<Response, GatewayError>;
}

/// The rest of the chain plus the upstream call.
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Interceptor>],
    upstream: &'a dyn Upstream,
}

impl<'a> Next<'a> {
    pub(crate) fn new(remaining: &'a [Arc<dyn Interceptor>], upstream: &'a dyn Upstream) -> Self {
        Self {
            remaining,
            upstream,
        }
    }

    /// Hand `request` to the next stage.
    pub async fn run(self, request: GatewayRequest) -> Result<Response, GatewayError> {
        match self.remaining.split_first() {
            Some((interceptor, rest)) => {
                tracing::trace!(interceptor = interceptor.name(), "Entering interceptor");
                interceptor
                    .intercept(request, Next::new(rest, self.upstream))
                    .await
            }
            None => self.upstream.dispatch(request).await,
        }
    }
}
