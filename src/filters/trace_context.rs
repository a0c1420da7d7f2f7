//! B3 trace header injection.
//!
//! In a managed environment (service mesh sidecar) the infrastructure has
//! already attached trace headers, so requests pass through untouched.
//! Otherwise the gateway roots a new trace for every request.

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;

use crate::error::GatewayError;
use crate::http::GatewayRequest;
use crate::interceptor::{Interceptor, Next, TRACE_CONTEXT_NAME, TRACE_CONTEXT_PRIORITY};
use crate::observability::trace_ids::X_B3_TRACE_ID;
use crate::observability::IdGenerator;

pub struct TraceContextInjector {
    managed_environment: bool,
    ids: Arc<IdGenerator>,
}

impl TraceContextInjector {
    /// `managed_environment` is resolved once at startup from configuration.
    pub fn new(managed_environment: bool, ids: Arc<IdGenerator>) -> Self {
        Self {
            managed_environment,
            ids,
        }
    }
}

#[async_trait]
impl Interceptor for TraceContextInjector {
    fn name(&self) -> &'static str {
        TRACE_CONTEXT_NAME
    }

    fn priority(&self) -> i32 {
        TRACE_CONTEXT_PRIORITY
    }

    async fn intercept(
        &self,
        request: GatewayRequest,
        next: Next<'_>,
    ) -> Result<Response, GatewayError> {
        if self.managed_environment {
            tracing::debug!(
                trace_id = ?request.header_str(&X_B3_TRACE_ID),
                "Managed environment, trace headers supplied by infrastructure"
            );
            return next.run(request).await;
        }

        let trace = self.ids.root_context();
        let request = request.with_headers(trace.to_headers());

        tracing::info!(
            path = %request.path(),
            trace_id = %trace.trace_id(),
            span_id = %trace.span_id(),
            "Gateway trace"
        );

        next.run(request).await
    }
}
