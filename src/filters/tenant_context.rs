//! Tenant extraction and baggage propagation.
//!
//! # Flow
//! ```text
//! Authorization absent/blank ─▶ forward unchanged, no scope
//! Authorization present
//!     → TokenDecoder::decode        (failure: InvalidTokenError, chain stops here)
//!     → copy request + x-api-version: <tenant>
//!     → open BaggageScope { x-api-version: <tenant>, auxiliary entries... }
//!     → next.run(request) with the scope current
//!     → scope closed when that future finishes or is dropped
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
use axum::response::Response;

use crate::auth::{InvalidTokenError, TokenDecoder};
use crate::context::{Baggage, BaggageScope, ScopeObserver};
use crate::error::GatewayError;
use crate::http::GatewayRequest;
use crate::interceptor::{Interceptor, Next, TENANT_CONTEXT_NAME, TENANT_CONTEXT_PRIORITY};

/// Request header and baggage key carrying the tenant identifier.
pub const TENANT_HEADER: HeaderName = HeaderName::from_static("x-api-version");

pub struct TenantContextPropagator {
    decoder: Arc<dyn TokenDecoder>,
    auxiliary: Vec<(String, String)>,
    observer: Arc<dyn ScopeObserver>,
}

impl TenantContextPropagator {
    /// `auxiliary` entries are added to every tenant baggage after the tenant itself.
    pub fn new(
        decoder: Arc<dyn TokenDecoder>,
        auxiliary: Vec<(String, String)>,
        observer: Arc<dyn ScopeObserver>,
    ) -> Self {
        Self {
            decoder,
            auxiliary,
            observer,
        }
    }

    fn baggage_for(&self, tenant: &str) -> Baggage {
        self.auxiliary
            .iter()
            .fold(
                Baggage::builder().put(TENANT_HEADER.as_str(), tenant),
                |builder, (key, value)| builder.put(key.as_str(), value.as_str()),
            )
            .build()
    }
}

/// Non-blank `Authorization` value. Non-UTF-8 values are rejected.
fn credential(request: &GatewayRequest) -> Result<Option<&str>, InvalidTokenError> {
    let Some(value) = request.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| InvalidTokenError::Malformed)?;
    Ok(Some(value).filter(|v| !v.trim().is_empty()))
}

#[async_trait]
impl Interceptor for TenantContextPropagator {
    fn name(&self) -> &'static str {
        TENANT_CONTEXT_NAME
    }

    fn priority(&self) -> i32 {
        TENANT_CONTEXT_PRIORITY
    }

    async fn intercept(
        &self,
        request: GatewayRequest,
        next: Next<'_>,
    ) -> Result<Response, GatewayError> {
        let Some(credential) = credential(&request)?.map(str::to_owned) else {
            return next.run(request).await;
        };

        let claims = self.decoder.decode(&credential).map_err(|e| {
            tracing::warn!(path = %request.path(), error = %e, "Rejecting request credential");
            e
        })?;

        let tenant = claims.tenant();
        let value = HeaderValue::from_str(tenant)
            .map_err(|_| InvalidTokenError::InvalidClaim(TENANT_HEADER.to_string()))?;
        let request = request.with_header(TENANT_HEADER, value);

        let scope = BaggageScope::open(self.baggage_for(tenant), Arc::clone(&self.observer));
        tracing::debug!(
            tenant = %tenant,
            subject = ?claims.get("sub"),
            path = %request.path(),
            "Tenant context attached"
        );

        scope.run(next.run(request)).await
    }
}
