//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Assemble the interceptor chain from configuration
//! - Bind server to listener and shut down gracefully

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::JwtTokenDecoder;
use crate::config::GatewayConfig;
use crate::context::{LoggingObserver, ScopeObserver};
use crate::error::GatewayError;
use crate::filters::{TenantContextPropagator, TraceContextInjector};
use crate::http::request::{GatewayRequest, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::upstream::HttpUpstream;
use crate::interceptor::{ChainError, Interceptor, InterceptorChain, Upstream};
use crate::observability::IdGenerator;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid upstream address: {0}")]
    Upstream(#[from] axum::http::uri::InvalidUri),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<InterceptorChain>,
    pub max_body_bytes: usize,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server forwarding to `config.upstream`.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let upstream = Arc::new(HttpUpstream::new(&config.upstream.address)?);
        let chain = build_chain(&config, upstream, Arc::new(LoggingObserver))?;
        Ok(Self::with_chain(config, chain))
    }

    /// Create a server around an already assembled chain.
    pub fn with_chain(config: GatewayConfig, chain: InterceptorChain) -> Self {
        tracing::info!(interceptors = ?chain.names(), "Interceptor chain ready");
        let state = AppState {
            chain: Arc::new(chain),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuidV4))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run until `signal` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, listener: TcpListener, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            managed_environment = self.config.tracing.managed_environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

}

/// The gateway's two built-in interceptors in front of `upstream`.
///
/// `observer` is notified whenever a tenant baggage scope opens or closes.
pub fn build_chain(
    config: &GatewayConfig,
    upstream: Arc<dyn Upstream>,
    observer: Arc<dyn ScopeObserver>,
) -> Result<InterceptorChain, ChainError> {
    let interceptors: Vec<Arc<dyn Interceptor>> = vec![
        Arc::new(TraceContextInjector::new(
            config.tracing.managed_environment,
            Arc::new(IdGenerator::from_entropy()),
        )),
        Arc::new(TenantContextPropagator::new(
            Arc::new(JwtTokenDecoder::from_config(&config.tenant)),
            config.tenant.auxiliary_baggage(),
            observer,
        )),
    ];
    InterceptorChain::new(interceptors, upstream)
}

/// Buffer the body, run the chain, map failures to client responses.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => return GatewayError::Body(e.to_string()).into_response(),
    };
    let request = GatewayRequest::from_parts(parts, body);
    let method = request.method().clone();
    let path = request.path().to_string();

    match state.chain.handle(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                method = %method,
                path = %path,
                status = e.status().as_u16(),
                error = %e,
                "Request failed"
            );
            e.into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
