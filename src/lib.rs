//! Tenant-aware tracing gateway library.
//!
//! Every proxied request passes through a fixed interceptor chain:
//!
//! ```text
//! inbound ─▶ TraceContextInjector (-9999) ─▶ TenantContextPropagator (-9998) ─▶ ... ─▶ upstream
//! ```

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod http;
pub mod interceptor;
pub mod observability;

#[cfg(test)]
mod test_support;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::{GatewayRequest, GatewayServer};
pub use interceptor::{Interceptor, InterceptorChain, Next, Upstream};
