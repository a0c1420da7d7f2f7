//! The gateway's built-in interceptors.
//!
//! | Interceptor | Priority | Writes |
//! |---|---|---|
//! | [`TraceContextInjector`] | -9999 | `X-B3-TraceId`, `X-B3-SpanId`, `X-B3-ParentSpanId`, `X-B3-Sampled` |
//! | [`TenantContextPropagator`] | -9998 | `x-api-version`, tenant baggage scope |

pub mod tenant_context;
pub mod trace_context;

pub use tenant_context::{TenantContextPropagator, TENANT_HEADER};
pub use trace_context::TraceContextInjector;
