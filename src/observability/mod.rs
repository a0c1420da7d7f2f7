//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     → logging.rs (install tracing subscriber from ObservabilityConfig)
//!
//! Per request:
//!     → trace_ids.rs (IdGenerator → TraceContext → X-B3-* headers)
//!     → downstream services group their spans by the propagated ids
//! ```
//!
//! # Design Decisions
//! - Structured logging through `tracing`, JSON optional for production
//! - The random source is an injected value so tests can seed it
//! - Span export and sampling decisions stay with the tracing backend

pub mod logging;
pub mod trace_ids;

pub use trace_ids::{IdGenerator, TraceContext};
