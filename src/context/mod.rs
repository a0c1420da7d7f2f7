//! Request-scoped context propagation.
//!
//! # Data Flow
//! ```text
//! TenantContextPropagator
//!     → baggage.rs (build immutable Baggage for one request)
//!     → scope.rs (open BaggageScope, make it current for the request future)
//!     → downstream interceptors / upstream call read `scope::current()`
//!     → scope dropped on completion, error or cancellation (close)
//! ```
//!
//! # Design Decisions
//! - Baggage is a value, never a global; it lives in a Tokio task-local slot
//! - The slot is bound to the request future, so concurrent requests on the
//!   same worker thread never observe each other's baggage
//! - Closing a scope is RAII: the guard is dropped exactly once on every exit path

pub mod baggage;
pub mod scope;

pub use baggage::{Baggage, BaggageBuilder};
pub use scope::{current, in_current_scope, BaggageScope, LoggingObserver, ScopeObserver};
