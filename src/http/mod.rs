//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, timeout, trace layers)
//!     → request.rs (buffer body, GatewayRequest)
//!     → interceptor chain (trace headers, tenant context)
//!     → upstream.rs (rewrite URI, forward with hyper-util client)
//!     → Send response to client
//! ```

pub mod request;
pub mod server;
pub mod upstream;

pub use request::{GatewayRequest, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{build_chain, GatewayServer, StartupError};
pub use upstream::HttpUpstream;
