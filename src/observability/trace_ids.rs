//! B3 trace identifiers for gateway-originated requests.
//!
//! # Header Format
//! ```text
//! X-B3-TraceId:      0af7651916cd43dd8448eb211c80319c   (32 lowercase hex)
//! X-B3-SpanId:       gateway-b7ad6b7169203331           (prefix + 16 lowercase hex)
//! X-B3-ParentSpanId: 0
//! X-B3-Sampled:      1
//! ```

use std::sync::{Mutex, PoisonError};

use axum::http::{HeaderName, HeaderValue};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const X_B3_TRACE_ID: HeaderName = HeaderName::from_static("x-b3-traceid");
pub const X_B3_SPAN_ID: HeaderName = HeaderName::from_static("x-b3-spanid");
pub const X_B3_PARENT_SPAN_ID: HeaderName = HeaderName::from_static("x-b3-parentspanid");
pub const X_B3_SAMPLED: HeaderName = HeaderName::from_static("x-b3-sampled");

/// Marks span ids minted by this gateway.
pub const GATEWAY_SPAN_PREFIX: &str = "gateway-";

/// Parent span id of a trace rooted at the gateway.
pub const ROOT_PARENT_SPAN_ID: &str = "0";

/// Trace identifiers attached to one request. Only [`IdGenerator`] mints these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    sampled: bool,
}

impl TraceContext {
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn parent_span_id(&self) -> &str {
        &self.parent_span_id
    }

    pub fn sampled(&self) -> bool {
        self.sampled
    }

    /// Render as the four B3 headers.
    pub fn to_headers(&self) -> [(HeaderName, HeaderValue); 4] {
        let sampled = if self.sampled { "1" } else { "0" };
        [
            (X_B3_TRACE_ID, id_value(&self.trace_id)),
            (X_B3_SPAN_ID, id_value(&self.span_id)),
            (X_B3_PARENT_SPAN_ID, id_value(&self.parent_span_id)),
            (X_B3_SAMPLED, HeaderValue::from_static(sampled)),
        ]
    }
}

fn id_value(id: &str) -> HeaderValue {
    // Identifiers are ASCII hex plus a fixed ASCII prefix.
    HeaderValue::from_str(id).expect("trace identifiers are visible ASCII")
}

/// Source of trace and span identifiers.
///
/// Wraps a ChaCha-based `StdRng`. Production code seeds it from the OS
/// (`from_entropy`); tests use `seeded` for reproducible ids.
pub struct IdGenerator {
    rng: Mutex<StdRng>,
}

impl IdGenerator {
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// 128 random bits as 32 lowercase hex characters.
    pub fn trace_id(&self) -> String {
        let bits: u128 = self.next();
        format!("{:032x}", bits)
    }

    /// Gateway prefix followed by 64 random bits as 16 lowercase hex characters.
    pub fn span_id(&self) -> String {
        let bits: u64 = self.next();
        format!("{}{:016x}", GATEWAY_SPAN_PREFIX, bits)
    }

    /// Fresh root context: new ids, parent `"0"`, always sampled.
    pub fn root_context(&self) -> TraceContext {
        TraceContext {
            trace_id: self.trace_id(),
            span_id: self.span_id(),
            parent_span_id: ROOT_PARENT_SPAN_ID.to_string(),
            sampled: true,
        }
    }

    fn next<T>(&self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        // A panic while holding the lock cannot leave the RNG in a bad state.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen()
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
