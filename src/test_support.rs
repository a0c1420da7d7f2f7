//! Test doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Uri};
use axum::response::Response;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::Value;

use crate::context::{self, Baggage, ScopeObserver};
use crate::error::GatewayError;
use crate::http::GatewayRequest;
use crate::interceptor::Upstream;

pub fn request(path: &str) -> GatewayRequest {
    GatewayRequest::new(
        Method::GET,
        path.parse::<Uri>().unwrap(),
        HeaderMap::new(),
        Bytes::new(),
    )
}

pub fn request_with<V: AsRef<str>>(path: &str, headers: &[(&str, V)]) -> GatewayRequest {
    let mut builder = Request::builder().uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, value.as_ref());
    }
    let (parts, _) = builder.body(()).unwrap().into_parts();
    GatewayRequest::from_parts(parts, Bytes::new())
}

pub fn is_lower_hex(s: &str) -> bool {
    s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// HS256 token; adds a one-hour `exp` unless the claims carry one.
pub fn mint_token(secret: &[u8], mut claims: Value) -> String {
    if claims.get("exp").is_none() {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        claims["exp"] = Value::from(now + 3600);
    }
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
}

/// Counts scope transitions.
#[derive(Debug, Default)]
pub struct CountingObserver {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl CountingObserver {
    pub fn opens(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl ScopeObserver for CountingObserver {
    fn opened(&self, _baggage: &Baggage) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn closed(&self, _baggage: &Baggage) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// What an upstream observed for one dispatched request.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub headers: HeaderMap,
    pub baggage: Option<Arc<Baggage>>,
}

/// Upstream that records requests and answers 200.
#[derive(Debug, Default)]
pub struct RecordingUpstream {
    seen: Mutex<Vec<Seen>>,
    yields: usize,
}

impl RecordingUpstream {
    /// Suspend `yields` times before recording, to interleave with other requests.
    pub fn with_yields(yields: usize) -> Self {
        Self {
            yields,
            ..Self::default()
        }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn dispatch(&self, request: GatewayRequest) -> Result<Response, GatewayError> {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        self.seen.lock().unwrap().push(Seen {
            path: request.path().to_string(),
            headers: request.headers().clone(),
            baggage: context::current(),
        });
        Ok(Response::new(Body::empty()))
    }
}

/// Upstream that always fails.
#[derive(Debug, Default)]
pub struct FailingUpstream;

#[async_trait]
impl Upstream for FailingUpstream {
    async fn dispatch(&self, _request: GatewayRequest) -> Result<Response, GatewayError> {
        Err(GatewayError::Upstream("connection refused".into()))
    }
}

/// Upstream that never answers.
#[derive(Debug, Default)]
pub struct PendingUpstream;

#[async_trait]
impl Upstream for PendingUpstream {
    async fn dispatch(&self, _request: GatewayRequest) -> Result<Response, GatewayError> {
        std::future::pending().await
    }
}
