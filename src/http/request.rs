//! Request representation used by the interceptor chain.
//!
//! # Responsibilities
//! - Hold one inbound call as an immutable value
//! - Produce modified copies without touching the original
//! - Rebuild an outbound `http::Request` aimed at the upstream
//! - Generate `x-request-id` values (UUID v4)
//!
//! # Design Decisions
//! - Headers are shared behind an `Arc` and copied only when a copy is modified
//! - Body is buffered so the request can be cloned cheaply (`Bytes`)

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{
    header,
    request::Parts,
    uri::{Authority, PathAndQuery, Scheme},
    HeaderMap, HeaderName, HeaderValue, Method, Request, Uri, Version,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// One inbound call.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    method: Method,
    uri: Uri,
    version: Version,
    headers: Arc<HeaderMap>,
    body: Bytes,
}

impl GatewayRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: Arc::new(headers),
            body,
        }
    }

    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: Arc::new(parts.headers),
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First value of `name`, if present and valid UTF-8.
    pub fn header_str(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Copy of this request with `name` set to `value`, replacing prior values.
    pub fn with_header(&self, name: HeaderName, value: HeaderValue) -> Self {
        self.with_headers([(name, value)])
    }

    /// Copy of this request with every `(name, value)` pair set.
    pub fn with_headers<I>(&self, headers: I) -> Self
    where
        I: IntoIterator<Item = (HeaderName, HeaderValue)>,
    {
        let mut next = self.clone();
        let map = Arc::make_mut(&mut next.headers);
        for (name, value) in headers {
            map.insert(name, value);
        }
        next
    }

    /// Build the outbound request for `authority`, keeping path, query and headers.
    pub fn into_upstream(self, authority: &Authority) -> Result<Request<Body>, axum::http::Error> {
        let mut uri_parts = self.uri.into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        let uri = Uri::from_parts(uri_parts)?;

        let mut builder = Request::builder()
            .method(self.method)
            .uri(uri)
            .version(self.version);
        if let Some(headers) = builder.headers_mut() {
            *headers = Arc::unwrap_or_clone(self.headers);
            headers.remove(header::HOST);
        }
        builder.body(Body::from(self.body))
    }
}

/// `x-request-id` generator for tower-http's request-id layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
