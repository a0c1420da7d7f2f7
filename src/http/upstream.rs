//! Forwarding to the upstream target.

use std::str::FromStr;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::uri::{Authority, InvalidUri};
use axum::response::Response;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::context;
use crate::error::GatewayError;
use crate::filters::TENANT_HEADER;
use crate::http::GatewayRequest;
use crate::interceptor::Upstream;

/// Plain-HTTP upstream behind a pooled hyper client.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl HttpUpstream {
    /// `address` is a `host:port` authority.
    pub fn new(address: &str) -> Result<Self, InvalidUri> {
        let authority = Authority::from_str(address)?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { client, authority })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn dispatch(&self, request: GatewayRequest) -> Result<Response, GatewayError> {
        let tenant = context::current()
            .and_then(|b| b.get(TENANT_HEADER.as_str()).map(str::to_owned));
        tracing::debug!(
            method = %request.method(),
            path = %request.path(),
            upstream = %self.authority,
            tenant = tenant.as_deref().unwrap_or("-"),
            "Forwarding request"
        );

        let outbound = request
            .into_upstream(&self.authority)
            .map_err(|e| GatewayError::Upstream(e.to_string()))?;

        match self.client.request(outbound).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Err(e) => {
                tracing::error!(upstream = %self.authority, error = %e, "Upstream error");
                Err(GatewayError::Upstream(e.to_string()))
            }
        }
    }
}
