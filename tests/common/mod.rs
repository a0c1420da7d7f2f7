//! Shared utilities for integration tests.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{http::HeaderMap, routing::any, Json, Router};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::Value;
use tokio::net::TcpListener;

use tenant_trace_gateway::{GatewayConfig, GatewayServer};

pub const SECRET: &str = "integration-test-secret";

/// Start a backend that answers every request with its headers as JSON.
pub async fn start_echo_backend() -> (SocketAddr, Arc<std::sync::atomic::AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = hits.clone();

    let echo = move |headers: HeaderMap| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let headers: BTreeMap<String, String> = headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            Json(headers)
        }
    };
    let app = Router::new()
        .route("/", any(echo.clone()))
        .route("/{*path}", any(echo));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, hits)
}

/// Start the gateway in front of `upstream`; returns its address.
pub async fn start_gateway(upstream: SocketAddr, managed_environment: bool) -> SocketAddr {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.address = upstream.to_string();
    config.tracing.managed_environment = managed_environment;
    config.tenant.jwt_secret = SECRET.into();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run_until(listener, std::future::pending()).await;
    });

    addr
}

pub fn mint_token(claims: Value) -> String {
    let mut claims = claims;
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    claims["exp"] = Value::from(now + 3600);
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
