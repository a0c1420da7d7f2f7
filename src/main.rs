//! Tenant-aware tracing gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────────┐
//!                      │                        GATEWAY                           │
//!   Client Request     │  ┌──────────┐   ┌──────────────┐   ┌───────────────────┐ │
//!   ───────────────────┼─▶│  axum    │──▶│ trace-context│──▶│  tenant-context   │ │
//!                      │  │ + layers │   │   (-9999)    │   │     (-9998)       │ │
//!                      │  └──────────┘   └──────────────┘   └─────────┬─────────┘ │
//!                      │                                              │ baggage   │
//!                      │                                              ▼ scope     │
//!   Client Response    │                                     ┌──────────────────┐ │
//!   ◀──────────────────┼─────────────────────────────────────│  http upstream   │◀┼── Upstream
//!                      │                                     └──────────────────┘ │
//!                      └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tenant_trace_gateway::config::{load_config, GatewayConfig};
use tenant_trace_gateway::observability::logging::init_logging;
use tenant_trace_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "tenant-trace-gateway")]
#[command(about = "HTTP gateway injecting B3 trace headers and tenant context", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Trace headers are supplied by the surrounding infrastructure (service mesh).
    #[arg(long, env = "GATEWAY_MANAGED_ENVIRONMENT")]
    managed_environment: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if cli.managed_environment {
        config.tracing.managed_environment = true;
    }

    init_logging(&config.observability)?;

    tracing::info!("tenant-trace-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        managed_environment = config.tracing.managed_environment,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if cli.config.is_none() {
        tracing::warn!("No configuration file given, using built-in defaults");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = GatewayServer::new(config)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
