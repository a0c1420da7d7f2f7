//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{uri::Authority, HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::filters::TENANT_HEADER;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.address '{0}' is not a host:port authority")]
    UpstreamAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("tenant.jwt_secret must not be empty")]
    EmptySecret,

    #[error("tenant.tenant_claim must not be empty")]
    EmptyTenantClaim,

    #[error("tenant.baggage key '{0}' is reserved for the tenant identifier")]
    ReservedBaggageKey(String),

    #[error("tenant.baggage entry '{0}' is not a valid header token or value")]
    InvalidBaggageEntry(String),
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let upstream = &config.upstream.address;
    if upstream.parse::<Authority>().is_err() || !upstream.contains(':') {
        errors.push(ValidationError::UpstreamAddress(upstream.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.tenant.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }

    if config.tenant.tenant_claim.trim().is_empty() {
        errors.push(ValidationError::EmptyTenantClaim);
    }

    for (key, value) in &config.tenant.baggage {
        if key.eq_ignore_ascii_case(TENANT_HEADER.as_str()) {
            errors.push(ValidationError::ReservedBaggageKey(key.clone()));
        } else if HeaderName::from_bytes(key.as_bytes()).is_err()
            || HeaderValue::from_str(value).is_err()
        {
            errors.push(ValidationError::InvalidBaggageEntry(key.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
