//! Token decoding.
//!
//! # Responsibilities
//! - Strip an optional `Bearer ` scheme from the credential
//! - Verify the token and deserialize its payload
//! - Pull the tenant claim out of the payload
//!
//! # Design Decisions
//! - Every failure is an [`InvalidTokenError`]; there is no degraded mode
//! - Claims live only as long as the request that carried them

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::TenantConfig;

/// Credential present but not usable.
#[derive(Debug, Error)]
pub enum InvalidTokenError {
    #[error("authorization header is not valid UTF-8")]
    Malformed,

    #[error("token verification failed: {0}")]
    Verification(#[from] jsonwebtoken::errors::Error),

    #[error("missing '{0}' claim")]
    MissingClaim(String),

    #[error("claim '{0}' is not a usable tenant identifier")]
    InvalidClaim(String),
}

/// Decoded credential payload.
#[derive(Debug, Clone)]
pub struct Claims {
    tenant: String,
    payload: Map<String, Value>,
}

impl Claims {
    pub fn new(tenant: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            tenant: tenant.into(),
            payload,
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Raw claim lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }
}

/// Turns an `Authorization` header value into [`Claims`].
pub trait TokenDecoder: Send + Sync {
    fn decode(&self, credential: &str) -> Result<Claims, InvalidTokenError>;
}

/// HS256 JWT decoder.
#[derive(Clone)]
pub struct JwtTokenDecoder {
    key: DecodingKey,
    validation: Validation,
    tenant_claim: String,
}

impl std::fmt::Debug for JwtTokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtTokenDecoder")
            .field("validation", &self.validation)
            .field("tenant_claim", &self.tenant_claim)
            .finish()
    }
}

impl JwtTokenDecoder {
    /// Decoder validating signature and `exp`.
    pub fn hs256(secret: &[u8], tenant_claim: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            tenant_claim: tenant_claim.into(),
        }
    }

    pub fn from_config(config: &TenantConfig) -> Self {
        let mut decoder = Self::hs256(config.jwt_secret.as_bytes(), config.tenant_claim.clone());
        decoder.validation.leeway = config.leeway_secs;
        if !config.validate_exp {
            decoder.validation.validate_exp = false;
            decoder.validation.required_spec_claims.clear();
        }
        decoder
    }
}

impl TokenDecoder for JwtTokenDecoder {
    fn decode(&self, credential: &str) -> Result<Claims, InvalidTokenError> {
        let token = strip_bearer(credential);
        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &self.key, &self.validation)?;
        let payload = data.claims;

        let tenant = match payload.get(&self.tenant_claim) {
            None | Some(Value::Null) => {
                return Err(InvalidTokenError::MissingClaim(self.tenant_claim.clone()))
            }
            Some(Value::String(tenant)) if !tenant.trim().is_empty() => tenant.clone(),
            Some(_) => return Err(InvalidTokenError::InvalidClaim(self.tenant_claim.clone())),
        };

        Ok(Claims::new(tenant, payload))
    }
}

/// Remove a case-insensitive `Bearer` scheme, if present.
fn strip_bearer(credential: &str) -> &str {
    const SCHEME: &str = "bearer ";
    let credential = credential.trim();
    match credential.get(..SCHEME.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => {
            credential[SCHEME.len()..].trim_start()
        }
        _ => credential,
    }
}
