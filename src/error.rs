//! Gateway error type and its client-facing mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::InvalidTokenError;

/// Terminal failure of one request's pass through the chain.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Authorization credential present but unusable. Never retried.
    #[error(transparent)]
    InvalidToken(#[from] InvalidTokenError),

    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Body(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidToken(_) => "invalid_token",
            GatewayError::Body(_) => "invalid_body",
            GatewayError::Upstream(_) => "bad_gateway",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
