//! Authorization credential decoding.
//!
//! The gateway does not authorize requests. It only needs the tenant a
//! credential belongs to, so the verifier is a [`TokenDecoder`] collaborator.

pub mod token;

pub use token::{Claims, InvalidTokenError, JwtTokenDecoder, TokenDecoder};
