//! JWT-related error types

use thiserror::Error;

/// Errors that can occur during JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    /// Token is not a well-formed compact JWS with the expected header and claims
    #[error("Malformed token")]
    InvalidToken,

    /// Signature does not match the signing secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is expired or not yet valid
    #[error("Token expired or not yet valid")]
    Expired,

    /// Issuer or subject claim is not acceptable
    #[error("Invalid claim: {0}")]
    InvalidClaims(&'static str),

    /// JWT encoding failed
    #[error("Failed to encode JWT token: {0}")]
    EncodingError(#[from] serde_json::Error),
}
