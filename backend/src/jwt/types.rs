use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::JwtError;

/// Only signing algorithm accepted
pub const ALG_HS256: &str = "HS256";
/// Expected `typ` header
pub const TYP_JWT: &str = "JWT";

/// Issuer of access tokens accepted by this service
pub const ISSUER: &str = "tubely-access";

/// Default access token lifetime (1 hour)
pub const TOKEN_EXPIRATION: Duration = Duration::from_secs(60 * 60);

/// Protected header of a compact JWS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwsHeader {
    /// Signing algorithm
    pub alg: String,
    /// Token type
    pub typ: String,
}

impl Default for JwsHeader {
    fn default() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: TYP_JWT.to_string(),
        }
    }
}

/// Access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsPayload {
    /// Token issuer
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Id of the authenticated user
    #[serde(rename = "sub")]
    pub subject: String,
    /// Issue time in unix seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiry in unix seconds
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl JwsPayload {
    /// Claims for `user_id`, issued at `now` (unix seconds) and valid for `ttl`
    #[must_use]
    pub fn for_user(user_id: Uuid, now: i64, ttl: Duration) -> Self {
        Self {
            issuer: ISSUER.to_string(),
            subject: user_id.to_string(),
            issued_at: now,
            expires_at: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    /// Parses the subject claim as a user id
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidClaims` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.subject).map_err(|_| JwtError::InvalidClaims("sub"))
    }
}

/// Decoded pieces of a compact JWS
#[derive(Debug)]
pub struct JwsTokenParts {
    /// Decoded header
    pub header: JwsHeader,
    /// Decoded claims
    pub payload: JwsPayload,
    /// `base64url(header).base64url(payload)` exactly as received
    pub signing_input: String,
    /// Raw signature bytes
    pub signature: Vec<u8>,
}

impl TryFrom<&str> for JwsTokenParts {
    type Error = JwtError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(JwtError::InvalidToken);
        };

        let decode = |segment: &str| {
            URL_SAFE_NO_PAD
                .decode(segment)
                .map_err(|_| JwtError::InvalidToken)
        };

        let header: JwsHeader =
            serde_json::from_slice(&decode(header_b64)?).map_err(|_| JwtError::InvalidToken)?;
        let payload: JwsPayload =
            serde_json::from_slice(&decode(payload_b64)?).map_err(|_| JwtError::InvalidToken)?;
        let signature = decode(signature_b64)?;

        if signature.is_empty() {
            return Err(JwtError::InvalidToken);
        }

        Ok(Self {
            header,
            payload,
            signing_input: format!("{header_b64}.{payload_b64}"),
            signature,
        })
    }
}

/// Builds `base64url(header).base64url(payload)`
///
/// # Errors
///
/// Returns `JwtError::EncodingError` if serialization fails
pub fn craft_signing_input(header: &JwsHeader, payload: &JwsPayload) -> Result<String, JwtError> {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header)?);
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?);
    Ok(format!("{header_b64}.{payload_b64}"))
}
