//! Access token validation using HS256 and the shared signing secret.
//!
//! Tokens are compact JWS strings with header `{"alg":"HS256","typ":"JWT"}` and the
//! registered claims `iss`, `sub`, `iat` and `exp`. The subject carries the user id.
//! Signatures are compared in constant time through `hmac`'s `verify_slice`.

pub mod error;
#[cfg(test)]
mod tests;
mod types;

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

pub use types::{
    craft_signing_input, JwsHeader, JwsPayload, JwsTokenParts, ALG_HS256, ISSUER,
    TOKEN_EXPIRATION, TYP_JWT,
};

use error::JwtError;

type HmacSha256 = Hmac<Sha256>;

/// Allowed clock drift between token issuer and this service
const CLOCK_SKEW_SECS: i64 = 60;

/// JWT manager backed by a symmetric secret
#[derive(Clone)]
pub struct JwtManager {
    secret: Vec<u8>,
}

impl JwtManager {
    /// Creates a manager signing with `secret`
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    /// Issues a token for `user_id` valid for `ttl`
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if the header or claims cannot be serialized
    pub fn issue_token(&self, user_id: Uuid, ttl: Duration) -> Result<String, JwtError> {
        let payload = JwsPayload::for_user(user_id, chrono::Utc::now().timestamp(), ttl);
        self.sign(&JwsHeader::default(), &payload)
    }

    /// Signs arbitrary claims
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if the header or claims cannot be serialized
    pub fn sign(&self, header: &JwsHeader, payload: &JwsPayload) -> Result<String, JwtError> {
        let signing_input = craft_signing_input(header, payload)?;

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Validates a token and returns its claims
    ///
    /// Checks, in order: structure, header (`HS256`/`JWT`), signature, then claims.
    ///
    /// # Errors
    ///
    /// Returns the `JwtError` describing the first failed check
    pub fn validate(&self, token: &str) -> Result<JwsPayload, JwtError> {
        let parts = JwsTokenParts::try_from(token)?;

        if parts.header.alg != ALG_HS256 || parts.header.typ != TYP_JWT {
            return Err(JwtError::InvalidToken);
        }

        let mut mac = self.mac();
        mac.update(parts.signing_input.as_bytes());
        mac.verify_slice(&parts.signature)
            .map_err(|_| JwtError::InvalidSignature)?;

        validate_claims(&parts.payload, chrono::Utc::now().timestamp(), CLOCK_SKEW_SECS)?;

        Ok(parts.payload)
    }

    /// Validates a token and returns the user id in its subject
    ///
    /// # Errors
    ///
    /// Same as [`JwtManager::validate`], plus `JwtError::InvalidClaims` for a non-UUID subject
    pub fn validate_user(&self, token: &str) -> Result<Uuid, JwtError> {
        self.validate(token)?.user_id()
    }
}

/// Checks issuer and the validity window of `claims` at `now`, allowing `skew` seconds of drift
fn validate_claims(claims: &JwsPayload, now: i64, skew: i64) -> Result<(), JwtError> {
    if claims.issuer != ISSUER {
        return Err(JwtError::InvalidClaims("iss"));
    }

    if now > claims.expires_at.saturating_add(skew) {
        return Err(JwtError::Expired);
    }

    if claims.issued_at > now.saturating_add(skew) {
        return Err(JwtError::Expired);
    }

    Ok(())
}
