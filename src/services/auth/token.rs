//! Bearer token codec (HS256 JWT).
//!
//! The token is an implementation detail of this module: nothing else in the
//! crate parses it. There is no `exp` claim and no expiry check here; an expiry
//! policy, if wanted, wraps `verify` and compares `issued_at` with the clock.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing key is not configured")]
    MissingKey,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token is malformed: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
}

/// Minimal identity carried inside a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(rename = "id")]
    pub subject_id: i32,
    #[serde(rename = "username")]
    pub subject_name: String,
    /// unix seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
}

impl IdentityClaims {
    /// Stamps `issued_at` with the current time.
    pub fn new(subject_id: i32, subject_name: impl Into<String>) -> Self {
        Self {
            subject_id,
            subject_name: subject_name.into(),
            issued_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Signs and verifies bearer tokens with a process-wide shared secret.
///
/// - Key material never shows up in Debug output.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingKey);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry no exp/nbf/aud; only the signature and payload shape are checked.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, claims: &IdentityClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        jsonwebtoken::decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e),
            })
    }
}
