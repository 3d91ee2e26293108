//! Access-token claims
//!
//! The backend signs access tokens; the client only reads them to learn who
//! is signed in and when the token expires. Signatures are checked server-side.

use alpaca_core::{RecordId, Session};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by a backend access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AccessClaims {
    /// Read the claims of a token without verifying its signature
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` if the token is not a well-formed JWT
    pub fn peek(token: &str) -> Result<Self, AppError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Self>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }

    /// Sign claims with a shared secret (HS256)
    ///
    /// Used by local mock backends and fixtures.
    ///
    /// # Errors
    /// Returns an error if encoding fails
    pub fn sign(&self, secret: &[u8]) -> Result<String, AppError> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret))
            .map_err(AppError::internal)
    }

    /// Get the user ID
    ///
    /// # Errors
    /// Returns an error if the subject is not a UUID
    pub fn user_id(&self) -> Result<RecordId, AppError> {
        RecordId::parse(&self.sub).map_err(|_| AppError::InvalidToken)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Build a session from the tokens returned by the auth service
///
/// # Errors
/// Returns `AppError::InvalidToken` if the access token cannot be read
pub fn session_from_tokens(
    access_token: &str,
    refresh_token: Option<String>,
) -> Result<Session, AppError> {
    let claims = AccessClaims::peek(access_token)?;
    Ok(Session {
        access_token: access_token.to_string(),
        refresh_token,
        user_id: claims.user_id()?,
        expires_at: claims.expires_at(),
        email: claims.email,
    })
}
