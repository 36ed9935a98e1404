//! session::token
//!
//! Access-token claim decoding.
//!
//! The access token is a JWT whose payload carries a self-describing `exp`
//! claim. We only need that claim to decide whether a stored token is still
//! usable, so the payload segment is base64-decoded and parsed without any
//! signature verification. Verification is the server's job; a forged token
//! fails at the first API call anyway.
//!
//! Malformed input is an error, never a panic: the caller maps it to the
//! "invalid token" path (one refresh attempt, then forced logout).

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;

use super::errors::SessionError;

/// The claims we read from an access token payload.
///
/// Only `exp` matters to the session layer; everything else in the payload is
/// ignored during deserialization.
#[derive(Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Decode the claims from a JWT-shaped token string.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidToken`] when the token is not three
    /// dot-separated segments, the payload is not valid base64url, or the
    /// payload JSON lacks a numeric `exp` claim.
    pub fn decode(token: &str) -> Result<Self, SessionError> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_header), Some(payload), Some(_signature)) => payload,
            _ => {
                return Err(SessionError::InvalidToken(
                    "expected three dot-separated segments".into(),
                ))
            }
        };

        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| SessionError::InvalidToken(format!("payload is not base64url: {}", e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::InvalidToken(format!("payload is not claim JSON: {}", e)))
    }

    /// When the token expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
    }

    /// Check if the token's expiry time has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }
}

// No token material is stored here, but keep Debug terse anyway so claim
// structs embedded in larger state dumps stay readable.
impl fmt::Debug for TokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClaims")
            .field("exp", &self.expires_at())
            .finish()
    }
}
